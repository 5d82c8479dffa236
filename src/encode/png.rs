use std::borrow::Cow;
use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::foundation::error::{GradiiError, GradiiResult};
use crate::render::backend::{FrameRGBA, RenderCaps};

/// Prefix of every exported file name.
pub const EXPORT_PREFIX: &str = "gradii";

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// `gradii-{width}x{height}.png`.
pub fn export_filename(width: u32, height: u32) -> String {
    format!("{EXPORT_PREFIX}-{width}x{height}.png")
}

/// Encoded PNG in the form the host asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportPayload {
    /// Raw PNG bytes.
    Bytes(Vec<u8>),
    /// `data:image/png;base64,...`
    DataUrl(String),
}

impl ExportPayload {
    /// PNG bytes regardless of representation.
    pub fn png_bytes(&self) -> GradiiResult<Cow<'_, [u8]>> {
        match self {
            Self::Bytes(b) => Ok(Cow::Borrowed(b)),
            Self::DataUrl(url) => {
                let b64 = url
                    .strip_prefix(PNG_DATA_URL_PREFIX)
                    .ok_or_else(|| GradiiError::export("payload is not a PNG data URL"))?;
                let bytes = STANDARD
                    .decode(b64)
                    .map_err(|e| GradiiError::export(format!("decode PNG data URL: {e}")))?;
                Ok(Cow::Owned(bytes))
            }
        }
    }
}

/// A finished export: file name, dimensions and payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested download file name.
    pub filename: String,
    /// Exported width in pixels.
    pub width: u32,
    /// Exported height in pixels.
    pub height: u32,
    /// Encoded image.
    pub payload: ExportPayload,
}

/// Encode a frame as PNG (straight alpha RGBA8).
pub fn encode_png(frame: &FrameRGBA) -> GradiiResult<Vec<u8>> {
    let expected = frame.canvas().byte_len();
    if frame.data.len() != expected || expected == 0 {
        return Err(GradiiError::export(format!(
            "frame buffer of {} bytes does not match {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba())
        .ok_or_else(|| GradiiError::export("frame buffer rejected by PNG encoder"))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| GradiiError::export(format!("encode png: {e}")))?;
    Ok(out.into_inner())
}

/// Base64 data URL for PNG bytes.
pub fn png_data_url(png: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png))
}

/// Encode `frame` and wrap it the way `caps` prefers.
#[tracing::instrument(skip_all, fields(w = frame.width, h = frame.height))]
pub fn export_frame(frame: &FrameRGBA, caps: RenderCaps) -> GradiiResult<ExportArtifact> {
    let png = encode_png(frame)?;
    tracing::debug!(bytes = png.len(), data_url = caps.prefers_data_url, "png encoded");
    let payload = if caps.prefers_data_url {
        ExportPayload::DataUrl(png_data_url(&png))
    } else {
        ExportPayload::Bytes(png)
    };
    Ok(ExportArtifact {
        filename: export_filename(frame.width, frame.height),
        width: frame.width,
        height: frame.height,
        payload,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
