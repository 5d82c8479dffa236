use std::path::Path;

use anyhow::Context;
use data_url::DataUrl;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::foundation::error::{GradiiError, GradiiResult};

/// Default upload limit for background and logo images.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Upload payload that passed the boundary checks but is not decoded yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckedUpload {
    /// Declared MIME type, e.g. `image/png`.
    pub mime: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

fn too_large(max_bytes: usize) -> GradiiError {
    let mb = max_bytes.div_ceil(1024 * 1024);
    GradiiError::validation(format!("Image must be smaller than {mb}MB"))
}

fn not_an_image() -> GradiiError {
    GradiiError::validation("Please upload an image file")
}

/// Check a `data:` URL upload: the MIME type must be `image/*` and the decoded payload must not
/// exceed `max_bytes`.
pub fn check_data_url(url: &str, max_bytes: usize) -> GradiiResult<CheckedUpload> {
    let data_url = DataUrl::process(url.trim())
        .map_err(|e| GradiiError::validation(format!("malformed data URL: {e:?}")))?;

    let mime = data_url.mime_type();
    if !mime.type_.eq_ignore_ascii_case("image") {
        return Err(not_an_image());
    }
    let mime = format!("{}/{}", mime.type_, mime.subtype);

    if base64_lower_bound(url.trim()).is_some_and(|n| n > max_bytes) {
        return Err(too_large(max_bytes));
    }
    let (bytes, _) = data_url
        .decode_to_vec()
        .map_err(|e| GradiiError::validation(format!("invalid base64 in data URL: {e:?}")))?;
    if bytes.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    Ok(CheckedUpload { mime, bytes })
}

/// Fewest bytes a base64 `data:` URL can decode to, read off the encoded length.
fn base64_lower_bound(url: &str) -> Option<usize> {
    let (header, payload) = url.split_once(',')?;
    if !header.to_ascii_lowercase().ends_with(";base64") {
        return None;
    }
    let encoded = payload.bytes().filter(|b| !b.is_ascii_whitespace()).count();
    Some(encoded.saturating_sub(2) / 4 * 3)
}

/// Check raw upload bytes (e.g. read from disk). The content must be sniffable as an image.
pub fn check_bytes(bytes: Vec<u8>, max_bytes: usize) -> GradiiResult<CheckedUpload> {
    if bytes.len() > max_bytes {
        return Err(too_large(max_bytes));
    }
    let format = image::guess_format(&bytes).map_err(|_| not_an_image())?;
    Ok(CheckedUpload {
        mime: format.to_mime_type().to_owned(),
        bytes,
    })
}

/// Resolve an image reference from a settings file.
///
/// `data:` URLs are checked inline; anything else is a file path, resolved against `base_dir`
/// when relative.
pub fn load_image_ref(
    reference: &str,
    base_dir: Option<&Path>,
    max_bytes: usize,
) -> GradiiResult<PreparedImage> {
    let checked = if reference.trim_start().starts_with("data:") {
        check_data_url(reference, max_bytes)?
    } else {
        let path = Path::new(reference);
        let path = match base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image '{}'", path.display()))?;
        check_bytes(bytes, max_bytes)?
    };
    decode_image(&checked.bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/upload.rs"]
mod tests;
