use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::effects::filters::BlurStrategy;
use crate::foundation::core::Canvas;

/// A rendered frame as premultiplied RGBA8 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Transparent frame of the canvas size.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.byte_len()],
        }
    }

    /// Size as a [`Canvas`].
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Straight-alpha copy of the pixel data, as image encoders expect.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }
}

/// Host capabilities resolved once and injected into rendering and export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderCaps {
    /// Whether the host offers native canvas filters. Without them the blur runs at reduced
    /// resolution.
    pub supports_canvas_filters: bool,
    /// Whether downloads should be delivered as a data URL rather than raw bytes.
    pub prefers_data_url: bool,
}

impl Default for RenderCaps {
    fn default() -> Self {
        Self {
            supports_canvas_filters: true,
            prefers_data_url: false,
        }
    }
}

impl RenderCaps {
    /// Capabilities of a Safari-like host: no canvas filters, data URL downloads.
    pub fn fallback() -> Self {
        Self {
            supports_canvas_filters: false,
            prefers_data_url: true,
        }
    }

    /// Detect from a browser user-agent string. Safari is "safari" without "chrome" or
    /// "android".
    pub fn from_user_agent(ua: &str) -> Self {
        let ua = ua.to_ascii_lowercase();
        let is_safari =
            ua.contains("safari") && !ua.contains("chrome") && !ua.contains("android");
        if is_safari {
            Self::fallback()
        } else {
            Self::default()
        }
    }

    /// Blur realization matching these capabilities.
    pub fn blur_strategy(&self) -> BlurStrategy {
        if self.supports_canvas_filters {
            BlurStrategy::Native
        } else {
            BlurStrategy::Downsampled
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
