use crate::foundation::error::{GradiiError, GradiiResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Largest accepted canvas side, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 2560;

/// Output canvas dimensions in pixels.
///
/// The same canvas drives the visible buffer and the exported PNG; preview display scaling never
/// changes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with both sides in `1..=MAX_CANVAS_SIDE`.
    pub fn new(width: u32, height: u32) -> GradiiResult<Self> {
        let canvas = Self { width, height };
        canvas.check()?;
        Ok(canvas)
    }

    /// Return an error when either side is outside `1..=MAX_CANVAS_SIDE`.
    pub fn check(self) -> GradiiResult<()> {
        for (name, v) in [("width", self.width), ("height", self.height)] {
            if v == 0 || v > MAX_CANVAS_SIDE {
                return Err(GradiiError::validation(format!(
                    "canvas {name} must be in 1..={MAX_CANVAS_SIDE}, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Number of pixels.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Byte length of a tightly packed RGBA8 buffer for this canvas.
    pub fn byte_len(self) -> usize {
        self.pixel_count().saturating_mul(4)
    }

    /// Shorter side, used to size blob shapes.
    pub fn min_side(self) -> u32 {
        self.width.min(self.height)
    }

    /// Canvas center in pixel space.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    pub(crate) fn size_u16(self) -> GradiiResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| GradiiError::render("canvas width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| GradiiError::render("canvas height exceeds u16"))?;
        Ok((w, h))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Bytes in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
