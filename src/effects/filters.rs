use rayon::prelude::*;

use crate::effects::blur::{box_blur_premul, downsampled_blur_premul};
use crate::foundation::error::GradiiResult;
use crate::foundation::math::clamp_finite;

/// Slider ranges.
pub const BLUR_MAX: f64 = 1200.0;
/// Upper bound for brightness, contrast and saturation percentages.
pub const PERCENT_MAX: f64 = 200.0;
/// Lower bound for contrast; zero contrast would flatten everything to gray.
pub const CONTRAST_MIN: f64 = 1.0;

/// How the blur stage is realized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlurStrategy {
    /// Full-resolution Gaussian approximation.
    Native,
    /// Blur at reduced resolution and upscale, for hosts without native canvas filters.
    Downsampled,
}

/// The fixed filter stack applied to the background layer: blur, brightness, contrast, saturate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterChain {
    /// Blur radius slider value; sigma is `blur / 4` canvas pixels.
    pub blur: f64,
    /// Brightness percentage (100 = unchanged).
    pub brightness: f64,
    /// Contrast percentage (100 = unchanged).
    pub contrast: f64,
    /// Saturation percentage (100 = unchanged).
    pub saturation: f64,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self {
            blur: 0.0,
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
        }
    }
}

impl FilterChain {
    /// Clamp every value into its slider range; NaN falls back to the range minimum.
    pub fn clamped(self) -> Self {
        Self {
            blur: clamp_finite(self.blur, 0.0, BLUR_MAX),
            brightness: clamp_finite(self.brightness, 0.0, PERCENT_MAX),
            contrast: clamp_finite(self.contrast, CONTRAST_MIN, PERCENT_MAX),
            saturation: clamp_finite(self.saturation, 0.0, PERCENT_MAX),
        }
    }

    /// Gaussian sigma in canvas pixels; zero when the blur stage is off.
    pub fn blur_sigma(&self) -> f32 {
        let c = self.clamped();
        (c.blur / 4.0) as f32
    }

    /// Whether brightness, contrast and saturation are all at 100%.
    pub fn is_color_neutral(&self) -> bool {
        let c = self.clamped();
        c.brightness == 100.0 && c.contrast == 100.0 && c.saturation == 100.0
    }

    /// CSS filter string equivalent, e.g. `blur(125px) brightness(100%) contrast(100%)
    /// saturate(100%)`.
    pub fn css(&self) -> String {
        let c = self.clamped();
        let mut out = String::new();
        if c.blur > 0.0 {
            out.push_str(&format!("blur({}px) ", c.blur / 4.0));
        }
        out.push_str(&format!(
            "brightness({}%) contrast({}%) saturate({}%)",
            c.brightness, c.contrast, c.saturation
        ));
        out
    }

    /// Run the blur stage in place.
    pub fn apply_blur(
        &self,
        buf: &mut [u8],
        width: u32,
        height: u32,
        strategy: BlurStrategy,
        parallel: bool,
    ) -> GradiiResult<()> {
        let sigma = self.blur_sigma();
        if sigma <= 0.0 {
            return Ok(());
        }
        match strategy {
            BlurStrategy::Native => box_blur_premul(buf, width, height, sigma, parallel),
            BlurStrategy::Downsampled => {
                downsampled_blur_premul(buf, width, height, sigma, parallel)
            }
        }
    }

    /// Run brightness, contrast and saturate in place on a premultiplied buffer.
    pub fn apply_color(&self, buf: &mut [u8], parallel: bool) {
        if self.is_color_neutral() {
            return;
        }
        let ops = ColorOps::from_chain(&self.clamped());
        if parallel {
            buf.par_chunks_mut(4 * 1024)
                .for_each(|chunk| ops.apply_premul(chunk));
        } else {
            ops.apply_premul(buf);
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ColorOps {
    brightness: f32,
    contrast: f32,
    saturate: [f32; 9],
}

impl ColorOps {
    fn from_chain(c: &FilterChain) -> Self {
        Self {
            brightness: (c.brightness / 100.0) as f32,
            contrast: (c.contrast / 100.0) as f32,
            saturate: saturate_matrix((c.saturation / 100.0) as f32),
        }
    }

    /// Each stage clamps its output before the next one, as chained CSS filters do.
    fn apply_straight(&self, rgb: [f32; 3]) -> [f32; 3] {
        let b = self.brightness;
        let rgb = rgb.map(|v| (v * b).clamp(0.0, 1.0));
        let k = self.contrast;
        let rgb = rgb.map(|v| (v * k + 0.5 - 0.5 * k).clamp(0.0, 1.0));
        let m = &self.saturate;
        [
            (m[0] * rgb[0] + m[1] * rgb[1] + m[2] * rgb[2]).clamp(0.0, 1.0),
            (m[3] * rgb[0] + m[4] * rgb[1] + m[5] * rgb[2]).clamp(0.0, 1.0),
            (m[6] * rgb[0] + m[7] * rgb[1] + m[8] * rgb[2]).clamp(0.0, 1.0),
        ]
    }

    fn apply_premul(&self, buf: &mut [u8]) {
        for px in buf.chunks_exact_mut(4) {
            let a = px[3] as f32 / 255.0;
            if a <= 0.0 {
                continue;
            }
            let inv_a = 1.0 / a;
            let rgb = [
                (px[0] as f32 / 255.0 * inv_a).min(1.0),
                (px[1] as f32 / 255.0 * inv_a).min(1.0),
                (px[2] as f32 / 255.0 * inv_a).min(1.0),
            ];
            let out = self.apply_straight(rgb);
            for c in 0..3 {
                px[c] = (out[c] * a * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Row-major 3x3 saturate matrix from the CSS filter effects definition.
pub(crate) fn saturate_matrix(s: f32) -> [f32; 9] {
    [
        0.213 + 0.787 * s,
        0.715 - 0.715 * s,
        0.072 - 0.072 * s,
        0.213 - 0.213 * s,
        0.715 + 0.285 * s,
        0.072 - 0.072 * s,
        0.213 - 0.213 * s,
        0.715 - 0.715 * s,
        0.072 + 0.928 * s,
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filters.rs"]
mod tests;
