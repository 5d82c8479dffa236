//! Product constants: palettes, resolutions, preview boxes and blur steps.

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::core::Canvas;

const INITIAL_PALETTE: [[u8; 3]; 9] = [
    [0x00, 0x12, 0x20],
    [0xFF, 0x66, 0x00],
    [0x00, 0x2B, 0x50],
    [0xFF, 0xB3, 0x66],
    [0x00, 0x40, 0x80],
    [0xFF, 0x80, 0x00],
    [0x00, 0x66, 0xCC],
    [0x00, 0x00, 0x00],
    [0x66, 0xA3, 0xFF],
];

/// Dark background colors a shuffle may pick from.
pub const BACKGROUND_PRESETS: [[u8; 3]; 9] = [
    [0x0D, 0x13, 0x19],
    [0x0D, 0x15, 0x1A],
    [0x0D, 0x16, 0x1C],
    [0x0D, 0x17, 0x1D],
    [0x0D, 0x19, 0x1F],
    [0x1A, 0x16, 0x0D],
    [0x1A, 0x13, 0x0D],
    [0x1A, 0x11, 0x0D],
    [0x0D, 0x0D, 0x0D],
];

/// Font sizes a shuffle may pick from.
pub const FONT_SIZES: [f64; 10] = [24.0, 28.0, 32.0, 36.0, 40.0, 44.0, 48.0, 52.0, 56.0, 60.0];

/// Allowed shape count range.
pub const SHAPE_COUNT_RANGE: std::ops::RangeInclusive<usize> = 1..=10;

/// Blur used when a background image is removed while blur is off.
pub const RESTORED_BLUR: f64 = 600.0;

/// Fonts offered by the editor and the weights each ships.
pub const FONTS: &[(&str, &[u16])] = &[
    ("Bricolage Grotesque", &[200, 300, 400, 500, 600, 700, 800]),
    ("Geist", &[100, 200, 300, 400, 500, 600, 700, 800, 900]),
    ("Inter", &[100, 200, 300, 400, 500, 600, 700, 800, 900]),
    ("Manrope", &[200, 300, 400, 500, 600, 700, 800]),
    ("Montserrat", &[100, 200, 300, 400, 500, 600, 700, 800, 900]),
    ("Onest", &[100, 200, 300, 400, 500, 600, 700, 800, 900]),
    ("Poppins", &[100, 200, 300, 400, 500, 600, 700, 800, 900]),
    ("Space Grotesk", &[300, 400, 500, 600, 700]),
    ("DM Serif Display", &[400]),
    ("Instrument Serif", &[400]),
    ("Lora", &[400, 500, 600, 700]),
    ("Ms Madi", &[400]),
    ("Space Mono", &[400, 700]),
];

/// The nine starting shape colors.
pub fn initial_palette() -> Vec<Color> {
    INITIAL_PALETTE
        .iter()
        .map(|&[r, g, b]| Color::rgb8(r, g, b))
        .collect()
}

/// `#0D1319`.
pub fn default_background() -> Color {
    let [r, g, b] = BACKGROUND_PRESETS[0];
    Color::rgb8(r, g, b)
}

/// Output aspect ratio family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 16:9.
    Desktop,
    /// 9:16.
    Mobile,
    /// 1:1.
    Square,
}

impl AspectRatio {
    /// Fixed box the preview is fitted into.
    pub fn preview_box(self) -> (u32, u32) {
        match self {
            Self::Desktop => (768, 432),
            Self::Mobile => (293, 520),
            Self::Square => (520, 520),
        }
    }

    /// Export resolutions offered for this ratio.
    pub fn resolutions(self) -> [Resolution; 2] {
        let (hd, qhd) = match self {
            Self::Desktop => ((1920, 1080), (2560, 1440)),
            Self::Mobile => ((1080, 1920), (1440, 2560)),
            Self::Square => ((1080, 1080), (1440, 1440)),
        };
        [
            Resolution {
                name: "HD",
                canvas: Canvas {
                    width: hd.0,
                    height: hd.1,
                },
            },
            Resolution {
                name: "2K",
                canvas: Canvas {
                    width: qhd.0,
                    height: qhd.1,
                },
            },
        ]
    }
}

/// Named export resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Display name.
    pub name: &'static str,
    /// Pixel size.
    pub canvas: Canvas,
}

/// Named blur slider step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlurPreset {
    /// Display name.
    pub name: &'static str,
    /// Blur value.
    pub value: f64,
}

const BLUR_PRESETS: [BlurPreset; 4] = [
    BlurPreset { name: "None", value: 0.0 },
    BlurPreset { name: "Low", value: 600.0 },
    BlurPreset { name: "Medium", value: 900.0 },
    BlurPreset { name: "High", value: 1200.0 },
];

const FALLBACK_BLUR_PRESETS: [BlurPreset; 4] = [
    BlurPreset { name: "None", value: 0.0 },
    BlurPreset { name: "Low", value: 400.0 },
    BlurPreset { name: "Medium", value: 600.0 },
    BlurPreset { name: "High", value: 800.0 },
];

/// Blur steps for the host; hosts without native filters get gentler values.
pub fn blur_presets(supports_canvas_filters: bool) -> &'static [BlurPreset; 4] {
    if supports_canvas_filters {
        &BLUR_PRESETS
    } else {
        &FALLBACK_BLUR_PRESETS
    }
}

/// Display scale that fits `canvas` inside a preview box: `min(box_w / W, box_h / H)`.
pub fn preview_scale(canvas: Canvas, preview_box: (u32, u32)) -> f64 {
    let sx = f64::from(preview_box.0) / f64::from(canvas.width.max(1));
    let sy = f64::from(preview_box.1) / f64::from(canvas.height.max(1));
    sx.min(sy)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/presets.rs"]
mod tests;
