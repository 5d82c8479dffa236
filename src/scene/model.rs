use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::effects::filters::FilterChain;
use crate::foundation::core::Canvas;
use crate::scene::presets;

/// Full wallpaper settings snapshot.
///
/// Missing fields take the product defaults, so `{}` is a valid settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallpaperDef {
    /// Output resolution.
    pub canvas: Canvas,
    /// Background fill and optional photo.
    pub background: BackgroundDef,
    /// Colors new shapes are drawn from when the shape count grows.
    pub palette: Vec<Color>,
    /// Blob shapes, drawn in order.
    pub shapes: Vec<ShapeDef>,
    /// Filter stack applied to the background layer.
    pub filters: FiltersDef,
    /// Grain and vignette.
    pub effects: EffectsDef,
    /// Text or logo drawn on top.
    pub overlay: Overlay,
    /// Font files keyed by family name (paths or data URLs).
    pub fonts: BTreeMap<String, String>,
    /// Makes shape jitter and grain reproducible when set.
    pub seed: Option<u64>,
}

impl Default for WallpaperDef {
    fn default() -> Self {
        let palette: Vec<Color> = presets::initial_palette();
        // Origins spread on a fixed grid so the default file is deterministic.
        let shapes = palette
            .iter()
            .enumerate()
            .map(|(i, &color)| ShapeDef {
                x: ((i % 3) as f64 * 35.0 + 15.0),
                y: ((i / 3) as f64 * 35.0 + 15.0),
                color,
            })
            .collect();
        Self {
            canvas: Canvas::default(),
            background: BackgroundDef::default(),
            palette,
            shapes,
            filters: FiltersDef::default(),
            effects: EffectsDef::default(),
            overlay: Overlay::Text(TextOverlay::default()),
            fonts: BTreeMap::new(),
            seed: None,
        }
    }
}

/// Background fill color and optional cover-fit photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundDef {
    /// Solid fill under everything.
    pub color: Color,
    /// Data URL or file path of a photo; when present, shapes are not drawn.
    pub image: Option<String>,
}

impl Default for BackgroundDef {
    fn default() -> Self {
        Self {
            color: presets::default_background(),
            image: None,
        }
    }
}

/// One blob shape anchored at a percentage position of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeDef {
    /// Horizontal anchor, percent of canvas width.
    pub x: f64,
    /// Vertical anchor, percent of canvas height.
    pub y: f64,
    /// Fill color.
    pub color: Color,
}

/// Filter slider values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersDef {
    /// Blur radius, `0..=1200`.
    pub blur: f64,
    /// Brightness percent, `0..=200`.
    pub brightness: f64,
    /// Contrast percent, `1..=200`.
    pub contrast: f64,
    /// Saturation percent, `0..=200`.
    pub saturation: f64,
}

impl Default for FiltersDef {
    fn default() -> Self {
        Self {
            blur: 500.0,
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
        }
    }
}

impl From<&FiltersDef> for FilterChain {
    fn from(f: &FiltersDef) -> Self {
        Self {
            blur: f.blur,
            brightness: f.brightness,
            contrast: f.contrast,
            saturation: f.saturation,
        }
    }
}

/// Grain and vignette intensities, both `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsDef {
    /// Film grain intensity.
    pub grain: f64,
    /// Vignette intensity.
    pub vignette: f64,
}

impl Default for EffectsDef {
    fn default() -> Self {
        Self {
            grain: 25.0,
            vignette: 0.0,
        }
    }
}

/// Content drawn above the filtered background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    /// Nothing on top.
    None,
    /// Multi-line styled text.
    Text(TextOverlay),
    /// Uploaded logo image.
    Logo(LogoOverlay),
}

impl Default for Overlay {
    fn default() -> Self {
        Self::Text(TextOverlay::default())
    }
}

/// Horizontal alignment of text lines inside the text block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Lines start at the block's left edge.
    Left,
    /// Lines are centered.
    #[default]
    Center,
    /// Lines end at the block's right edge.
    Right,
}

/// Shadow or glow drawn under the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowDef {
    /// Whether the shadow pass runs.
    pub enabled: bool,
    /// Shadow color.
    pub color: Color,
    /// Blur radius in pixels.
    pub blur: f64,
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Vertical offset in pixels.
    pub offset_y: f64,
}

impl Default for ShadowDef {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgb8(0xf5, 0xf5, 0xf5),
            blur: 24.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Offset from the canvas center, in canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetDef {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

/// Text overlay content and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOverlay {
    /// Content; `\n` separates lines.
    pub text: String,
    /// Family name, looked up in [`WallpaperDef::fonts`]; unknown families use the fallback font.
    pub font_family: String,
    /// Weight, `100..=900`.
    pub font_weight: u16,
    /// Size in canvas pixels.
    pub font_size: f64,
    /// Extra spacing between characters, in em.
    pub letter_spacing: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    /// Fill color.
    pub color: Color,
    /// Faux italic.
    pub italic: bool,
    /// Underline each line.
    pub underline: bool,
    /// Strike through each line.
    pub strikethrough: bool,
    /// Opacity percent, `0..=100`.
    pub opacity: f64,
    /// Line alignment inside the block.
    pub align: TextAlign,
    /// Optional shadow or glow.
    pub shadow: ShadowDef,
    /// Block position relative to the canvas center.
    pub offset: OffsetDef,
}

impl Default for TextOverlay {
    fn default() -> Self {
        Self {
            text: "Gradii.".to_owned(),
            font_family: "Onest".to_owned(),
            font_weight: 600,
            font_size: 36.0,
            letter_spacing: -0.02,
            line_height: 1.0,
            color: Color::rgb8(0xf1, 0xf1, 0xf1),
            italic: false,
            underline: false,
            strikethrough: false,
            opacity: 100.0,
            align: TextAlign::Center,
            shadow: ShadowDef::default(),
            offset: OffsetDef::default(),
        }
    }
}

/// Uploaded logo drawn centered on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoOverlay {
    /// Data URL or file path.
    pub image: String,
    /// Size of the fit box as a percentage of the canvas, `1..=100`.
    pub scale_pct: f64,
    /// Opacity percent, `0..=100`.
    pub opacity: f64,
    /// Drop shadow.
    pub shadow: ShadowDef,
    /// Position relative to the canvas center.
    pub offset: OffsetDef,
}

impl Default for LogoOverlay {
    fn default() -> Self {
        Self {
            image: String::new(),
            scale_pct: 30.0,
            opacity: 100.0,
            shadow: ShadowDef::default(),
            offset: OffsetDef::default(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
