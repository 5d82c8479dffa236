use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::error::{GradiiError, GradiiResult};
use crate::scene::model::{Overlay, ShapeDef, WallpaperDef};
use crate::scene::presets::{BACKGROUND_PRESETS, FONT_SIZES, FONTS, SHAPE_COUNT_RANGE};

/// Settings a shuffle leaves alone once the user has touched them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Background fill color.
    BackgroundColor,
    /// Text font family.
    FontFamily,
    /// Text font weight.
    FontWeight,
    /// Text font size.
    FontSize,
    /// Text letter spacing.
    LetterSpacing,
}

/// Set of properties the user changed by hand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifiedProperties(BTreeSet<Property>);

impl ModifiedProperties {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a manual change.
    pub fn track(&mut self, p: Property) {
        self.0.insert(p);
    }

    /// Whether `p` was changed by hand.
    pub fn contains(&self, p: Property) -> bool {
        self.0.contains(&p)
    }
}

/// One-deep undo slot for shape sets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaletteHistory {
    previous: Option<Vec<ShapeDef>>,
}

impl PaletteHistory {
    /// Whether a previous shape set is stored.
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// Shuffle: move every shape to a random origin, keep the old set in `history` and re-roll the
/// untouched text and background properties.
pub fn generate_new_palette<R: Rng + ?Sized>(
    def: &mut WallpaperDef,
    history: &mut PaletteHistory,
    modified: &ModifiedProperties,
    rng: &mut R,
) {
    history.previous = Some(def.shapes.clone());
    for s in &mut def.shapes {
        s.x = rng.gen_range(0.0..100.0);
        s.y = rng.gen_range(0.0..100.0);
    }

    if !modified.contains(Property::BackgroundColor)
        && let Some(&[r, g, b]) = BACKGROUND_PRESETS.choose(rng)
    {
        def.background.color = Color::rgb8(r, g, b);
    }

    let Overlay::Text(text) = &mut def.overlay else {
        return;
    };
    if !modified.contains(Property::FontFamily)
        && let Some((name, _)) = FONTS.choose(rng)
    {
        text.font_family = (*name).to_owned();
    }
    if !modified.contains(Property::FontWeight)
        && let Some((_, weights)) = FONTS.choose(rng)
        && let Some(&w) = weights.choose(rng)
    {
        text.font_weight = w;
    }
    if !modified.contains(Property::FontSize)
        && let Some(&size) = FONT_SIZES.choose(rng)
    {
        text.font_size = size;
    }
    if !modified.contains(Property::LetterSpacing) {
        let v: f64 = rng.gen_range(0.0..1.0) * 0.15 - 0.05;
        text.letter_spacing = (v * 100.0).round() / 100.0;
    }
}

/// Bring back the shapes from before the last shuffle; the undo slot is emptied.
/// Returns whether anything was restored.
pub fn restore_previous_palette(def: &mut WallpaperDef, history: &mut PaletteHistory) -> bool {
    match history.previous.take() {
        Some(prev) if !prev.is_empty() => {
            def.shapes = prev;
            true
        }
        _ => false,
    }
}

/// Grow or shrink the shape list; new shapes cycle through the palette at random origins.
/// `n` is clamped to the supported range.
pub fn set_shape_count<R: Rng + ?Sized>(def: &mut WallpaperDef, n: usize, rng: &mut R) {
    let n = n.clamp(*SHAPE_COUNT_RANGE.start(), *SHAPE_COUNT_RANGE.end());
    if n <= def.shapes.len() {
        def.shapes.truncate(n);
        return;
    }
    if def.palette.is_empty() {
        def.palette = crate::scene::presets::initial_palette();
    }
    for i in def.shapes.len()..n {
        let color = def.palette[i % def.palette.len()];
        def.shapes.push(ShapeDef {
            x: rng.gen_range(0.0..100.0),
            y: rng.gen_range(0.0..100.0),
            color,
        });
    }
}

/// Recolor one shape.
pub fn update_shape_color(def: &mut WallpaperDef, index: usize, color: Color) -> GradiiResult<()> {
    let len = def.shapes.len();
    let shape = def.shapes.get_mut(index).ok_or_else(|| {
        GradiiError::validation(format!("shape index {index} out of range (have {len})"))
    })?;
    shape.color = color;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/palette.rs"]
mod tests;
