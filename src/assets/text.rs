use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{GradiiError, GradiiResult};
use crate::foundation::math::Fnv1a64;

/// Font file loaded into memory, identified by a content hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFace {
    key: u64,
    bytes: Arc<Vec<u8>>,
}

impl FontFace {
    /// Wrap raw TTF/OTF bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> GradiiResult<Self> {
        if bytes.is_empty() {
            return Err(GradiiError::validation("font file is empty"));
        }
        let mut h = Fnv1a64::new_default();
        h.write_bytes(&bytes);
        Ok(Self {
            key: h.finish(),
            bytes: Arc::new(bytes),
        })
    }

    /// Read a font file from disk.
    pub fn from_path(path: &Path) -> GradiiResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    /// Load a font from a settings reference: a `data:` URL, or a file path resolved against
    /// `base_dir` when relative.
    pub fn from_reference(reference: &str, base_dir: Option<&Path>) -> GradiiResult<Self> {
        let reference = reference.trim();
        if reference.starts_with("data:") {
            let url = data_url::DataUrl::process(reference)
                .map_err(|e| GradiiError::validation(format!("malformed font data URL: {e:?}")))?;
            let (bytes, _) = url.decode_to_vec().map_err(|e| {
                GradiiError::validation(format!("invalid base64 in font data URL: {e:?}"))
            })?;
            return Self::from_bytes(bytes);
        }
        let path = Path::new(reference);
        match base_dir {
            Some(dir) if path.is_relative() => Self::from_path(&dir.join(path)),
            _ => Self::from_path(path),
        }
    }

    /// Content hash used as cache key.
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Raw font bytes.
    pub fn bytes(&self) -> &Arc<Vec<u8>> {
        &self.bytes
    }

    pub(crate) fn to_cpu_font(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(self.bytes.as_ref().clone()),
            0,
        )
    }
}

/// One shaped glyph; `x_offset`/`y` are relative to the pen position and baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    /// Glyph id inside the font.
    pub id: u32,
    /// Horizontal offset from the pen position.
    pub x_offset: f32,
    /// Vertical offset from the baseline.
    pub y: f32,
    /// Natural advance width.
    pub advance: f32,
}

/// A single shaped line of text with its vertical metrics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedLine {
    /// Glyphs in visual order.
    pub glyphs: Vec<ShapedGlyph>,
    /// Distance from the baseline to the top of the line box.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f32,
}

impl ShapedLine {
    /// Natural advance widths, one per glyph.
    pub fn advances(&self) -> Vec<f64> {
        self.glyphs.iter().map(|g| f64::from(g.advance)).collect()
    }
}

/// Parley-backed shaper for single lines of overlay text.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    families: HashMap<u64, String>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextShaper")
            .field("families", &self.families.len())
            .finish_non_exhaustive()
    }
}

impl TextShaper {
    /// Fresh shaper with empty Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, font: &FontFace) -> GradiiResult<String> {
        if let Some(name) = self.families.get(&font.key) {
            return Ok(name.clone());
        }
        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| GradiiError::validation("no font families registered from font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| GradiiError::validation("registered font family has no name"))?
            .to_string();
        self.families.insert(font.key, name.clone());
        Ok(name)
    }

    /// Shape one line of text without wrapping.
    pub fn shape_line(
        &mut self,
        font: &FontFace,
        text: &str,
        size_px: f32,
        weight: f32,
    ) -> GradiiResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(GradiiError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(weight.clamp(1.0, 1000.0)),
        ));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let mut out = ShapedLine::default();
        for line in layout.lines() {
            let m = line.metrics();
            out.ascent = out.ascent.max(m.ascent);
            out.descent = out.descent.max(m.descent);
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                out.glyphs.extend(run.glyphs().map(|g| ShapedGlyph {
                    id: g.id,
                    x_offset: g.x,
                    y: g.y,
                    advance: g.advance,
                }));
            }
        }
        if out.ascent <= 0.0 {
            out.ascent = size_px * 0.8;
            out.descent = size_px * 0.2;
        }
        Ok(out)
    }
}

/// Locate a usable font for tests and the bench: `tests/data/fonts/` first, then common system
/// directories.
pub fn find_fallback_font() -> Option<std::path::PathBuf> {
    let mut dirs: std::collections::VecDeque<std::path::PathBuf> = [
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts"),
        std::path::PathBuf::from("/usr/share/fonts"),
        std::path::PathBuf::from("/usr/local/share/fonts"),
        std::path::PathBuf::from("/Library/Fonts"),
        std::path::PathBuf::from("/System/Library/Fonts"),
        std::path::PathBuf::from("C:\\Windows\\Fonts"),
    ]
    .into_iter()
    .collect();
    while let Some(dir) = dirs.pop_front() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut sub = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                sub.push(path);
                continue;
            }
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            if matches!(ext.as_deref(), Some("ttf") | Some("otf")) {
                return Some(path);
            }
        }
        sub.sort();
        dirs.extend(sub);
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
