//! Text and logo overlay: pure layout math plus the raster pass that embeds the overlay into the
//! composited buffer.
//!
//! Layout is split from drawing so preview and export share exactly the same positions.

use crate::assets::decode::PreparedImage;
use crate::assets::text::{FontFace, ShapedLine, TextShaper};
use crate::effects::blur::gaussian_blur_premul;
use crate::effects::composite::{
    BlendMode, PremulView, composite_in_place, over_offset_in_place, tint_silhouette_in_place,
};
use crate::foundation::core::{Affine, Canvas, Rect};
use crate::foundation::error::GradiiResult;
use crate::foundation::math::clamp_finite;
use crate::render::surface::{Rasterizer, affine_to_cpu, color_paint, image_paint};
use crate::scene::model::{LogoOverlay, OffsetDef, Overlay, ShadowDef, TextAlign, TextOverlay};

/// Horizontal shear used for faux italic.
pub const ITALIC_SKEW: f64 = -0.2;
/// Underline sits this many pixels below the baseline.
pub const UNDERLINE_OFFSET: f64 = 3.0;

/// Glyph positioned in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    /// Glyph id inside the font.
    pub id: u32,
    /// Pen x in canvas pixels.
    pub x: f64,
    /// Baseline y in canvas pixels.
    pub y: f64,
}

/// One laid-out line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineLayout {
    /// Left edge of the line.
    pub left: f64,
    /// Measured width including letter spacing.
    pub width: f64,
    /// Baseline y.
    pub baseline: f64,
    /// Glyphs in drawing order.
    pub glyphs: Vec<PlacedGlyph>,
}

/// Result of [`layout_text`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayout {
    /// Lines top to bottom.
    pub lines: Vec<LineLayout>,
    /// Underline and strikethrough bars.
    pub decorations: Vec<Rect>,
    /// Horizontal shear around each baseline, `0.0` when upright.
    pub skew_x: f64,
    /// Font size in pixels.
    pub font_size: f64,
}

/// Pen positions for glyphs of the given natural widths with `spacing` pixels between them.
///
/// Returns the starting x of each glyph and the line width `Σ(w + s) - s`; trailing spacing is not
/// counted so the line stays visually centered.
pub fn letter_spaced_advances(widths: &[f64], spacing: f64) -> (Vec<f64>, f64) {
    let mut pen = 0.0;
    let mut xs = Vec::with_capacity(widths.len());
    for &w in widths {
        xs.push(pen);
        pen += w + spacing;
    }
    let total = if widths.is_empty() { 0.0 } else { pen - spacing };
    (xs, total)
}

/// Position shaped lines on the canvas.
///
/// The block is centered on the canvas center shifted by `style.offset`. Baselines follow
/// `H/2 - (n-1)·lh/2 + i·lh` with `lh = font_size · line_height`.
pub fn layout_text(canvas: Canvas, style: &TextOverlay, lines: &[ShapedLine]) -> TextLayout {
    let size = style.font_size.max(0.0);
    let spacing = style.letter_spacing * size;
    let lh = size * style.line_height;
    let center = canvas.center();
    let anchor_x = center.x + style.offset.x;
    let anchor_y = center.y + style.offset.y;
    let n = lines.len() as f64;

    let measured: Vec<(Vec<f64>, f64)> = lines
        .iter()
        .map(|l| letter_spaced_advances(&l.advances(), spacing))
        .collect();
    let block_w = measured.iter().map(|(_, w)| *w).fold(0.0, f64::max);
    let block_left = anchor_x - block_w / 2.0;

    let thickness = (size / 16.0).max(1.0);
    let mut decorations = Vec::new();
    let mut out = Vec::with_capacity(lines.len());
    for (i, (line, (xs, width))) in lines.iter().zip(measured).enumerate() {
        let baseline = anchor_y - (n - 1.0) * lh / 2.0 + i as f64 * lh;
        let left = match style.align {
            TextAlign::Left => block_left,
            TextAlign::Center => anchor_x - width / 2.0,
            TextAlign::Right => block_left + block_w - width,
        };
        let glyphs = line
            .glyphs
            .iter()
            .zip(xs)
            .map(|(g, x)| PlacedGlyph {
                id: g.id,
                x: left + x + f64::from(g.x_offset),
                y: baseline + f64::from(g.y),
            })
            .collect();

        if width > 0.0 {
            let bar = |y: f64| Rect::new(left, y - thickness / 2.0, left + width, y + thickness / 2.0);
            if style.underline {
                decorations.push(bar(baseline + UNDERLINE_OFFSET));
            }
            if style.strikethrough {
                decorations.push(bar(baseline - size / 4.0));
            }
        }
        out.push(LineLayout {
            left,
            width,
            baseline,
            glyphs,
        });
    }

    TextLayout {
        lines: out,
        decorations,
        skew_x: if style.italic { ITALIC_SKEW } else { 0.0 },
        font_size: size,
    }
}

/// Logo destination: the image contain-fit into `scale_pct` percent of each canvas side, centered
/// on the canvas center plus `offset`.
pub fn logo_rect(
    canvas: Canvas,
    image_w: u32,
    image_h: u32,
    scale_pct: f64,
    offset: &OffsetDef,
) -> Rect {
    let pct = clamp_finite(scale_pct, 1.0, 100.0) / 100.0;
    let (iw, ih) = (f64::from(image_w.max(1)), f64::from(image_h.max(1)));
    let bw = f64::from(canvas.width) * pct;
    let bh = f64::from(canvas.height) * pct;
    let s = (bw / iw).min(bh / ih);
    let c = canvas.center();
    let (cx, cy) = (c.x + offset.x, c.y + offset.y);
    let (w, h) = (iw * s, ih * s);
    Rect::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
}

/// Resources the overlay may need; missing ones make the overlay a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlayAssets<'a> {
    /// Font for the text overlay's family.
    pub font: Option<&'a FontFace>,
    /// Decoded logo image.
    pub logo: Option<&'a PreparedImage>,
}

/// Largest shadow blur radius, in canvas pixels.
pub const MAX_SHADOW_BLUR: f64 = 80.0;

/// Gaussian sigma for a shadow: half the clamped blur radius.
pub(crate) fn shadow_sigma(shadow: &ShadowDef) -> f32 {
    (clamp_finite(shadow.blur, 0.0, MAX_SHADOW_BLUR) / 2.0) as f32
}

/// Draw the overlay into `target` (premultiplied, canvas-sized).
pub(crate) fn draw_overlay(
    target: &mut [u8],
    canvas: Canvas,
    overlay: &Overlay,
    assets: OverlayAssets<'_>,
    raster: &mut Rasterizer,
    shaper: &mut TextShaper,
    parallel: bool,
) -> GradiiResult<()> {
    match overlay {
        Overlay::None => Ok(()),
        Overlay::Text(style) => {
            if style.text.trim().is_empty() {
                return Ok(());
            }
            let Some(font) = assets.font else {
                tracing::warn!(family = %style.font_family, "no font loaded, skipping text overlay");
                return Ok(());
            };
            let layer = rasterize_text(canvas, style, font, raster, shaper)?;
            let opacity = percent(style.opacity);
            composite_with_shadow(target, layer, canvas, &style.shadow, opacity, parallel)
        }
        Overlay::Logo(logo) => {
            let Some(img) = assets.logo else {
                tracing::debug!("logo not loaded yet, skipping logo overlay");
                return Ok(());
            };
            let layer = rasterize_logo(canvas, logo, img, raster)?;
            let opacity = percent(logo.opacity);
            composite_with_shadow(target, layer, canvas, &logo.shadow, opacity, parallel)
        }
    }
}

fn percent(v: f64) -> f32 {
    (clamp_finite(v, 0.0, 100.0) / 100.0) as f32
}

fn rasterize_text(
    canvas: Canvas,
    style: &TextOverlay,
    font: &FontFace,
    raster: &mut Rasterizer,
    shaper: &mut TextShaper,
) -> GradiiResult<Vec<u8>> {
    let size = style.font_size as f32;
    let weight = f32::from(style.font_weight);
    let shaped = style
        .text
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                Ok(ShapedLine::default())
            } else {
                shaper.shape_line(font, line, size, weight)
            }
        })
        .collect::<GradiiResult<Vec<_>>>()?;
    let layout = layout_text(canvas, style, &shaped);
    let cpu_font = font.to_cpu_font();
    let paint = color_paint(style.color);

    raster.rasterize(canvas, |ctx| {
        for line in &layout.lines {
            let shear = Affine::translate((0.0, line.baseline))
                * Affine::skew(layout.skew_x, 0.0)
                * Affine::translate((0.0, -line.baseline));
            ctx.set_transform(affine_to_cpu(shear));
            ctx.set_paint(paint);
            let glyphs = line.glyphs.iter().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x as f32,
                y: g.y as f32,
            });
            ctx.glyph_run(&cpu_font)
                .font_size(layout.font_size as f32)
                .fill_glyphs(glyphs);
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint);
        for r in &layout.decorations {
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
        }
        Ok(())
    })
}

fn rasterize_logo(
    canvas: Canvas,
    logo: &LogoOverlay,
    img: &PreparedImage,
    raster: &mut Rasterizer,
) -> GradiiResult<Vec<u8>> {
    let dest = logo_rect(canvas, img.width, img.height, logo.scale_pct, &logo.offset);
    let s = dest.width() / f64::from(img.width.max(1));
    let tr = Affine::translate((dest.x0, dest.y0)) * Affine::scale(s);
    let paint = image_paint(img)?;
    raster.rasterize(canvas, |ctx| {
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(img.width),
            f64::from(img.height),
        ));
        Ok(())
    })
}

/// Shadow pass (tinted silhouette, Gaussian blur with `σ = blur/2`, offset) followed by the solid
/// layer, both at `opacity`.
fn composite_with_shadow(
    target: &mut [u8],
    layer: Vec<u8>,
    canvas: Canvas,
    shadow: &ShadowDef,
    opacity: f32,
    parallel: bool,
) -> GradiiResult<()> {
    if opacity <= 0.0 {
        return Ok(());
    }
    if shadow.enabled {
        let mut silhouette = layer.clone();
        tint_silhouette_in_place(&mut silhouette, shadow.color.to_rgba8_premul().to_array());
        let sigma = shadow_sigma(shadow);
        gaussian_blur_premul(&mut silhouette, canvas.width, canvas.height, sigma, parallel)?;

        let mut shifted = vec![0u8; canvas.byte_len()];
        over_offset_in_place(
            &mut shifted,
            canvas.width,
            canvas.height,
            PremulView {
                bytes: &silhouette,
                width: canvas.width,
                height: canvas.height,
            },
            finite_round(shadow.offset_x),
            finite_round(shadow.offset_y),
        )?;
        composite_in_place(target, &shifted, opacity, BlendMode::Normal)?;
    }
    composite_in_place(target, &layer, opacity, BlendMode::Normal)
}

fn finite_round(v: f64) -> i64 {
    if v.is_finite() {
        v.round().clamp(-1e6, 1e6) as i64
    } else {
        0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
