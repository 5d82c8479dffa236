use std::sync::Arc;

use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Affine, BezPath, Canvas};
use crate::foundation::error::{GradiiError, GradiiResult};

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn color_paint(c: Color) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> GradiiResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| GradiiError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| GradiiError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(GradiiError::render("pixmap byte len mismatch"));
    }
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

pub(crate) fn image_paint(img: &PreparedImage) -> GradiiResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Rasterizes one layer at a time into a transparent buffer, keeping the target pixmap around
/// while the canvas size stays the same.
#[derive(Default)]
pub(crate) struct Rasterizer {
    target: Option<(u16, u16, vello_cpu::Pixmap)>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("size", &self.target.as_ref().map(|(w, h, _)| (*w, *h)))
            .finish()
    }
}

impl Rasterizer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run `draw` against a fresh context sized to `canvas` and return the premultiplied result.
    pub(crate) fn rasterize(
        &mut self,
        canvas: Canvas,
        draw: impl FnOnce(&mut vello_cpu::RenderContext) -> GradiiResult<()>,
    ) -> GradiiResult<Vec<u8>> {
        let (width, height) = canvas.size_u16()?;
        let mut pixmap = match self.target.take() {
            Some((w, h, pixmap)) if w == width && h == height => pixmap,
            _ => vello_cpu::Pixmap::new(width, height),
        };

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let drawn = draw(&mut ctx);
        let out = drawn.map(|()| {
            pixmap.data_as_u8_slice_mut().fill(0);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            pixmap.data_as_u8_slice().to_vec()
        });
        self.target = Some((width, height, pixmap));
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
