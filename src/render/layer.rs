use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::foundation::error::GradiiResult;
use crate::foundation::math::derive_seed;
use crate::render::shape::{blob_path, shape_origin};
use crate::render::surface::{Rasterizer, affine_to_cpu, bezpath_to_cpu, color_paint, image_paint};
use crate::scene::model::ShapeDef;

/// Placement of an image scaled to cover the whole canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale factor.
    pub scale: f64,
    /// Top-left corner of the scaled image in canvas pixels (negative when cropped).
    pub offset: Vec2,
}

impl CoverFit {
    /// Image-space to canvas-space transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }
}

/// `scale = max(Cw/Iw, Ch/Ih)`, centered on the canvas.
pub fn cover_fit(canvas: Canvas, image_w: u32, image_h: u32) -> CoverFit {
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let (iw, ih) = (f64::from(image_w.max(1)), f64::from(image_h.max(1)));
    let scale = (cw / iw).max(ch / ih);
    CoverFit {
        scale,
        offset: Vec2::new((cw - iw * scale) / 2.0, (ch - ih * scale) / 2.0),
    }
}

/// What sits on top of the solid fill in the background layer.
#[derive(Clone, Copy, Debug)]
pub enum BackgroundSource<'a> {
    /// Nothing; the layer is the plain fill.
    Solid,
    /// Blob shapes in list order.
    Shapes(&'a [ShapeDef]),
    /// A cover-fit photo. Shapes are suppressed while it is present.
    Image(&'a PreparedImage),
}

/// Rasterize the background layer: solid fill plus shapes or photo.
///
/// Unseeded shapes get fresh jitter on every call.
pub(crate) fn render_background(
    raster: &mut Rasterizer,
    canvas: Canvas,
    color: Color,
    source: BackgroundSource<'_>,
    seed: Option<u64>,
) -> GradiiResult<Vec<u8>> {
    let full = vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(canvas.width),
        f64::from(canvas.height),
    );
    raster.rasterize(canvas, |ctx| {
        ctx.set_paint(color_paint(color));
        ctx.fill_rect(&full);

        match source {
            BackgroundSource::Solid => {}
            BackgroundSource::Shapes(shapes) => {
                let mut rng = match seed {
                    Some(s) => StdRng::seed_from_u64(derive_seed(s, b"shapes")),
                    None => StdRng::from_entropy(),
                };
                for shape in shapes {
                    let path = blob_path(shape_origin(shape, canvas), canvas, &mut rng);
                    ctx.set_paint(color_paint(shape.color));
                    ctx.fill_path(&bezpath_to_cpu(&path));
                }
            }
            BackgroundSource::Image(img) => {
                let fit = cover_fit(canvas, img.width, img.height);
                let paint = image_paint(img)?;
                ctx.set_transform(affine_to_cpu(fit.transform()));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(img.width),
                    f64::from(img.height),
                ));
            }
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/layer.rs"]
mod tests;
