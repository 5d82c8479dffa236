use std::f64::consts::PI;

use rand::Rng;

use crate::foundation::core::{BezPath, Canvas, Point};
use crate::foundation::math::clamp_finite;
use crate::scene::model::ShapeDef;

const BLOB_POINTS: u32 = 6;
const RADIUS_FRACTION: f64 = 0.3;
const VERTEX_VARIANCE: f64 = 0.4;

/// Blob radius for a canvas: 30% of the shorter side.
pub fn blob_radius(canvas: Canvas) -> f64 {
    f64::from(canvas.min_side()) * RADIUS_FRACTION
}

/// Pixel-space origin of a shape whose position is given in canvas percentages.
///
/// Positions outside `0..=100` are clamped to the canvas edge.
pub fn shape_origin(shape: &ShapeDef, canvas: Canvas) -> Point {
    Point::new(
        clamp_finite(shape.x, 0.0, 100.0) / 100.0 * f64::from(canvas.width),
        clamp_finite(shape.y, 0.0, 100.0) / 100.0 * f64::from(canvas.height),
    )
}

/// Closed six-vertex blob around `origin`.
///
/// Each vertex sits at a jittered radius (±20%) and every segment is a cubic whose two control
/// points share one radius in `1.2..1.6` times the base radius, rotated ±π/6 off the segment ends.
pub fn blob_path(origin: Point, canvas: Canvas, rng: &mut impl Rng) -> BezPath {
    let radius = blob_radius(canvas);
    let (x, y) = (origin.x, origin.y);
    let step = 2.0 * PI / f64::from(BLOB_POINTS);
    let half = PI / f64::from(BLOB_POINTS);

    let mut path = BezPath::new();
    path.move_to((x + radius, y));
    for i in 1..=BLOB_POINTS {
        let angle = f64::from(i) * step;
        let r = radius * (1.0 + (rng.r#gen::<f64>() - 0.5) * VERTEX_VARIANCE);
        let prev = f64::from(i - 1) * step;
        let cp_radius = radius * (1.2 + rng.r#gen::<f64>() * 0.4);

        let cp1 = (x + cp_radius * (prev + half).cos(), y + cp_radius * (prev + half).sin());
        let cp2 = (x + cp_radius * (angle - half).cos(), y + cp_radius * (angle - half).sin());
        path.curve_to(cp1, cp2, (x + r * angle.cos(), y + r * angle.sin()));
    }
    path.close_path();
    path
}

#[cfg(test)]
#[path = "../../tests/unit/render/shape.rs"]
mod tests;
