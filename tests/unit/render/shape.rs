use super::*;
use kurbo::{PathEl, Shape};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn canvas() -> Canvas {
    Canvas {
        width: 1920,
        height: 1080,
    }
}

#[test]
fn radius_and_origin_follow_canvas() {
    assert!((blob_radius(canvas()) - 324.0).abs() < 1e-9);
    let s = ShapeDef {
        x: 50.0,
        y: 25.0,
        color: crate::assets::color::Color::rgb8(0, 0, 0),
    };
    assert_eq!(shape_origin(&s, canvas()), Point::new(960.0, 270.0));
}

#[test]
fn origin_is_clamped_to_canvas() {
    let s = ShapeDef {
        x: -40.0,
        y: 250.0,
        color: crate::assets::color::Color::rgb8(0, 0, 0),
    };
    assert_eq!(shape_origin(&s, canvas()), Point::new(0.0, 1080.0));
}

#[test]
fn blob_is_closed_six_segment_path() {
    let mut rng = StdRng::seed_from_u64(1);
    let p = blob_path(Point::new(500.0, 400.0), canvas(), &mut rng);
    let els = p.elements();
    assert_eq!(els.len(), 8);
    assert_eq!(els[0], PathEl::MoveTo(Point::new(824.0, 400.0)));
    assert_eq!(
        els.iter()
            .filter(|e| matches!(e, PathEl::CurveTo(..)))
            .count(),
        6
    );
    assert_eq!(els[7], PathEl::ClosePath);
}

#[test]
fn vertices_stay_within_jitter_band() {
    let origin = Point::new(0.0, 0.0);
    let r = blob_radius(canvas());
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let p = blob_path(origin, canvas(), &mut rng);
        for el in p.elements() {
            if let PathEl::CurveTo(c1, c2, end) = *el {
                let d = end.distance(origin);
                assert!(d >= r * 0.8 - 1e-9 && d <= r * 1.2 + 1e-9, "vertex {d}");
                let (d1, d2) = (c1.distance(origin), c2.distance(origin));
                assert!((d1 - d2).abs() < 1e-9);
                assert!(d1 >= r * 1.2 - 1e-9 && d1 <= r * 1.6 + 1e-9);
            }
        }
    }
}

#[test]
fn seeded_blobs_repeat() {
    let a = blob_path(Point::new(10.0, 10.0), canvas(), &mut StdRng::seed_from_u64(9));
    let b = blob_path(Point::new(10.0, 10.0), canvas(), &mut StdRng::seed_from_u64(9));
    let c = blob_path(Point::new(10.0, 10.0), canvas(), &mut StdRng::seed_from_u64(10));
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.bounding_box().width() > 0.0);
}
