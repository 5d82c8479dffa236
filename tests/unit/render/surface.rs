use super::*;

#[test]
fn pixmap_roundtrips_bytes() {
    let bytes = vec![10, 20, 30, 255, 0, 0, 0, 0];
    let pm = pixmap_from_premul_bytes(&bytes, 2, 1).unwrap();
    assert_eq!(pm.data_as_u8_slice(), bytes.as_slice());
    assert!(pixmap_from_premul_bytes(&bytes, 3, 1).is_err());
    assert!(pixmap_from_premul_bytes(&[], 70_000, 0).is_err());
}

#[test]
fn bezpath_conversion_keeps_elements() {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((1.0, 0.0));
    p.curve_to((1.0, 1.0), (0.0, 1.0), (0.0, 0.5));
    p.close_path();
    assert_eq!(bezpath_to_cpu(&p).elements().len(), 4);
}

#[test]
fn rasterize_fills_rect_and_reuses_target() {
    let canvas = Canvas {
        width: 8,
        height: 4,
    };
    let mut r = Rasterizer::new();
    let out = r
        .rasterize(canvas, |ctx| {
            ctx.set_paint(color_paint(Color::rgb8(255, 0, 0)));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 4.0, 4.0));
            Ok(())
        })
        .unwrap();
    assert_eq!(out.len(), canvas.byte_len());
    assert_eq!(&out[0..4], &[255, 0, 0, 255]);
    assert_eq!(out[7 * 4 + 3], 0);

    // A second pass starts from a clean target.
    let empty = r.rasterize(canvas, |_| Ok(())).unwrap();
    assert!(empty.iter().all(|&b| b == 0));
}

#[test]
fn rasterize_propagates_draw_errors() {
    let mut r = Rasterizer::new();
    let canvas = Canvas {
        width: 2,
        height: 2,
    };
    let err = r
        .rasterize(canvas, |_| Err(GradiiError::render("boom")))
        .unwrap_err();
    assert!(err.to_string().contains("boom"));
}
