use super::*;
use crate::scene::model::{LogoOverlay, TextOverlay};

#[test]
fn defaults_are_valid() {
    validate_wallpaper(&WallpaperDef::default()).unwrap();
}

#[test]
fn canvas_out_of_range_reports_path() {
    let mut def = WallpaperDef::default();
    def.canvas.width = 0;
    def.canvas.height = 4000;
    let err = validate_wallpaper(&def).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("$.canvas.width: must be in 1..=2560, got 0"), "{msg}");
    assert!(msg.contains("$.canvas.height"), "{msg}");
    assert_eq!(err.errors.len(), 2);
}

#[test]
fn slider_values_out_of_range_are_not_errors() {
    let mut def = WallpaperDef::default();
    def.filters.blur = -50.0;
    def.filters.contrast = 0.0;
    def.effects.grain = 500.0;
    validate_wallpaper(&def).unwrap();
}

#[test]
fn non_finite_values_are_rejected_with_index() {
    let mut def = WallpaperDef::default();
    def.shapes[2].y = f64::NAN;
    def.filters.saturation = f64::INFINITY;
    let msg = validate_wallpaper(&def).unwrap_err().to_string();
    assert!(msg.contains("$.shapes[2].y"), "{msg}");
    assert!(msg.contains("$.filters.saturation"), "{msg}");
}

#[test]
fn text_and_logo_checks() {
    let mut def = WallpaperDef::default();
    def.overlay = Overlay::Text(TextOverlay {
        font_size: 0.0,
        font_weight: 0,
        ..TextOverlay::default()
    });
    let msg = validate_wallpaper(&def).unwrap_err().to_string();
    assert!(msg.contains("$.overlay.font_size"), "{msg}");
    assert!(msg.contains("$.overlay.font_weight"), "{msg}");

    def.overlay = Overlay::Logo(LogoOverlay::default());
    let msg = validate_wallpaper(&def).unwrap_err().to_string();
    assert!(msg.contains("logo overlay requires an image"), "{msg}");
}

#[test]
fn too_many_shapes_and_empty_palette() {
    let mut def = WallpaperDef::default();
    let s = def.shapes[0];
    def.shapes = vec![s; 11];
    def.palette.clear();
    let err = validate_wallpaper(&def).unwrap_err();
    assert_eq!(err.errors.len(), 2);
}
