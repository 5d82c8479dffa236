use super::*;
use serde_json::json;

#[test]
fn empty_object_takes_product_defaults() {
    let def: WallpaperDef = serde_json::from_value(json!({})).unwrap();
    assert_eq!(def, WallpaperDef::default());
    assert_eq!(def.canvas.width, 1920);
    assert_eq!(def.background.color.to_hex(), "#0d1319");
    assert_eq!(def.filters.blur, 500.0);
    assert_eq!(def.effects.grain, 25.0);
    assert_eq!(def.effects.vignette, 0.0);
    assert_eq!(def.shapes.len(), 9);
    let Overlay::Text(t) = &def.overlay else {
        panic!("default overlay should be text");
    };
    assert_eq!(t.text, "Gradii.");
    assert_eq!(t.font_size, 36.0);
    assert_eq!(t.font_weight, 600);
    assert_eq!(t.letter_spacing, -0.02);
    assert_eq!(t.color.to_hex(), "#f1f1f1");
    assert_eq!(t.shadow.color.to_hex(), "#f5f5f5");
    assert_eq!(t.shadow.blur, 24.0);
}

#[test]
fn overlay_is_tagged() {
    let def: WallpaperDef = serde_json::from_value(json!({
        "overlay": {"kind": "logo", "image": "logo.png", "scale_pct": 20.0}
    }))
    .unwrap();
    match def.overlay {
        Overlay::Logo(l) => {
            assert_eq!(l.image, "logo.png");
            assert_eq!(l.scale_pct, 20.0);
            assert_eq!(l.opacity, 100.0);
        }
        other => panic!("unexpected overlay {other:?}"),
    }

    let def: WallpaperDef = serde_json::from_value(json!({"overlay": {"kind": "none"}})).unwrap();
    assert_eq!(def.overlay, Overlay::None);

    let text = serde_json::to_value(Overlay::Text(TextOverlay::default())).unwrap();
    assert_eq!(text["kind"], "text");
    assert_eq!(text["align"], "center");
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let def: WallpaperDef = serde_json::from_value(json!({
        "canvas": {"width": 800, "height": 600},
        "filters": {"blur": 0},
        "shapes": [{"x": 10, "y": 20, "color": "#ff0000"}],
        "seed": 7
    }))
    .unwrap();
    assert_eq!(def.canvas.height, 600);
    assert_eq!(def.filters.blur, 0.0);
    assert_eq!(def.filters.contrast, 100.0);
    assert_eq!(def.shapes.len(), 1);
    assert_eq!(def.shapes[0].color.to_hex(), "#ff0000");
    assert_eq!(def.seed, Some(7));
}

#[test]
fn serialization_roundtrips_defaults() {
    let def = WallpaperDef::default();
    let s = serde_json::to_string(&def).unwrap();
    let back: WallpaperDef = serde_json::from_str(&s).unwrap();
    assert_eq!(def, back);
}
