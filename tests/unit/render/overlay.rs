use super::*;
use crate::assets::color::Color;
use crate::assets::text::{ShapedGlyph, find_fallback_font};

fn line(widths: &[f32]) -> ShapedLine {
    let glyphs = widths
        .iter()
        .enumerate()
        .map(|(i, &w)| ShapedGlyph {
            id: i as u32 + 1,
            x_offset: 0.0,
            y: 0.0,
            advance: w,
        })
        .collect();
    ShapedLine {
        glyphs,
        ascent: 8.0,
        descent: 2.0,
    }
}

fn canvas() -> Canvas {
    Canvas {
        width: 200,
        height: 100,
    }
}

#[test]
fn letter_spacing_total_drops_trailing_gap() {
    let (xs, total) = letter_spaced_advances(&[10.0, 20.0, 30.0], 2.0);
    assert_eq!(xs, vec![0.0, 12.0, 34.0]);
    assert_eq!(total, 64.0);
    let (xs, total) = letter_spaced_advances(&[], 5.0);
    assert!(xs.is_empty());
    assert_eq!(total, 0.0);
}

#[test]
fn single_line_is_centered_on_spaced_width() {
    let style = TextOverlay {
        font_size: 10.0,
        letter_spacing: 0.5,
        ..TextOverlay::default()
    };
    let l = layout_text(canvas(), &style, &[line(&[10.0, 10.0])]);
    let line = &l.lines[0];
    assert_eq!(line.width, 25.0);
    assert_eq!(line.left, 100.0 - 12.5);
    assert_eq!(line.baseline, 50.0);
    assert_eq!(line.glyphs[1].x, line.left + 15.0);
    assert_eq!(l.skew_x, 0.0);
}

#[test]
fn baselines_spread_around_center_with_offset() {
    let style = TextOverlay {
        font_size: 20.0,
        line_height: 1.5,
        letter_spacing: 0.0,
        offset: OffsetDef { x: 10.0, y: -5.0 },
        ..TextOverlay::default()
    };
    let l = layout_text(canvas(), &style, &[line(&[4.0]), line(&[4.0]), line(&[4.0])]);
    let b: Vec<f64> = l.lines.iter().map(|l| l.baseline).collect();
    assert_eq!(b, vec![15.0, 45.0, 75.0]);
    assert_eq!(l.lines[0].left, 110.0 - 2.0);
}

#[test]
fn alignment_within_block() {
    let mut style = TextOverlay {
        letter_spacing: 0.0,
        align: TextAlign::Left,
        ..TextOverlay::default()
    };
    let lines = [line(&[40.0]), line(&[10.0])];
    let l = layout_text(canvas(), &style, &lines);
    assert_eq!(l.lines[0].left, 80.0);
    assert_eq!(l.lines[1].left, 80.0);

    style.align = TextAlign::Right;
    let l = layout_text(canvas(), &style, &lines);
    assert_eq!(l.lines[1].left, 110.0);
    assert_eq!(l.lines[1].left + l.lines[1].width, 120.0);
}

#[test]
fn decorations_follow_line_metrics() {
    let style = TextOverlay {
        font_size: 32.0,
        letter_spacing: 0.0,
        underline: true,
        strikethrough: true,
        italic: true,
        ..TextOverlay::default()
    };
    let l = layout_text(canvas(), &style, &[line(&[20.0, 20.0]), ShapedLine::default()]);
    assert_eq!(l.decorations.len(), 2);
    let base = l.lines[0].baseline;
    let under = l.decorations[0];
    assert_eq!(under.center().y, base + UNDERLINE_OFFSET);
    assert_eq!(under.height(), 2.0);
    assert_eq!(under.width(), 40.0);
    assert_eq!(l.decorations[1].center().y, base - 8.0);
    assert_eq!(l.skew_x, ITALIC_SKEW);
}

#[test]
fn logo_is_contained_in_percent_box() {
    let r = logo_rect(canvas(), 50, 50, 30.0, &OffsetDef::default());
    assert!((r.width() - 30.0).abs() < 1e-9);
    assert!((r.height() - 30.0).abs() < 1e-9);
    assert!((r.center().x - 100.0).abs() < 1e-9);

    let r = logo_rect(canvas(), 400, 100, 50.0, &OffsetDef { x: 5.0, y: 0.0 });
    assert!((r.width() - 100.0).abs() < 1e-9);
    assert!((r.height() - 25.0).abs() < 1e-9);
    assert!((r.center().x - 105.0).abs() < 1e-9);
}

#[test]
fn logo_overlay_draws_with_opacity_and_shadow() {
    let img = PreparedImage::solid(10, 10, [255, 255, 255, 255]).unwrap();
    let logo = LogoOverlay {
        image: "logo.png".into(),
        scale_pct: 40.0,
        opacity: 50.0,
        shadow: ShadowDef {
            enabled: true,
            color: Color::rgb8(255, 0, 0),
            blur: 0.0,
            offset_x: 30.0,
            offset_y: 0.0,
        },
        offset: OffsetDef::default(),
    };
    let mut target = vec![0u8; canvas().byte_len()];
    crate::effects::composite::fill(&mut target, [0, 0, 0, 255]);
    let mut raster = Rasterizer::new();
    let mut shaper = TextShaper::new();
    draw_overlay(
        &mut target,
        canvas(),
        &Overlay::Logo(logo),
        OverlayAssets {
            font: None,
            logo: Some(&img),
        },
        &mut raster,
        &mut shaper,
        false,
    )
    .unwrap();

    let px = |x: usize, y: usize| {
        let i = (y * 200 + x) * 4;
        [target[i], target[i + 1], target[i + 2], target[i + 3]]
    };
    // Logo box is 40x40 around (100, 50); shadow is shifted 30px right.
    let center = px(100, 50);
    for c in &center[..3] {
        assert!((120..=135).contains(c), "{center:?}");
    }
    let shadow_only = px(135, 50);
    assert!(shadow_only[0] >= 120 && shadow_only[1] == 0, "{shadow_only:?}");
    assert_eq!(px(5, 5), [0, 0, 0, 255]);
}

#[test]
fn missing_assets_are_noops() {
    let mut target = vec![7u8; canvas().byte_len()];
    let mut raster = Rasterizer::new();
    let mut shaper = TextShaper::new();
    for overlay in [
        Overlay::None,
        Overlay::Text(TextOverlay::default()),
        Overlay::Logo(LogoOverlay::default()),
    ] {
        draw_overlay(
            &mut target,
            canvas(),
            &overlay,
            OverlayAssets::default(),
            &mut raster,
            &mut shaper,
            false,
        )
        .unwrap();
    }
    assert!(target.iter().all(|&b| b == 7));
}

#[test]
fn text_overlay_renders_with_system_font() {
    let Some(path) = find_fallback_font() else {
        return;
    };
    let font = FontFace::from_path(&path).unwrap();
    let style = TextOverlay {
        text: "Hi\nthere".into(),
        font_size: 24.0,
        color: Color::rgb8(255, 255, 255),
        ..TextOverlay::default()
    };
    let mut target = vec![0u8; canvas().byte_len()];
    crate::effects::composite::fill(&mut target, [0, 0, 0, 255]);
    draw_overlay(
        &mut target,
        canvas(),
        &Overlay::Text(style),
        OverlayAssets {
            font: Some(&font),
            logo: None,
        },
        &mut Rasterizer::new(),
        &mut TextShaper::new(),
        false,
    )
    .unwrap();
    assert!(target.chunks_exact(4).any(|px| px[0] > 128));
    assert!(target.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn shadow_blur_is_capped() {
    let shadow = |blur| ShadowDef {
        blur,
        ..ShadowDef::default()
    };
    assert_eq!(shadow_sigma(&shadow(24.0)), 12.0);
    assert_eq!(shadow_sigma(&shadow(200.0)), (MAX_SHADOW_BLUR / 2.0) as f32);
    assert_eq!(shadow_sigma(&shadow(-5.0)), 0.0);
    assert_eq!(shadow_sigma(&shadow(f64::NAN)), 0.0);
}
