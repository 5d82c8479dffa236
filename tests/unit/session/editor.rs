use super::*;
use crate::encode::png::ExportPayload;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Canvas;
use crate::scene::model::{EffectsDef, FiltersDef};
use base64::Engine as _;

fn small_def() -> WallpaperDef {
    WallpaperDef {
        canvas: Canvas {
            width: 32,
            height: 18,
        },
        filters: FiltersDef {
            blur: 0.0,
            ..FiltersDef::default()
        },
        effects: EffectsDef {
            grain: 0.0,
            vignette: 0.0,
        },
        overlay: Overlay::None,
        seed: Some(5),
        ..WallpaperDef::default()
    }
}

fn session(def: WallpaperDef) -> EditorSession {
    EditorSession::new(def, SessionOpts::default()).unwrap()
}

fn png_data_url(w: u32, h: u32, px: [u8; 4]) -> String {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(out.into_inner())
    )
}

fn is_uniform(frame: &FrameRGBA, px: [u8; 4]) -> bool {
    frame.data.chunks_exact(4).all(|p| p == px)
}

const BG: [u8; 4] = [0x0d, 0x13, 0x19, 255];

#[test]
fn new_rejects_invalid_settings() {
    let mut def = small_def();
    def.canvas.width = 4000;
    assert!(EditorSession::new(def, SessionOpts::default()).is_err());
}

#[test]
fn diff_classifies_changes() {
    let a = small_def();
    let mut b = a.clone();
    assert_eq!(diff(&a, &b), Invalidation::None);
    b.filters.brightness = 120.0;
    assert_eq!(diff(&a, &b), Invalidation::Composite);
    b.shapes.pop();
    assert_eq!(diff(&a, &b), Invalidation::Background);
    let mut c = a.clone();
    c.palette.pop();
    assert_eq!(diff(&a, &c), Invalidation::None);
}

#[test]
fn update_rejects_invalid_and_keeps_state() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    let mut bad = small_def();
    bad.canvas.height = 0;
    assert!(s.update(bad, t0).is_err());
    assert_eq!(s.settings(), &small_def());
}

#[test]
fn update_tracks_manual_changes() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    let mut next = small_def();
    next.background.color = Color::rgb8(1, 2, 3);
    assert_eq!(s.update(next, t0).unwrap(), Invalidation::Background);
    assert!(s.modified().contains(Property::BackgroundColor));
    assert!(!s.modified().contains(Property::FontSize));
}

#[test]
fn poll_waits_for_the_debounce() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    let mut next = small_def();
    next.shapes.clear();
    s.update(next, t0).unwrap();
    assert!(!s.poll(t0 + Duration::from_millis(5)).unwrap());
    assert!(s.is_dirty());
    assert!(s.poll(t0 + Duration::from_millis(16)).unwrap());
    assert!(!s.is_dirty());
    assert!(is_uniform(s.visible(), BG));
    assert!(!s.poll(t0 + Duration::from_millis(100)).unwrap());
}

#[test]
fn render_now_matches_canvas_size() {
    let mut s = session(small_def());
    let frame = s.render_now().unwrap();
    assert_eq!((frame.width, frame.height), (32, 18));
    assert_eq!(frame.data.len(), 32 * 18 * 4);
}

#[test]
fn pending_and_failed_images_show_solid_fill() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    let ticket = s.begin_image_load(ImageTarget::Background, t0);
    assert!(is_uniform(s.render_now().unwrap(), BG));

    let outcome = s.complete_image_load(ImageTarget::Background, ticket, Err("broken".into()), t0);
    assert_eq!(outcome, LoadOutcome::Committed);
    assert!(matches!(
        s.image_state(ImageTarget::Background),
        SlotState::Failed(_)
    ));
    assert!(is_uniform(s.render_now().unwrap(), BG));
}

#[test]
fn stale_completion_is_dropped() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    let old = s.begin_image_load(ImageTarget::Background, t0);
    let new = s.begin_image_load(ImageTarget::Background, t0);
    let red = PreparedImage::solid(2, 2, [255, 0, 0, 255]).unwrap();
    let blue = PreparedImage::solid(2, 2, [0, 0, 255, 255]).unwrap();
    assert_eq!(
        s.complete_image_load(ImageTarget::Background, new, Ok(blue), t0),
        LoadOutcome::Committed
    );
    assert_eq!(
        s.complete_image_load(ImageTarget::Background, old, Ok(red), t0),
        LoadOutcome::Stale
    );
    let px = s.render_now().unwrap().pixel(16, 9).unwrap();
    assert!(px[2] > 250 && px[0] < 5, "{px:?}");
}

#[test]
fn upload_boundary_rejections_leave_state_unchanged() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    let err = s
        .upload_image(ImageTarget::Background, "data:text/plain;base64,aGk=", t0)
        .unwrap_err();
    assert!(err.to_string().contains("Please upload an image file"));
    assert!(s.settings().background.image.is_none());
    assert!(matches!(
        s.image_state(ImageTarget::Background),
        SlotState::Empty
    ));

    let mut tiny = EditorSession::new(
        small_def(),
        SessionOpts {
            max_upload_bytes: 8,
            ..SessionOpts::default()
        },
    )
    .unwrap();
    let err = tiny
        .upload_image(ImageTarget::Background, &png_data_url(4, 4, [0, 0, 0, 255]), t0)
        .unwrap_err();
    assert!(err.to_string().contains("smaller than"));
}

#[test]
fn undecodable_upload_falls_back_to_solid() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    let err = s
        .upload_image(ImageTarget::Background, "data:image/png;base64,AAAA", t0)
        .unwrap_err();
    assert!(matches!(err, GradiiError::Decode(_)));
    assert!(is_uniform(s.render_now().unwrap(), BG));
}

#[test]
fn uploaded_background_covers_and_removal_restores_blur() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    s.upload_image(ImageTarget::Background, &png_data_url(8, 8, [0, 200, 0, 255]), t0)
        .unwrap();
    assert!(s.settings().background.image.is_some());
    let px = s.render_now().unwrap().pixel(0, 0).unwrap();
    assert!(px[1] > 190, "{px:?}");

    s.remove_background_image(t0);
    assert!(s.settings().background.image.is_none());
    assert_eq!(s.settings().filters.blur, RESTORED_BLUR);
    assert!(matches!(
        s.image_state(ImageTarget::Background),
        SlotState::Empty
    ));
}

#[test]
fn shuffle_and_restore_round_trip_shapes() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    let before = s.settings().shapes.clone();
    assert!(!s.restore_previous_palette(t0));
    s.generate_new_palette(t0);
    assert!(s.has_previous_palette());
    assert_ne!(s.settings().shapes, before);
    assert!(s.restore_previous_palette(t0));
    assert_eq!(s.settings().shapes, before);
    assert!(!s.has_previous_palette());
}

#[test]
fn shape_count_and_color_ops_invalidate_background() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    s.render_now().unwrap();
    s.set_shape_count(3, t0);
    assert_eq!(s.settings().shapes.len(), 3);
    assert!(s.is_dirty());
    s.render_now().unwrap();
    s.update_shape_color(0, Color::rgb8(9, 9, 9), t0).unwrap();
    assert!(s.is_dirty());
    assert!(s.update_shape_color(7, Color::rgb8(9, 9, 9), t0).is_err());
}

#[test]
fn export_renders_settled_state_at_full_resolution() {
    let t0 = Instant::now();
    let mut def = small_def();
    def.shapes.clear();
    let mut s = session(def);
    let mut sink = InMemorySink::new();
    let artifact = s.export(&mut sink).unwrap();
    assert_eq!(artifact.filename, "gradii-32x18.png");
    assert_eq!(sink.artifacts().len(), 1);
    let png = artifact.payload.png_bytes().unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (32, 18));
    assert!(img.pixels().all(|p| p.0 == BG));

    let mut next = s.settings().clone();
    next.background.color = Color::rgb8(255, 255, 255);
    s.update(next, t0).unwrap();
    let again = s.export_fresh(&mut sink).unwrap();
    let img = image::load_from_memory(&again.payload.png_bytes().unwrap())
        .unwrap()
        .to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[test]
fn data_url_hosts_get_data_url_payload() {
    let mut s = EditorSession::new(
        small_def(),
        SessionOpts {
            caps: RenderCaps::fallback(),
            ..SessionOpts::default()
        },
    )
    .unwrap();
    let artifact = s.export(&mut InMemorySink::new()).unwrap();
    assert!(matches!(artifact.payload, ExportPayload::DataUrl(_)));
}

struct FailingSink;

impl DownloadSink for FailingSink {
    fn deliver(&mut self, _artifact: &ExportArtifact) -> GradiiResult<()> {
        Err(GradiiError::Other(anyhow::anyhow!("disk full")))
    }
}

#[test]
fn sink_failures_surface_as_one_export_error() {
    let mut s = session(small_def());
    let err = s.export(&mut FailingSink).unwrap_err();
    assert!(matches!(err, GradiiError::Export(_)));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn logo_upload_switches_overlay_mode() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    s.upload_image(ImageTarget::Logo, &png_data_url(4, 4, [255, 255, 255, 255]), t0)
        .unwrap();
    assert!(matches!(s.settings().overlay, Overlay::Logo(_)));
    assert!(matches!(s.image_state(ImageTarget::Logo), SlotState::Ready(_)));
    let frame = s.render_now().unwrap();
    assert!(frame.data.chunks_exact(4).any(|p| p[0] > 200));
}

#[test]
fn load_referenced_assets_reports_missing_files() {
    let t0 = Instant::now();
    let mut def = small_def();
    def.background.image = Some("does-not-exist.png".into());
    let mut s = session(def);
    assert!(s.load_referenced_assets(Some(Path::new("/nonexistent")), t0).is_err());
    assert!(matches!(
        s.image_state(ImageTarget::Background),
        SlotState::Failed(_)
    ));
    assert!(is_uniform(s.render_now().unwrap(), BG));
}

#[test]
fn photo_referenced_by_update_hides_shapes_until_loaded() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    assert!(!is_uniform(s.render_now().unwrap(), BG));

    let mut next = small_def();
    next.background.image = Some(png_data_url(8, 8, [0, 200, 0, 255]));
    assert_eq!(s.update(next, t0).unwrap(), Invalidation::Background);
    assert!(matches!(
        s.image_state(ImageTarget::Background),
        SlotState::Pending
    ));
    assert!(is_uniform(s.render_now().unwrap(), BG));

    s.load_referenced_assets(None, t0).unwrap();
    let px = s.render_now().unwrap().pixel(0, 0).unwrap();
    assert!(px[1] > 190, "{px:?}");

    let mut other = s.settings().clone();
    other.background.image = Some(png_data_url(8, 8, [200, 0, 0, 255]));
    s.update(other, t0).unwrap();
    assert!(is_uniform(s.render_now().unwrap(), BG));
}

#[test]
fn session_started_with_photo_reference_shows_solid() {
    let mut def = small_def();
    def.background.image = Some("later.png".into());
    let mut s = session(def);
    assert!(matches!(
        s.image_state(ImageTarget::Background),
        SlotState::Pending
    ));
    assert!(is_uniform(s.render_now().unwrap(), BG));
}

#[test]
fn logo_referenced_by_update_is_pending_until_loaded() {
    let t0 = Instant::now();
    let mut s = session(small_def());
    s.upload_image(ImageTarget::Logo, &png_data_url(4, 4, [255, 255, 255, 255]), t0)
        .unwrap();
    let mut next = s.settings().clone();
    if let Overlay::Logo(logo) = &mut next.overlay {
        logo.image = png_data_url(4, 4, [0, 0, 255, 255]);
    }
    s.update(next, t0).unwrap();
    assert!(matches!(s.image_state(ImageTarget::Logo), SlotState::Pending));

    let mut none = s.settings().clone();
    none.overlay = Overlay::None;
    s.update(none, t0).unwrap();
    assert!(matches!(s.image_state(ImageTarget::Logo), SlotState::Empty));
}

fn text_def() -> WallpaperDef {
    WallpaperDef {
        canvas: Canvas {
            width: 200,
            height: 100,
        },
        shapes: Vec::new(),
        overlay: Overlay::Text(crate::scene::model::TextOverlay {
            text: "HELLO".into(),
            color: Color::rgb8(255, 255, 255),
            ..Default::default()
        }),
        ..small_def()
    }
}

fn bright_pixels(frame: &FrameRGBA) -> usize {
    frame.data.chunks_exact(4).filter(|p| p[0] > 128).count()
}

#[test]
fn text_survives_a_shuffle() {
    let Some(path) = crate::assets::text::find_fallback_font() else {
        return;
    };
    let t0 = Instant::now();
    let mut s = session(text_def());
    s.register_font("Onest", FontFace::from_path(&path).unwrap(), t0);

    let mut next = s.settings().clone();
    next.background.color = Color::rgb8(0, 0, 0);
    if let Overlay::Text(t) = &mut next.overlay {
        t.font_size = 40.0;
    }
    s.update(next, t0).unwrap();
    assert!(bright_pixels(s.render_now().unwrap()) > 0);

    for _ in 0..4 {
        s.generate_new_palette(t0);
        assert!(bright_pixels(s.render_now().unwrap()) > 0);
    }
}

#[test]
fn default_font_draws_unregistered_family() {
    let Some(path) = crate::assets::text::find_fallback_font() else {
        return;
    };
    let t0 = Instant::now();
    let mut def = text_def();
    def.background.color = Color::rgb8(0, 0, 0);
    let mut s = session(def);
    assert_eq!(bright_pixels(s.render_now().unwrap()), 0);

    s.set_default_font(FontFace::from_path(&path).unwrap(), t0);
    assert!(s.is_dirty());
    assert!(bright_pixels(s.render_now().unwrap()) > 0);
}
