use super::*;

fn test_font() -> Option<FontFace> {
    let path = find_fallback_font()?;
    FontFace::from_path(&path).ok()
}

#[test]
fn empty_font_is_rejected() {
    assert!(FontFace::from_bytes(Vec::new()).is_err());
}

#[test]
fn font_key_is_content_hash() {
    let a = FontFace::from_bytes(vec![1, 2, 3]).unwrap();
    let b = FontFace::from_bytes(vec![1, 2, 3]).unwrap();
    let c = FontFace::from_bytes(vec![1, 2, 4]).unwrap();
    assert_eq!(a.key(), b.key());
    assert_ne!(a.key(), c.key());
}

#[test]
fn shape_line_reports_glyphs_and_metrics() {
    let Some(font) = test_font() else {
        return;
    };
    let mut shaper = TextShaper::new();
    let line = shaper.shape_line(&font, "Hi", 36.0, 400.0).unwrap();
    assert_eq!(line.glyphs.len(), 2);
    assert!(line.glyphs.iter().all(|g| g.advance > 0.0));
    assert!(line.ascent > 0.0);
    assert_eq!(line.advances().len(), 2);

    let again = shaper.shape_line(&font, "Hi", 36.0, 400.0).unwrap();
    assert_eq!(line, again);
    assert_eq!(shaper.families.len(), 1);
}

#[test]
fn invalid_size_is_rejected() {
    let Some(font) = test_font() else {
        return;
    };
    let mut shaper = TextShaper::new();
    assert!(shaper.shape_line(&font, "x", 0.0, 400.0).is_err());
    assert!(shaper.shape_line(&font, "x", f32::NAN, 400.0).is_err());
}

#[test]
fn font_reference_accepts_data_url_and_relative_path() {
    let a = FontFace::from_reference("data:font/ttf;base64,AQID", None).unwrap();
    assert_eq!(a.bytes().as_slice(), &[1, 2, 3]);
    assert!(FontFace::from_reference("data:font/ttf;base64,", None).is_err());

    let err = FontFace::from_reference("missing.ttf", Some(Path::new("/nonexistent-dir")))
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent-dir/missing.ttf"), "{err}");
}
