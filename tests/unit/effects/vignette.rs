use super::*;

fn solid(w: u32, h: u32) -> Vec<u8> {
    [200u8, 150, 100, 255].repeat((w * h) as usize)
}

#[test]
fn alpha_stops() {
    assert_eq!(vignette_alpha(0.0, 80.0), 0.0);
    assert!((vignette_alpha(0.7, 80.0) - 0.4).abs() < 1e-9);
    assert!((vignette_alpha(1.0, 80.0) - 0.8).abs() < 1e-9);
    assert!((vignette_alpha(2.0, 80.0) - 0.8).abs() < 1e-9);
    assert!((vignette_alpha(0.35, 100.0) - 0.25).abs() < 1e-9);
}

#[test]
fn zero_intensity_is_noop() {
    let mut buf = solid(20, 10);
    let mut cache = VignetteCache::new();
    apply_vignette(&mut buf, 20, 10, 0.0, &mut cache).unwrap();
    assert_eq!(buf, solid(20, 10));
    assert!(cache.is_empty());
}

#[test]
fn edges_darker_than_center() {
    let (w, h) = (40u32, 20u32);
    let mut buf = solid(w, h);
    let mut cache = VignetteCache::new();
    apply_vignette(&mut buf, w, h, 100.0, &mut cache).unwrap();
    let center = ((10 * w + 20) * 4) as usize;
    assert!(buf[0] < buf[center]);
    assert!(buf[center] >= 195);
    assert_eq!(buf[3], 255);
}

#[test]
fn reapplying_from_same_source_is_identical() {
    let (w, h) = (32u32, 32u32);
    let mut cache = VignetteCache::new();
    let mut first = solid(w, h);
    apply_vignette(&mut first, w, h, 60.0, &mut cache).unwrap();
    let mut second = solid(w, h);
    apply_vignette(&mut second, w, h, 60.0, &mut cache).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);

    // The cached gradient itself is untouched by the targets it was applied to.
    assert_eq!(
        *cache.get_or_build(w, h, 60.0),
        render_vignette(w, h, 60.0)
    );
}

#[test]
fn canvas_change_evicts_old_sizes() {
    let mut cache = VignetteCache::new();
    let mut a = solid(8, 8);
    apply_vignette(&mut a, 8, 8, 50.0, &mut cache).unwrap();
    let mut b = solid(16, 8);
    apply_vignette(&mut b, 16, 8, 50.0, &mut cache).unwrap();
    assert_eq!(cache.len(), 1);
}
