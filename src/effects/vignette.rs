use std::collections::HashMap;
use std::sync::Arc;

use crate::effects::composite::{BlendMode, composite_in_place};
use crate::foundation::error::{GradiiError, GradiiResult};
use crate::foundation::math::clamp_finite;

/// Gradient position where the mid stop sits.
const MID_STOP: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct VignetteKey {
    w: u32,
    h: u32,
    intensity_bits: u64,
}

/// Cache of rendered vignette gradients keyed by canvas size and intensity.
///
/// The gradient is always rendered into its own transparent buffer, so reusing it can never
/// stack darkening from earlier passes.
#[derive(Debug, Default)]
pub struct VignetteCache {
    entries: HashMap<VignetteKey, Arc<Vec<u8>>>,
}

impl VignetteCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached gradients.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_or_build(&mut self, w: u32, h: u32, intensity: f64) -> Arc<Vec<u8>> {
        let key = VignetteKey {
            w,
            h,
            intensity_bits: intensity.to_bits(),
        };
        // Canvas size changes invalidate everything at once.
        if self.entries.keys().any(|k| k.w != w || k.h != h) {
            self.entries.clear();
        }
        self.entries
            .entry(key)
            .or_insert_with(|| Arc::new(render_vignette(w, h, intensity)))
            .clone()
    }
}

/// Gradient alpha (0..=1) at normalized radius `t` for an intensity in `0..=100`.
pub fn vignette_alpha(t: f64, intensity: f64) -> f64 {
    let i = clamp_finite(intensity, 0.0, 100.0) / 100.0;
    let t = clamp_finite(t, 0.0, 1.0);
    if t <= MID_STOP {
        0.5 * i * (t / MID_STOP)
    } else {
        let u = (t - MID_STOP) / (1.0 - MID_STOP);
        0.5 * i + (i - 0.5 * i) * u
    }
}

/// Render the black radial gradient centered on the canvas with radius `max(w/2, h/2)`.
pub fn render_vignette(w: u32, h: u32, intensity: f64) -> Vec<u8> {
    let cx = f64::from(w) / 2.0;
    let cy = f64::from(h) / 2.0;
    let radius = cx.max(cy).max(f64::EPSILON);
    let mut out = vec![0u8; (w as usize) * (h as usize) * 4];
    for (i, px) in out.chunks_exact_mut(4).enumerate() {
        let x = (i % w as usize) as f64 + 0.5;
        let y = (i / w as usize) as f64 + 0.5;
        let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
        let a = vignette_alpha(d / radius, intensity);
        px[3] = (a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Darken `buf` towards the edges with a multiply-blended radial gradient.
pub fn apply_vignette(
    buf: &mut [u8],
    width: u32,
    height: u32,
    intensity: f64,
    cache: &mut VignetteCache,
) -> GradiiResult<()> {
    if buf.len() != (width as usize) * (height as usize) * 4 {
        return Err(GradiiError::render("vignette buffer does not match canvas"));
    }
    let intensity = clamp_finite(intensity, 0.0, 100.0);
    if intensity <= 0.0 {
        return Ok(());
    }
    let gradient = cache.get_or_build(width, height, intensity);
    composite_in_place(buf, &gradient, 1.0, BlendMode::Multiply)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/vignette.rs"]
mod tests;
