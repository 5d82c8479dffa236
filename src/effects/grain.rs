use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::foundation::error::{GradiiError, GradiiResult};
use crate::foundation::math::clamp_finite;

/// Noise amplitude at intensity 100, in 8-bit channel units.
const GRAIN_SCALE: f64 = 50.0;
/// Hard bound on the per-pixel perturbation.
const GRAIN_CLAMP: f64 = 30.0;

const F2: f64 = 0.366_025_403_784_438_6; // (sqrt(3) - 1) / 2
const G2: f64 = 0.211_324_865_405_187_1; // (3 - sqrt(3)) / 6

const GRAD2: [(f64, f64); 12] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

/// 2D simplex noise field with a seeded permutation table.
#[derive(Clone)]
pub struct NoiseField {
    perm: [u8; 512],
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").finish_non_exhaustive()
    }
}

impl NoiseField {
    /// Build a field; `None` draws a fresh random seed.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut p: Vec<u8> = (0..=255u8).collect();
        p.shuffle(&mut rng);
        let mut perm = [0u8; 512];
        for (i, v) in perm.iter_mut().enumerate() {
            *v = p[i & 255];
        }
        Self { perm }
    }

    fn corner(&self, gi: usize, x: f64, y: f64) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            return 0.0;
        }
        let (gx, gy) = GRAD2[gi];
        let t2 = t * t;
        t2 * t2 * (gx * x + gy * y)
    }

    /// Sample the field; output lies roughly in `[-1, 1]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        let (i1, j1) = if x0 > y0 { (1usize, 0usize) } else { (0, 1) };
        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let p = &self.perm;
        let gi0 = p[ii + p[jj] as usize] as usize % 12;
        let gi1 = p[ii + i1 + p[jj + j1] as usize] as usize % 12;
        let gi2 = p[ii + 1 + p[jj + 1] as usize] as usize % 12;

        70.0 * (self.corner(gi0, x0, y0) + self.corner(gi1, x1, y1) + self.corner(gi2, x2, y2))
    }

    /// Channel offset for a pixel at raw coordinates `(x, y)`.
    pub fn grain_at(&self, x: u32, y: u32, intensity: f64) -> i16 {
        let amp = intensity / 100.0 * GRAIN_SCALE;
        let v = (self.sample(f64::from(x), f64::from(y)) * amp).clamp(-GRAIN_CLAMP, GRAIN_CLAMP);
        v.round() as i16
    }
}

fn grain_row(row: &mut [u8], y: u32, field: &NoiseField, intensity: f64) {
    for (x, px) in row.chunks_exact_mut(4).enumerate() {
        let a = i16::from(px[3]);
        if a == 0 {
            continue;
        }
        let n = field.grain_at(x as u32, y, intensity);
        for c in &mut px[..3] {
            *c = (i16::from(*c) + n).clamp(0, a) as u8;
        }
    }
}

/// Add film grain to a premultiplied buffer in place.
///
/// Every pixel gets the same offset on R, G and B, sampled from the noise field at its raw pixel
/// coordinates, so the grain frequency depends on resolution. Channels stay within `0..=alpha`.
pub fn apply_grain(
    buf: &mut [u8],
    width: u32,
    height: u32,
    intensity: f64,
    seed: Option<u64>,
    parallel: bool,
) -> GradiiResult<()> {
    if buf.len() != (width as usize) * (height as usize) * 4 {
        return Err(GradiiError::render("grain buffer does not match canvas"));
    }
    let intensity = clamp_finite(intensity, 0.0, 100.0);
    if intensity <= 0.0 || width == 0 {
        return Ok(());
    }
    let field = NoiseField::new(seed);
    let stride = width as usize * 4;
    if parallel {
        buf.par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| grain_row(row, y as u32, &field, intensity));
    } else {
        for (y, row) in buf.chunks_mut(stride).enumerate() {
            grain_row(row, y as u32, &field, intensity);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/grain.rs"]
mod tests;
