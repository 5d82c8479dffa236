use rayon::prelude::*;

use crate::foundation::error::{GradiiError, GradiiResult};

/// Number of box passes used to approximate a Gaussian.
const BOX_PASSES: usize = 3;

/// Largest sigma the reduced-resolution path blurs at after downscaling.
const FALLBACK_MAX_SIGMA: f32 = 6.0;

fn check_len(buf: &[u8], width: u32, height: u32) -> GradiiResult<()> {
    if buf.len() != (width as usize) * (height as usize) * 4 {
        return Err(GradiiError::render(format!(
            "blur buffer of {} bytes does not match {width}x{height}",
            buf.len()
        )));
    }
    Ok(())
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> GradiiResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(GradiiError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(GradiiError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

fn kernel_row_q16(src: &[u8], dst: &mut [u8], k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = (src.len() / 4) as i64;
    for x in 0..w {
        let mut acc = [0u64; 4];
        for (ki, &kw) in k.iter().enumerate() {
            let sx = (x + ki as i64 - radius).clamp(0, w - 1);
            let idx = (sx as usize) * 4;
            for c in 0..4 {
                acc[c] += u64::from(kw) * u64::from(src[idx + c]);
            }
        }
        let out = (x as usize) * 4;
        for c in 0..4 {
            dst[out + c] = q16_to_u8(acc[c]);
        }
    }
}

/// Exact q16 Gaussian blur with clamped edges; used for text and logo shadows where sigma is
/// small.
pub fn gaussian_blur_premul(
    buf: &mut [u8],
    width: u32,
    height: u32,
    sigma: f32,
    parallel: bool,
) -> GradiiResult<()> {
    check_len(buf, width, height)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Ok(());
    }
    let radius = (sigma * 3.0).ceil() as u32;
    let k = gaussian_kernel_q16(radius, sigma)?;

    let mut tmp = vec![0u8; buf.len()];
    rows_apply(buf, &mut tmp, width, parallel, |s, d| kernel_row_q16(s, d, &k));
    let t = transpose(&tmp, width, height);
    let mut t_out = vec![0u8; t.len()];
    rows_apply(&t, &mut t_out, height, parallel, |s, d| kernel_row_q16(s, d, &k));
    let back = transpose(&t_out, height, width);
    buf.copy_from_slice(&back);
    Ok(())
}

/// Box widths whose three successive passes approximate a Gaussian of `sigma`.
pub(crate) fn box_sizes_for_gauss(sigma: f32, n: usize) -> Vec<usize> {
    let s = f64::from(sigma);
    let n_f = n as f64;
    let w_ideal = (12.0 * s * s / n_f + 1.0).sqrt();
    let mut wl = w_ideal.floor() as i64;
    if wl % 2 == 0 {
        wl -= 1;
    }
    let wl = wl.max(1);
    let wu = wl + 2;
    let wl_f = wl as f64;
    let m_ideal = (12.0 * s * s - n_f * wl_f * wl_f - 4.0 * n_f * wl_f - 3.0 * n_f)
        / (-4.0 * wl_f - 4.0);
    let m = m_ideal.round().max(0.0) as usize;
    (0..n)
        .map(|i| if i < m { wl as usize } else { wu as usize })
        .collect()
}

/// Zero-padded box filter of radius `r` along one row.
fn box_row(src: &[u8], dst: &mut [u8], r: usize) {
    let w = src.len() / 4;
    if r == 0 || w == 0 {
        dst.copy_from_slice(src);
        return;
    }
    let div = (2 * r + 1) as u32;
    let mut acc = [0u32; 4];
    for x in 0..=r.min(w - 1) {
        for c in 0..4 {
            acc[c] += u32::from(src[x * 4 + c]);
        }
    }
    for x in 0..w {
        for c in 0..4 {
            dst[x * 4 + c] = ((acc[c] + div / 2) / div) as u8;
        }
        if x + r + 1 < w {
            for c in 0..4 {
                acc[c] += u32::from(src[(x + r + 1) * 4 + c]);
            }
        }
        if x >= r {
            for c in 0..4 {
                acc[c] -= u32::from(src[(x - r) * 4 + c]);
            }
        }
    }
}

/// Large-radius Gaussian approximation (three box passes per axis) over a premultiplied buffer.
///
/// Pixels outside the buffer count as transparent, so edges fade out the way a filtered image
/// drawn onto a canvas does.
pub fn box_blur_premul(
    buf: &mut [u8],
    width: u32,
    height: u32,
    sigma: f32,
    parallel: bool,
) -> GradiiResult<()> {
    check_len(buf, width, height)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Ok(());
    }
    let radii: Vec<usize> = box_sizes_for_gauss(sigma, BOX_PASSES)
        .into_iter()
        .map(|s| (s - 1) / 2)
        .collect();

    let mut a = buf.to_vec();
    let mut b = vec![0u8; buf.len()];
    for &r in &radii {
        rows_apply(&a, &mut b, width, parallel, |s, d| box_row(s, d, r));
        std::mem::swap(&mut a, &mut b);
    }
    let mut t = transpose(&a, width, height);
    let mut t2 = vec![0u8; t.len()];
    for &r in &radii {
        rows_apply(&t, &mut t2, height, parallel, |s, d| box_row(s, d, r));
        std::mem::swap(&mut t, &mut t2);
    }
    buf.copy_from_slice(&transpose(&t, height, width));
    Ok(())
}

/// Reduced-resolution blur used when the host lacks native canvas filters: area-downscale so the
/// remaining sigma is small, blur there, then bilinear upscale back to full size.
pub fn downsampled_blur_premul(
    buf: &mut [u8],
    width: u32,
    height: u32,
    sigma: f32,
    parallel: bool,
) -> GradiiResult<()> {
    check_len(buf, width, height)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Ok(());
    }
    let factor = (sigma / FALLBACK_MAX_SIGMA).ceil().max(1.0) as u32;
    if factor == 1 {
        return box_blur_premul(buf, width, height, sigma, parallel);
    }
    let sw = width.div_ceil(factor).max(1);
    let sh = height.div_ceil(factor).max(1);
    let mut small = area_downscale(buf, width, height, factor, sw, sh);
    box_blur_premul(&mut small, sw, sh, sigma / factor as f32, parallel)?;
    bilinear_upscale_into(&small, sw, sh, buf, width, height, factor);
    Ok(())
}

fn area_downscale(src: &[u8], w: u32, h: u32, factor: u32, sw: u32, sh: u32) -> Vec<u8> {
    let mut out = vec![0u8; (sw as usize) * (sh as usize) * 4];
    for sy in 0..sh {
        for sx in 0..sw {
            let mut acc = [0u32; 4];
            let mut n = 0u32;
            for y in (sy * factor)..((sy + 1) * factor).min(h) {
                for x in (sx * factor)..((sx + 1) * factor).min(w) {
                    let i = ((y * w + x) as usize) * 4;
                    for c in 0..4 {
                        acc[c] += u32::from(src[i + c]);
                    }
                    n += 1;
                }
            }
            let o = ((sy * sw + sx) as usize) * 4;
            for c in 0..4 {
                out[o + c] = ((acc[c] + n / 2) / n.max(1)) as u8;
            }
        }
    }
    out
}

fn bilinear_upscale_into(
    src: &[u8],
    sw: u32,
    sh: u32,
    dst: &mut [u8],
    w: u32,
    h: u32,
    factor: u32,
) {
    let f = factor as f32;
    let sample =
        |x: u32, y: u32, c: usize| -> f32 { f32::from(src[((y * sw + x) as usize) * 4 + c]) };
    for y in 0..h {
        let fy = ((y as f32 + 0.5) / f - 0.5).clamp(0.0, (sh - 1) as f32);
        let y0 = fy.floor() as u32;
        let y1 = (y0 + 1).min(sh - 1);
        let ty = fy - y0 as f32;
        for x in 0..w {
            let fx = ((x as f32 + 0.5) / f - 0.5).clamp(0.0, (sw - 1) as f32);
            let x0 = fx.floor() as u32;
            let x1 = (x0 + 1).min(sw - 1);
            let tx = fx - x0 as f32;
            let o = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                let top = sample(x0, y0, c) * (1.0 - tx) + sample(x1, y0, c) * tx;
                let bot = sample(x0, y1, c) * (1.0 - tx) + sample(x1, y1, c) * tx;
                dst[o + c] = (top * (1.0 - ty) + bot * ty).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

fn transpose(src: &[u8], w: u32, h: u32) -> Vec<u8> {
    let (w, h) = (w as usize, h as usize);
    let mut out = vec![0u8; src.len()];
    for y in 0..h {
        for x in 0..w {
            let s = (y * w + x) * 4;
            let d = (x * h + y) * 4;
            out[d..d + 4].copy_from_slice(&src[s..s + 4]);
        }
    }
    out
}

fn rows_apply<F>(src: &[u8], dst: &mut [u8], row_px: u32, parallel: bool, f: F)
where
    F: Fn(&[u8], &mut [u8]) + Sync,
{
    let stride = (row_px as usize) * 4;
    if stride == 0 {
        return;
    }
    if parallel {
        dst.par_chunks_mut(stride)
            .zip(src.par_chunks(stride))
            .for_each(|(d, s)| f(s, d));
    } else {
        for (d, s) in dst.chunks_mut(stride).zip(src.chunks(stride)) {
            f(s, d);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
