use crate::foundation::error::{GradiiError, GradiiResult};
use crate::foundation::math::mul_div255_u8;

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Blend modes the compositor needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    /// Plain source-over.
    Normal,
    /// Source-over with multiplied color, used by the vignette.
    Multiply,
}

/// Source-over for one premultiplied pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

fn check_pair(dst: &[u8], src: &[u8], what: &str) -> GradiiResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(GradiiError::render(format!(
            "{what} expects equal-length rgba8 buffers ({} vs {})",
            dst.len(),
            src.len()
        )));
    }
    Ok(())
}

/// Composite `src` over `dst` with a blend mode and an opacity multiplier.
pub fn composite_in_place(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
    blend: BlendMode,
) -> GradiiResult<()> {
    check_pair(dst, src, "composite_in_place")?;
    match blend {
        BlendMode::Normal => {
            for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
                d.copy_from_slice(&out);
            }
            Ok(())
        }
        BlendMode::Multiply => {
            composite_blend_in_place(dst, src, opacity, |s, d| s * d);
            Ok(())
        }
    }
}

#[inline(always)]
fn composite_blend_in_place<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F)
where
    F: Fn(f32, f32) -> f32,
{
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = (s[3] as f32 / 255.0) * opacity;
        let da = d[3] as f32 / 255.0;
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

        for c in 0..3 {
            let sp = (s[c] as f32 / 255.0) * opacity;
            let dp = d[c] as f32 / 255.0;
            let sc = if sa > 0.0 { (sp / sa).clamp(0.0, 1.0) } else { 0.0 };
            let dc = if da > 0.0 { (dp / da).clamp(0.0, 1.0) } else { 0.0 };
            let b = blend_fn(sc, dc).clamp(0.0, 1.0);
            let out_p = (sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, out_a);
            d[c] = (out_p * 255.0).round() as u8;
        }
        d[3] = (out_a * 255.0).round() as u8;
    }
}

/// Borrowed premultiplied RGBA8 buffer with its dimensions.
#[derive(Clone, Copy, Debug)]
pub struct PremulView<'a> {
    /// Pixel bytes.
    pub bytes: &'a [u8],
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Composite `src` over `dst` (of `dst_w`x`dst_h`) shifted by `(dx, dy)` whole pixels; pixels
/// falling outside `dst` are dropped.
pub fn over_offset_in_place(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    src: PremulView<'_>,
    dx: i64,
    dy: i64,
) -> GradiiResult<()> {
    let PremulView {
        bytes: src,
        width: src_w,
        height: src_h,
    } = src;
    let dst_len = (dst_w as usize) * (dst_h as usize) * 4;
    let src_len = (src_w as usize) * (src_h as usize) * 4;
    if dst.len() != dst_len || src.len() != src_len {
        return Err(GradiiError::render(
            "over_offset_in_place buffer does not match its dimensions",
        ));
    }
    let x0 = dx.max(0);
    let x1 = (dx + i64::from(src_w)).min(i64::from(dst_w));
    let y0 = dy.max(0);
    let y1 = (dy + i64::from(src_h)).min(i64::from(dst_h));
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }
    for y in y0..y1 {
        let sy = (y - dy) as usize;
        for x in x0..x1 {
            let sx = (x - dx) as usize;
            let si = (sy * src_w as usize + sx) * 4;
            let di = (y as usize * dst_w as usize + x as usize) * 4;
            let s = [src[si], src[si + 1], src[si + 2], src[si + 3]];
            if s[3] == 0 {
                continue;
            }
            let d = [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]];
            dst[di..di + 4].copy_from_slice(&over(d, s, 1.0));
        }
    }
    Ok(())
}

/// Replace the color of every pixel with `color` (premultiplied by the pixel's own coverage),
/// producing a tinted silhouette for shadows.
pub fn tint_silhouette_in_place(buf: &mut [u8], color: PremulRgba8) {
    for px in buf.chunks_exact_mut(4) {
        let cov = u16::from(px[3]);
        px[0] = mul_div255_u8(u16::from(color[0]), cov);
        px[1] = mul_div255_u8(u16::from(color[1]), cov);
        px[2] = mul_div255_u8(u16::from(color[2]), cov);
        px[3] = mul_div255_u8(u16::from(color[3]), cov);
    }
}

/// Fill every pixel with one premultiplied color.
pub fn fill(buf: &mut [u8], color: PremulRgba8) {
    for px in buf.chunks_exact_mut(4) {
        px.copy_from_slice(&color);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
