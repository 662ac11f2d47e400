//! Premultiplied RGBA8 source-over compositing.

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::surface::Surface;

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over of `src` onto `dst` with an extra `opacity` multiplier.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Source-over of equal-length buffers.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> CaptionResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CaptionError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Paint `color` over the horizontal span `[top, bottom)` of `surface` at `opacity`.
///
/// Rows only partially covered by the span get proportional coverage.
pub(crate) fn fill_span(
    surface: &mut Surface,
    top: f64,
    bottom: f64,
    color: Rgba8Premul,
    opacity: f32,
) {
    let height = f64::from(surface.height());
    let top = top.max(0.0);
    let bottom = bottom.min(height);
    if bottom <= top {
        return;
    }

    let src = color.to_array();
    let first = top.floor() as u32;
    let last = bottom.ceil() as u32;
    for y in first..last {
        let row_top = f64::from(y);
        let coverage = (bottom.min(row_top + 1.0) - top.max(row_top)).clamp(0.0, 1.0);
        let alpha = opacity * coverage as f32;
        if alpha <= 0.0 {
            continue;
        }
        for px in surface.row_mut(y).chunks_exact_mut(4) {
            let out = over([px[0], px[1], px[2], px[3]], src, alpha);
            px.copy_from_slice(&out);
        }
    }
}

/// Composite a `src_width`-wide premultiplied bitmap over `surface`, its first row at `dst_y`.
///
/// Rows falling outside the surface are clipped; columns beyond the narrower width are skipped.
pub(crate) fn blit_over(
    surface: &mut Surface,
    src: &[u8],
    src_width: u32,
    dst_y: i64,
    opacity: f32,
) -> CaptionResult<()> {
    let src_stride = src_width as usize * 4;
    if src_stride == 0 || !src.len().is_multiple_of(src_stride) {
        return Err(CaptionError::render("blit source is not whole rows"));
    }
    let cols = src_width.min(surface.width()) as usize * 4;
    for (i, src_row) in src.chunks_exact(src_stride).enumerate() {
        let y = dst_y + i as i64;
        if y < 0 {
            continue;
        }
        if y >= i64::from(surface.height()) {
            break;
        }
        let dst_row = surface.row_mut(y as u32);
        over_in_place(&mut dst_row[..cols], &src_row[..cols], opacity)?;
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
