//! Gaussian softening of the band backdrop.

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::style::config::MAX_BACKDROP_BLUR_PX;

/// Kernel weights are Q16 fixed point; a full kernel sums to exactly this.
const Q16_ONE: u32 = 1 << 16;

/// Sigma used for a user-facing blur radius.
pub(crate) fn sigma_for_radius(radius: u32) -> f32 {
    (radius as f32 / 2.0).max(0.5)
}

/// Blur a premultiplied RGBA8 strip: one horizontal pass, then one vertical pass.
///
/// Samples outside the strip repeat the nearest edge pixel.
pub(crate) fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> CaptionResult<Vec<u8>> {
    let w = width as usize;
    let h = height as usize;
    let len = w
        .checked_mul(h)
        .and_then(|px| px.checked_mul(4))
        .ok_or_else(|| CaptionError::render("blur strip too large"))?;
    if src.len() != len {
        return Err(CaptionError::render(format!(
            "blur strip holds {} bytes, expected {len}",
            src.len()
        )));
    }

    let taps = kernel_q16(radius, sigma)?;
    if taps.len() == 1 || len == 0 {
        return Ok(src.to_vec());
    }

    let mut across = vec![0u8; len];
    convolve(src, &mut across, w, h, Axis::Row, &taps);
    let mut out = vec![0u8; len];
    convolve(&across, &mut out, w, h, Axis::Column, &taps);
    Ok(out)
}

/// Normalized Q16 weights for taps `-radius..=radius`.
fn kernel_q16(radius: u32, sigma: f32) -> CaptionResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![Q16_ONE]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CaptionError::validation("blur sigma must be finite and > 0"));
    }
    let out_of_range =
        || CaptionError::validation(format!("blur radius {radius} exceeds {MAX_BACKDROP_BLUR_PX}"));
    if radius > MAX_BACKDROP_BLUR_PX {
        return Err(out_of_range());
    }
    let r = i32::try_from(radius).map_err(|_| out_of_range())?;
    let taps = r
        .checked_mul(2)
        .and_then(|d| d.checked_add(1))
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(out_of_range)?;

    let two_sigma_sq = 2.0 * f64::from(sigma) * f64::from(sigma);
    let raw: Vec<f64> = (-r..=r)
        .map(|i| (-f64::from(i) * f64::from(i) / two_sigma_sq).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(CaptionError::render("blur kernel has no weight"));
    }

    let mut weights: Vec<u32> = raw
        .iter()
        .map(|w| ((w / total) * f64::from(Q16_ONE)).round().clamp(0.0, f64::from(Q16_ONE)) as u32)
        .collect();
    debug_assert_eq!(weights.len(), taps);

    // Rounding drift lands on the center tap.
    let sum: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let center = &mut weights[taps / 2];
    *center = (i64::from(*center) + i64::from(Q16_ONE) - sum).clamp(0, i64::from(Q16_ONE)) as u32;
    Ok(weights)
}

#[derive(Clone, Copy)]
enum Axis {
    Row,
    Column,
}

fn convolve(src: &[u8], dst: &mut [u8], width: usize, height: usize, axis: Axis, taps: &[u32]) {
    let reach = taps.len() / 2;
    let (extent, step) = match axis {
        Axis::Row => (width, 4),
        Axis::Column => (height, width * 4),
    };

    for y in 0..height {
        for x in 0..width {
            let (pos, base) = match axis {
                Axis::Row => (x, y * width * 4),
                Axis::Column => (y, x * 4),
            };
            let mut acc = [0u64; 4];
            for (t, &weight) in taps.iter().enumerate() {
                let sample = (pos + t).saturating_sub(reach).min(extent - 1);
                let at = base + sample * step;
                for (sum, &channel) in acc.iter_mut().zip(&src[at..at + 4]) {
                    *sum += u64::from(weight) * u64::from(channel);
                }
            }
            let out = (y * width + x) * 4;
            for (px, sum) in dst[out..out + 4].iter_mut().zip(acc) {
                *px = ((sum + u64::from(Q16_ONE / 2)) >> 16).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
