//! Canvas sizing and per-line band geometry.
//!
//! Sizing and drawing both consume [`CaptionLayout`], so the band count used to grow the canvas is
//! always the number of lines the compositor paints.

use crate::foundation::core::{Rect, Size};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::style::config::StyleConfig;

/// Largest canvas side the raster backend can address.
pub const MAX_CANVAS_SIDE: u32 = u16::MAX as u32;

/// Largest canvas area, in pixels (256 MiB of RGBA8).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 26;

/// Non-blank caption lines of `text`, in order.
///
/// Lines are split on `\n` (a trailing `\r` is dropped) and discarded when empty after trimming.
/// Kept lines are otherwise drawn as typed.
pub fn caption_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Canvas dimensions required to show an image plus its caption bands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasGeometry {
    /// Canvas width; always the image width.
    pub width: u32,
    /// Height of the source image.
    pub image_height: u32,
    /// Number of caption bands.
    pub line_count: usize,
    /// Height of one band, `font_size_px * line_height_multiple`, unrounded.
    pub line_height_px: f64,
}

impl CanvasGeometry {
    /// Total height of all bands.
    pub fn band_height(&self) -> f64 {
        self.line_count as f64 * self.line_height_px
    }

    /// Exact canvas height, `image_height + band_height`.
    pub fn height(&self) -> f64 {
        f64::from(self.image_height) + self.band_height()
    }

    /// Pixel size of the drawing surface. Fractional heights are truncated.
    pub fn surface_size(&self) -> Size {
        let h = self.height().floor();
        let h = if h >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            h as u32
        };
        Size::new(self.width, h.max(self.image_height))
    }

    /// [`CanvasGeometry::surface_size`], or a validation error when the canvas would exceed
    /// [`MAX_CANVAS_SIDE`] on either side or [`MAX_CANVAS_PIXELS`] in area.
    pub fn checked_surface_size(&self) -> CaptionResult<Size> {
        let height = self.height();
        let too_tall = height.is_nan() || height >= f64::from(MAX_CANVAS_SIDE) + 1.0;
        if self.width > MAX_CANVAS_SIDE || too_tall {
            return Err(CaptionError::validation(format!(
                "canvas {}x{} exceeds the {MAX_CANVAS_SIDE}px side limit",
                self.width,
                height.floor()
            )));
        }
        let size = self.surface_size();
        let area = u64::from(size.width) * u64::from(size.height);
        if area > MAX_CANVAS_PIXELS {
            return Err(CaptionError::validation(format!(
                "canvas {}x{} exceeds {MAX_CANVAS_PIXELS} pixels",
                size.width, size.height
            )));
        }
        Ok(size)
    }

    /// Top edge of band `index`.
    pub fn band_top(&self, index: usize) -> f64 {
        f64::from(self.image_height) + index as f64 * self.line_height_px
    }

    /// Rectangle covered by band `index`: `[band_top, band_top + line_height_px)`.
    pub fn band_rect(&self, index: usize) -> Rect {
        let top = self.band_top(index);
        Rect::new(0.0, top, f64::from(self.width), top + self.line_height_px)
    }

    /// Vertical center of band `index`, where the text's middle is anchored.
    pub fn band_center_y(&self, index: usize) -> f64 {
        self.band_top(index) + self.line_height_px / 2.0
    }
}

/// Filtered caption lines together with the geometry derived from them.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionLayout {
    /// Lines to draw, one per band.
    pub lines: Vec<String>,
    /// Canvas geometry sized for exactly `lines.len()` bands.
    pub geometry: CanvasGeometry,
}

/// Stateless sizing engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutEngine;

impl LayoutEngine {
    /// Compute the canvas geometry for an image of `image` size under `config`.
    pub fn compute_geometry(image: Size, config: &StyleConfig) -> CanvasGeometry {
        Self::layout(image, config).geometry
    }

    /// Compute lines and geometry together.
    pub fn layout(image: Size, config: &StyleConfig) -> CaptionLayout {
        let lines: Vec<String> = caption_lines(&config.caption_text)
            .into_iter()
            .map(str::to_owned)
            .collect();
        let geometry = CanvasGeometry {
            width: image.width,
            image_height: image.height,
            line_count: lines.len(),
            line_height_px: config.line_height_px(),
        };
        CaptionLayout { lines, geometry }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
