//! Single-slot cache for the bottom strip of the source image used as band backdrop.

use crate::assets::image::SourceImage;
use crate::foundation::core::Size;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::blur::{blur_rgba8_premul, sigma_for_radius};

/// Identity of a cut: which image, at which line height, with which blur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SliceKey {
    /// [`SourceImage::fingerprint`] of the image the slice was cut from.
    pub image: u64,
    /// `f64::to_bits` of the line height in pixels.
    pub line_height_bits: u64,
    /// Backdrop blur radius.
    pub blur_px: u32,
}

impl SliceKey {
    /// Key for cutting `image` at `line_height_px` with `blur_px`.
    pub fn new(image: &SourceImage, line_height_px: f64, blur_px: u32) -> Self {
        Self {
            image: image.fingerprint(),
            line_height_bits: line_height_px.to_bits(),
            blur_px,
        }
    }
}

/// Bottom strip of the source image, `image.width` wide and one line height tall.
#[derive(Clone, Debug)]
pub struct BackgroundSlice {
    key: SliceKey,
    size: Size,
    rgba8_premul: Vec<u8>,
}

impl BackgroundSlice {
    /// Cut the strip from the bottom of `image`.
    ///
    /// The strip is `floor(line_height_px)` rows tall, clamped to `1..=image.height`.
    pub fn cut(image: &SourceImage, line_height_px: f64, blur_px: u32) -> CaptionResult<Self> {
        let rows = slice_rows(image.height(), line_height_px);
        let stride = image.width() as usize * 4;
        let start = (image.height() - rows) as usize * stride;
        let strip = &image.rgba8_premul()[start..start + rows as usize * stride];

        let rgba8_premul = if blur_px > 0 {
            blur_rgba8_premul(strip, image.width(), rows, blur_px, sigma_for_radius(blur_px))?
        } else {
            strip.to_vec()
        };

        Ok(Self {
            key: SliceKey::new(image, line_height_px, blur_px),
            size: Size::new(image.width(), rows),
            rgba8_premul,
        })
    }

    /// Which cut this is.
    pub fn key(&self) -> SliceKey {
        self.key
    }

    /// Strip dimensions.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Premultiplied RGBA8 pixels.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

fn slice_rows(image_height: u32, line_height_px: f64) -> u32 {
    let rows = line_height_px.floor();
    if rows.is_nan() || rows < 1.0 {
        return 1;
    }
    if rows >= f64::from(image_height) {
        return image_height;
    }
    rows as u32
}

/// Single-slot memo of the current [`BackgroundSlice`].
///
/// Every mutator of the image, the line height or the blur radius must call
/// [`BackgroundSliceCache::invalidate`] (or [`BackgroundSliceCache::sync`], which invalidates
/// when the key changed). [`BackgroundSliceCache::get_or_populate`] also refuses to hand out a
/// slice whose key differs from the requested one.
#[derive(Debug, Default)]
pub struct BackgroundSliceCache {
    slot: Option<BackgroundSlice>,
    populate_count: u64,
}

impl BackgroundSliceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached slice, if any.
    pub fn get(&self) -> Option<&BackgroundSlice> {
        self.slot.as_ref()
    }

    /// Drop the cached slice.
    pub fn invalidate(&mut self) {
        if self.slot.take().is_some() {
            tracing::debug!("background slice invalidated");
        }
    }

    /// Invalidate when the cached slice was cut under a different key.
    pub fn sync(&mut self, key: SliceKey) {
        if self.slot.as_ref().is_some_and(|s| s.key != key) {
            self.invalidate();
        }
    }

    /// Cut and store a fresh slice, replacing whatever was cached.
    pub fn populate(
        &mut self,
        image: &SourceImage,
        line_height_px: f64,
        blur_px: u32,
    ) -> CaptionResult<&BackgroundSlice> {
        let slice = BackgroundSlice::cut(image, line_height_px, blur_px)?;
        tracing::debug!(
            width = slice.size.width,
            rows = slice.size.height,
            blur_px,
            "background slice populated"
        );
        self.populate_count += 1;
        Ok(self.slot.insert(slice))
    }

    /// Return the cached slice for this key, cutting a new one when absent or stale.
    pub fn get_or_populate(
        &mut self,
        image: &SourceImage,
        line_height_px: f64,
        blur_px: u32,
    ) -> CaptionResult<&BackgroundSlice> {
        self.sync(SliceKey::new(image, line_height_px, blur_px));
        if self.slot.is_none() {
            self.populate(image, line_height_px, blur_px)?;
        }
        self.slot
            .as_ref()
            .ok_or_else(|| CaptionError::render("background slice missing after populate"))
    }

    /// How many times a slice has been cut since construction.
    pub fn populate_count(&self) -> u64 {
        self.populate_count
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/slice.rs"]
mod tests;
