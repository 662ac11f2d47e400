use std::sync::Arc;

use anyhow::Context;
use xxhash_rust::xxh3::xxh3_64;

use crate::foundation::core::{Size, premultiply_rgba8_in_place};
use crate::foundation::error::{CaptionError, CaptionResult};

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Decoded source image in premultiplied RGBA8 form, plus its original encoding.
///
/// Immutable once built; sessions share it through `Arc`.
#[derive(Clone, Debug)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
    encoded: Arc<Vec<u8>>,
    mime: String,
    fingerprint: u64,
}

impl SourceImage {
    /// Decode encoded image bytes (PNG, JPEG, WebP, ...).
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn decode(bytes: &[u8]) -> CaptionResult<Self> {
        let format = image::guess_format(bytes)
            .map_err(|e| CaptionError::decode(format!("unrecognized image data: {e}")))?;
        let dyn_img = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| CaptionError::decode(format!("failed to decode image: {e}")))?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(CaptionError::decode("image has zero width or height"));
        }

        let mut rgba8_premul = rgba.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        let fingerprint = xxh3_64(&rgba8_premul) ^ ((u64::from(width) << 32) | u64::from(height));

        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
            encoded: Arc::new(bytes.to_vec()),
            mime: format.to_mime_type().to_string(),
            fingerprint,
        })
    }

    /// Build an image from straight-alpha RGBA8 pixels, encoding a PNG copy as its source bytes.
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> CaptionResult<Self> {
        let img = image::RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| CaptionError::validation("rgba buffer does not match dimensions"))?;
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .context("encode source image as png")?;
        Self::decode(&png)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Premultiplied RGBA8 pixels, row-major, tightly packed.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// The bytes this image was decoded from.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// MIME type of [`SourceImage::encoded`].
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Content identity: equal pixels and dimensions give equal fingerprints.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

/// Check a picked or dropped file before reading it.
///
/// Only `image/*` MIME types up to [`MAX_UPLOAD_BYTES`] are accepted.
pub fn validate_upload(mime: &str, size_bytes: usize) -> CaptionResult<()> {
    let mime = mime.trim().to_ascii_lowercase();
    if !mime.starts_with("image/") {
        return Err(CaptionError::validation(format!(
            "please upload an image file (got '{mime}')"
        )));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(CaptionError::validation(format!(
            "image must not exceed 10MB (got {})",
            format_file_size(size_bytes as u64)
        )));
    }
    Ok(())
}

/// Human-readable byte count: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 3] = ["Bytes", "KB", "MB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;
