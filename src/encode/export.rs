//! Still-image export: PNG/JPEG encoding, data URIs and download file names.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::ImageEncoder;

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::surface::Surface;

/// JPEG quality used when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Target format of an export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Lossless, keeps the band alpha.
    #[default]
    Png,
    /// Lossy; translucent pixels are flattened onto black.
    Jpeg {
        /// Encoder quality, `0..=100`.
        quality: u8,
    },
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("png"),
            Self::Jpeg { quality } => write!(f, "jpeg:{quality}"),
        }
    }
}

/// Parses `png`, `jpg`, `jpeg` or `jpeg:<quality>`.
impl FromStr for ExportFormat {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let (name, quality) = match s.split_once(':') {
            Some((name, q)) => {
                let q: u8 = q
                    .parse()
                    .map_err(|_| CaptionError::validation(format!("invalid jpeg quality '{q}'")))?;
                (name.to_string(), Some(q))
            }
            None => (s, None),
        };
        match (name.as_str(), quality) {
            ("png", None) => Ok(Self::Png),
            ("jpg" | "jpeg", q) => {
                let quality = q.unwrap_or(DEFAULT_JPEG_QUALITY);
                if quality > 100 {
                    return Err(CaptionError::validation(
                        "jpeg quality must be within 0..=100",
                    ));
                }
                Ok(Self::Jpeg { quality })
            }
            _ => Err(CaptionError::validation(format!(
                "unsupported export format '{name}'"
            ))),
        }
    }
}

/// An encoded export ready to be written by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    /// `caption_<epoch-millis>.<ext>`.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub mime: String,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    /// Write the image into `dir` under its file name and return the full path.
    pub fn write_to_dir(&self, dir: &Path) -> CaptionResult<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| {
            CaptionError::encode(format!("create output dir '{}': {e}", dir.display()))
        })?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .map_err(|e| CaptionError::encode(format!("write '{}': {e}", path.display())))?;
        Ok(path)
    }
}

/// Download name for an export taken at `epoch_millis`.
pub fn export_file_name(epoch_millis: i64, format: ExportFormat) -> String {
    format!("caption_{epoch_millis}.{}", format.extension())
}

/// Encode the surface in `format`.
#[tracing::instrument(level = "debug", skip(surface), fields(width = surface.width(), height = surface.height()))]
pub fn encode_surface(surface: &Surface, format: ExportFormat) -> CaptionResult<Vec<u8>> {
    let (w, h) = (surface.width(), surface.height());
    if w == 0 || h == 0 {
        return Err(CaptionError::encode("cannot encode an empty surface"));
    }

    let mut out = Vec::new();
    match format {
        ExportFormat::Png => {
            let rgba = surface.to_straight_rgba8();
            image::codecs::png::PngEncoder::new(&mut out)
                .write_image(&rgba, w, h, image::ExtendedColorType::Rgba8)
                .map_err(|e| CaptionError::encode(format!("png encode failed: {e}")))?;
        }
        ExportFormat::Jpeg { quality } => {
            // Premultiplied color is already the pixel composited over black.
            let rgb: Vec<u8> = surface
                .data()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
                .write_image(&rgb, w, h, image::ExtendedColorType::Rgb8)
                .map_err(|e| CaptionError::encode(format!("jpeg encode failed: {e}")))?;
        }
    }
    Ok(out)
}

/// Encode the surface and name it for download.
pub fn export_surface(
    surface: &Surface,
    format: ExportFormat,
    epoch_millis: i64,
) -> CaptionResult<ExportedImage> {
    Ok(ExportedImage {
        file_name: export_file_name(epoch_millis, format),
        mime: format.mime().to_string(),
        bytes: encode_surface(surface, format)?,
    })
}

/// `data:<mime>;base64,<payload>`.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Split a base64 data URI into its MIME type and decoded bytes.
pub fn parse_data_uri(uri: &str) -> CaptionResult<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| CaptionError::decode("not a data uri"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CaptionError::decode("data uri has no payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| CaptionError::decode("only base64 data uris are supported"))?;
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| CaptionError::decode(format!("invalid base64 payload: {e}")))?;
    Ok((mime.to_string(), bytes))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
