//! Style settings that drive a render, and the subset persisted as preferences.

use serde::{Deserialize, Serialize};

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::style::color::Color;
use crate::style::templates::DEFAULT_CAPTION;

/// Font stack used when nothing else is configured.
pub const DEFAULT_FONT_FAMILY: &str = "Impact, Microsoft YaHei, Arial";

/// Largest accepted backdrop blur radius, in pixels.
pub const MAX_BACKDROP_BLUR_PX: u32 = 64;

/// Horizontal placement of each caption line inside its band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush against the left edge.
    Left,
    /// Centered on the canvas width.
    #[default]
    Center,
    /// Flush against the right edge.
    Right,
}

impl TextAlign {
    /// X coordinate of a line of `text_width` on a canvas of `canvas_width`.
    pub fn line_x(self, canvas_width: f64, text_width: f64) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Right => canvas_width - text_width,
            Self::Center => (canvas_width - text_width) / 2.0,
        }
    }
}

/// Resolved snapshot of every style and text field that drives a render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    /// Font size in pixels, > 0.
    pub font_size_px: u32,
    /// Comma-separated font stack, first resolvable family wins.
    pub font_family: String,
    /// Glyph fill color.
    pub font_color: Color,
    /// Glyph outline color.
    pub outline_color: Color,
    /// Outline stroke width in pixels; 0 disables the outline.
    pub outline_width_px: u32,
    /// Solid band tint.
    pub background_color: Color,
    /// Band opacity in percent, `0..=100`.
    pub background_opacity_pct: u8,
    /// Band height as a multiple of the font size.
    #[serde(alias = "backgroundHeight")]
    pub line_height_multiple: f64,
    /// Line alignment.
    pub text_align: TextAlign,
    /// Caption text, one caption line per `\n`.
    pub caption_text: String,
    /// Gaussian blur radius applied to the bottom-strip backdrop, `0..=MAX_BACKDROP_BLUR_PX`;
    /// 0 keeps it sharp.
    pub backdrop_blur_px: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_size_px: 32,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_color: Color::WHITE,
            outline_color: Color::BLACK,
            outline_width_px: 3,
            background_color: Color::BLACK,
            background_opacity_pct: 50,
            line_height_multiple: 1.5,
            text_align: TextAlign::Center,
            caption_text: DEFAULT_CAPTION.to_string(),
            backdrop_blur_px: 0,
        }
    }
}

impl StyleConfig {
    /// Reject values the layout and compositor cannot honor.
    pub fn validate(&self) -> CaptionResult<()> {
        if self.font_size_px == 0 {
            return Err(CaptionError::validation("fontSizePx must be > 0"));
        }
        if !self.line_height_multiple.is_finite() || self.line_height_multiple <= 0.0 {
            return Err(CaptionError::validation(
                "lineHeightMultiple must be finite and > 0",
            ));
        }
        if self.background_opacity_pct > 100 {
            return Err(CaptionError::validation(
                "backgroundOpacityPct must be within 0..=100",
            ));
        }
        if self.font_family.trim().is_empty() {
            return Err(CaptionError::validation("fontFamily must be non-empty"));
        }
        if self.backdrop_blur_px > MAX_BACKDROP_BLUR_PX {
            return Err(CaptionError::validation(format!(
                "backdropBlurPx must be within 0..={MAX_BACKDROP_BLUR_PX}"
            )));
        }
        Ok(())
    }

    /// Per-line band height, unrounded.
    pub fn line_height_px(&self) -> f64 {
        f64::from(self.font_size_px) * self.line_height_multiple
    }

    /// Band alpha in `0.0..=1.0`.
    pub fn background_alpha(&self) -> f32 {
        f32::from(self.background_opacity_pct.min(100)) / 100.0
    }

    /// The persisted subset of this config (everything except the caption text).
    pub fn preferences(&self) -> StylePreferences {
        StylePreferences {
            font_size_px: self.font_size_px,
            font_family: self.font_family.clone(),
            font_color: self.font_color,
            outline_color: self.outline_color,
            outline_width_px: self.outline_width_px,
            background_color: self.background_color,
            background_opacity_pct: self.background_opacity_pct,
            line_height_multiple: self.line_height_multiple,
            text_align: self.text_align,
            backdrop_blur_px: self.backdrop_blur_px,
        }
    }

    /// Overwrite every preference field, keeping the caption text.
    pub fn apply_preferences(&mut self, prefs: &StylePreferences) {
        self.font_size_px = prefs.font_size_px;
        self.font_family = prefs.font_family.clone();
        self.font_color = prefs.font_color;
        self.outline_color = prefs.outline_color;
        self.outline_width_px = prefs.outline_width_px;
        self.background_color = prefs.background_color;
        self.background_opacity_pct = prefs.background_opacity_pct;
        self.line_height_multiple = prefs.line_height_multiple;
        self.text_align = prefs.text_align;
        self.backdrop_blur_px = prefs.backdrop_blur_px;
    }
}

/// Style fields remembered between sessions; [`StyleConfig`] minus the caption text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylePreferences {
    /// See [`StyleConfig::font_size_px`].
    pub font_size_px: u32,
    /// See [`StyleConfig::font_family`].
    pub font_family: String,
    /// See [`StyleConfig::font_color`].
    pub font_color: Color,
    /// See [`StyleConfig::outline_color`].
    pub outline_color: Color,
    /// See [`StyleConfig::outline_width_px`].
    pub outline_width_px: u32,
    /// See [`StyleConfig::background_color`].
    pub background_color: Color,
    /// See [`StyleConfig::background_opacity_pct`].
    pub background_opacity_pct: u8,
    /// See [`StyleConfig::line_height_multiple`].
    #[serde(alias = "backgroundHeight")]
    pub line_height_multiple: f64,
    /// See [`StyleConfig::text_align`].
    pub text_align: TextAlign,
    /// See [`StyleConfig::backdrop_blur_px`].
    pub backdrop_blur_px: u32,
}

impl Default for StylePreferences {
    fn default() -> Self {
        StyleConfig::default().preferences()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/config.rs"]
mod tests;
