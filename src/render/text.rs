use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::fonts::FontFace;
use crate::foundation::error::{CaptionError, CaptionResult};

/// Parley brush; caption colors are applied at draw time, not per run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PlainBrush;

/// One glyph positioned relative to the line origin (x = 0 at the line start, y = 0 at the
/// layout top).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PlacedGlyph {
    pub(crate) id: u32,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// A single shaped caption line.
#[derive(Clone, Debug)]
pub(crate) struct ShapedLine {
    pub(crate) glyphs: Vec<PlacedGlyph>,
    /// Advance width including leading/trailing whitespace, like a canvas `measureText`.
    pub(crate) width: f64,
    /// Baseline y within the layout.
    pub(crate) baseline: f64,
    pub(crate) ascent: f64,
    pub(crate) descent: f64,
    pub(crate) font_size: f32,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl ShapedLine {
    /// Vertical offset placing the middle of the ascent/descent box at `center_y`.
    pub(crate) fn origin_y_for_middle(&self, center_y: f64) -> f64 {
        center_y - (self.baseline + (self.descent - self.ascent) / 2.0)
    }
}

struct RegisteredFont {
    // Keeps the keyed allocation alive so its address cannot be reused by another face.
    _data: Arc<Vec<u8>>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

/// Shapes caption lines with Parley.
///
/// Font bytes are registered once per loaded face and reused across renders.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<PlainBrush>,
    registered: HashMap<(usize, u32), RegisteredFont>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    fn register(&mut self, face: &FontFace) -> CaptionResult<(String, vello_cpu::peniko::FontData)> {
        let key = (Arc::as_ptr(&face.data) as usize, face.index);
        if let Some(r) = self.registered.get(&key) {
            return Ok((r.family_name.clone(), r.font.clone()));
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.data.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CaptionError::validation(format!(
                "no font families registered for '{}'",
                face.family
            ))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CaptionError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(face.data.as_ref().clone()),
            face.index,
        );
        self.registered.insert(
            key,
            RegisteredFont {
                _data: Arc::clone(&face.data),
                family_name: family_name.clone(),
                font: font.clone(),
            },
        );
        Ok((family_name, font))
    }

    /// Shape `text` as a single unwrapped line.
    pub(crate) fn shape_line(
        &mut self,
        text: &str,
        face: &Arc<FontFace>,
        size_px: f32,
    ) -> CaptionResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CaptionError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let (family_name, font) = self.register(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<PlainBrush> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        let (mut baseline, mut ascent, mut descent) = (0.0f64, 0.0f64, 0.0f64);
        if let Some(line) = layout.lines().next() {
            let m = line.metrics();
            baseline = f64::from(m.baseline);
            ascent = f64::from(m.ascent);
            descent = f64::from(m.descent);
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| PlacedGlyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
            }
        }

        Ok(ShapedLine {
            glyphs,
            width: f64::from(layout.full_width()),
            baseline,
            ascent,
            descent,
            font_size: size_px,
            font,
        })
    }
}
