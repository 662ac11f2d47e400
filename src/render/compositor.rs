//! Full-frame caption rendering: image, band backdrops, outlined text.

use std::sync::Arc;

use crate::assets::fonts::{FontBook, FontFace};
use crate::assets::image::SourceImage;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::layout::geometry::{CanvasGeometry, LayoutEngine};
use crate::render::composite::{blit_over, fill_span};
use crate::render::slice::BackgroundSliceCache;
use crate::render::surface::Surface;
use crate::render::text::{ShapedLine, TextLayoutEngine};
use crate::style::config::StyleConfig;

/// Draws the captioned frame onto a [`Surface`].
///
/// Owns the font book, the shaping engine and a reusable raster context; nothing about a
/// previous frame other than the background slice (held by the caller) affects the next one.
pub struct SubtitleCompositor {
    fonts: FontBook,
    text: TextLayoutEngine,
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for SubtitleCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubtitleCompositor")
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

impl SubtitleCompositor {
    /// Compositor drawing text with faces from `fonts`.
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            text: TextLayoutEngine::new(),
            ctx: None,
        }
    }

    /// Loaded fonts.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Loaded fonts, for adding faces.
    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Redraw the whole frame.
    ///
    /// Returns `None` without touching `surface` when there is no image. Otherwise the surface
    /// is resized to the canvas geometry and every pixel is rewritten, so rendering the same
    /// inputs twice yields identical pixels.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn render(
        &mut self,
        surface: &mut Surface,
        image: Option<&SourceImage>,
        config: &StyleConfig,
        cache: &mut BackgroundSliceCache,
    ) -> CaptionResult<Option<CanvasGeometry>> {
        let Some(image) = image else {
            return Ok(None);
        };
        config.validate()?;

        let layout = LayoutEngine::layout(image.size(), config);
        let geometry = layout.geometry;

        surface.resize(geometry.checked_surface_size()?);
        surface.clear();
        let image_bytes = image.rgba8_premul();
        surface.data_mut()[..image_bytes.len()].copy_from_slice(image_bytes);

        if layout.lines.is_empty() {
            return Ok(Some(geometry));
        }

        let lh = geometry.line_height_px;
        let alpha = config.background_alpha();
        let band_color = config.background_color.to_premul();
        let slice = cache.get_or_populate(image, lh, config.backdrop_blur_px)?;

        for i in 0..layout.lines.len() {
            let top = geometry.band_top(i);
            fill_span(surface, top, top + lh, band_color, alpha);
            blit_over(
                surface,
                slice.rgba8_premul(),
                slice.size().width,
                top.round() as i64,
                alpha,
            )?;
        }

        let Some(face) = self.fonts.resolve(&config.font_family) else {
            tracing::warn!(
                font_family = %config.font_family,
                "no font available, caption text skipped"
            );
            return Ok(Some(geometry));
        };

        for (i, line) in layout.lines.iter().enumerate() {
            self.draw_line(surface, &geometry, i, line, &face, config)?;
        }

        Ok(Some(geometry))
    }

    fn draw_line(
        &mut self,
        surface: &mut Surface,
        geometry: &CanvasGeometry,
        index: usize,
        line: &str,
        face: &Arc<FontFace>,
        config: &StyleConfig,
    ) -> CaptionResult<()> {
        let size_px = config.font_size_px as f32;
        let shaped = self.text.shape_line(line, face, size_px)?;
        if shaped.glyphs.is_empty() {
            return Ok(());
        }

        let center_y = geometry.band_center_y(index);
        let outline = f64::from(config.outline_width_px);
        let pad = (geometry.line_height_px / 2.0).max(f64::from(size_px)) + outline;
        let top = (center_y - pad).floor().max(0.0);
        let bottom = (center_y + pad).ceil().min(f64::from(surface.height()));
        if bottom <= top {
            return Ok(());
        }

        let width = u16::try_from(surface.width())
            .map_err(|_| CaptionError::render("canvas width exceeds u16 raster limit"))?;
        let height = u16::try_from((bottom - top) as u32)
            .map_err(|_| CaptionError::render("text strip height exceeds u16 raster limit"))?;
        if width == 0 {
            return Ok(());
        }

        let x = config
            .text_align
            .line_x(f64::from(surface.width()), shaped.width);
        let y = shaped.origin_y_for_middle(center_y) - top;

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        self.with_ctx_mut(width, height, |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
            if config.outline_width_px > 0 {
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(outline)
                        .with_join(vello_cpu::kurbo::Join::Round)
                        .with_caps(vello_cpu::kurbo::Cap::Round),
                );
                ctx.set_paint(config.outline_color.to_cpu());
                ctx.glyph_run(&shaped.font)
                    .font_size(shaped.font_size)
                    .stroke_glyphs(cpu_glyphs(&shaped));
            }
            ctx.set_paint(config.font_color.to_cpu());
            ctx.glyph_run(&shaped.font)
                .font_size(shaped.font_size)
                .fill_glyphs(cpu_glyphs(&shaped));
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
        });

        blit_over(
            surface,
            pixmap.data_as_u8_slice(),
            u32::from(width),
            top as i64,
            1.0,
        )
    }

    fn with_ctx_mut(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext),
    ) {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        f(&mut ctx);
        self.ctx = Some(ctx);
    }
}

fn cpu_glyphs(shaped: &ShapedLine) -> impl Iterator<Item = vello_cpu::Glyph> + '_ {
    shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
        id: g.id,
        x: g.x,
        y: g.y,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
