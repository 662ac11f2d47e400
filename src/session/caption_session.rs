//! Command-driven caption editing session.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::assets::fonts::FontBook;
use crate::assets::image::{SourceImage, format_file_size, validate_upload};
use crate::encode::export::{
    ExportFormat, ExportedImage, data_uri, encode_surface, export_surface, parse_data_uri,
};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::layout::geometry::{CanvasGeometry, LayoutEngine};
use crate::render::compositor::SubtitleCompositor;
use crate::render::slice::{BackgroundSliceCache, SliceKey};
use crate::render::surface::Surface;
use crate::session::history::{HistoryEntry, HistoryStack};
use crate::session::notice::{Notice, NoticeBoard};
use crate::session::prefs::PreferenceStore;
use crate::session::recent::{RecentImageRecord, RecentImageStore};
use crate::session::store::KeyValueStore;
use crate::style::config::StyleConfig;
use crate::style::templates::{TextStats, caption_template};

/// Name and size of the upload currently shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadInfo {
    /// File name as given by the host.
    pub name: String,
    /// Encoded size in bytes.
    pub size_bytes: usize,
}

impl UploadInfo {
    /// Size formatted for display.
    pub fn display_size(&self) -> String {
        format_file_size(self.size_bytes as u64)
    }
}

/// A validated upload waiting to be decoded.
///
/// Decoding does not touch the session, so it can run on another thread.
#[derive(Debug)]
pub struct PendingDecode {
    info: UploadInfo,
    bytes: Vec<u8>,
}

impl PendingDecode {
    /// Upload metadata.
    pub fn info(&self) -> &UploadInfo {
        &self.info
    }

    /// Decode the bytes.
    pub fn decode(self) -> DecodedUpload {
        let image = SourceImage::decode(&self.bytes);
        DecodedUpload {
            info: self.info,
            image,
        }
    }
}

/// Outcome of [`PendingDecode::decode`], handed back to [`CaptionSession::finish_upload`].
#[derive(Debug)]
pub struct DecodedUpload {
    info: UploadInfo,
    image: CaptionResult<SourceImage>,
}

/// All state behind one caption editor.
///
/// Every command takes `&mut self`, re-renders the preview when it changes something visible,
/// and posts a notice. Failed commands return the error, post an error notice and leave the
/// session as it was.
pub struct CaptionSession {
    store: Box<dyn KeyValueStore>,
    compositor: SubtitleCompositor,
    style: StyleConfig,
    image: Option<Arc<SourceImage>>,
    upload: Option<UploadInfo>,
    surface: Surface,
    slice_cache: BackgroundSliceCache,
    history: HistoryStack,
    recent: RecentImageStore,
    generated: Option<String>,
    notices: NoticeBoard,
}

impl std::fmt::Debug for CaptionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionSession")
            .field("style", &self.style)
            .field("upload", &self.upload)
            .field("history", &self.history.len())
            .field("recent", &self.recent.len())
            .field("generated", &self.generated.is_some())
            .finish_non_exhaustive()
    }
}

impl CaptionSession {
    /// Open a session over `store`, restoring saved preferences and the recent-image list.
    pub fn new(store: impl KeyValueStore + 'static, fonts: FontBook) -> Self {
        let store: Box<dyn KeyValueStore> = Box::new(store);
        let mut style = StyleConfig::default();
        if let Some(prefs) = PreferenceStore::load(store.as_ref()) {
            style.apply_preferences(&prefs);
            if let Err(e) = style.validate() {
                tracing::warn!(error = %e, "stored preferences out of range, using defaults");
                style = StyleConfig::default();
            }
        }
        let recent = RecentImageStore::load(store.as_ref());
        tracing::debug!(recent = recent.len(), "session opened");

        Self {
            store,
            compositor: SubtitleCompositor::new(fonts),
            style,
            image: None,
            upload: None,
            surface: Surface::default(),
            slice_cache: BackgroundSliceCache::new(),
            history: HistoryStack::new(),
            recent,
            generated: None,
            notices: NoticeBoard::new(),
        }
    }

    /// Current style.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Current source image.
    pub fn image(&self) -> Option<&Arc<SourceImage>> {
        self.image.as_ref()
    }

    /// Metadata of the current upload.
    pub fn upload(&self) -> Option<&UploadInfo> {
        self.upload.as_ref()
    }

    /// Last rendered frame.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// PNG data URI of the last generate, if any.
    pub fn generated(&self) -> Option<&str> {
        self.generated.as_deref()
    }

    /// Generate history.
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Recent images, newest first.
    pub fn recent(&self) -> &[RecentImageRecord] {
        self.recent.records()
    }

    /// Canvas geometry for the current image and style.
    pub fn geometry(&self) -> Option<CanvasGeometry> {
        self.image
            .as_ref()
            .map(|img| LayoutEngine::compute_geometry(img.size(), &self.style))
    }

    /// Compositor, for font inspection and loading.
    pub fn compositor_mut(&mut self) -> &mut SubtitleCompositor {
        &mut self.compositor
    }

    /// How many times the band backdrop has been cut.
    pub fn slice_populate_count(&self) -> u64 {
        self.slice_cache.populate_count()
    }

    fn fail<T>(&mut self, err: CaptionError) -> CaptionResult<T> {
        self.notices.error(err.to_string());
        Err(err)
    }

    fn sync_slice(&mut self) {
        if let Some(img) = &self.image {
            self.slice_cache.sync(SliceKey::new(
                img,
                self.style.line_height_px(),
                self.style.backdrop_blur_px,
            ));
        } else {
            self.slice_cache.invalidate();
        }
    }

    fn render(&mut self) -> CaptionResult<Option<CanvasGeometry>> {
        self.sync_slice();
        self.compositor.render(
            &mut self.surface,
            self.image.as_deref(),
            &self.style,
            &mut self.slice_cache,
        )
    }

    /// Swap in `image` and `style`, rendering before committing; on failure nothing changes.
    ///
    /// A change to either drops the generated frame, so `save` needs a fresh `generate`.
    fn install(
        &mut self,
        image: Option<Arc<SourceImage>>,
        style: StyleConfig,
    ) -> CaptionResult<()> {
        let prev_image = std::mem::replace(&mut self.image, image);
        let prev_style = std::mem::replace(&mut self.style, style);
        match self.render() {
            Ok(_) => {
                let same_image = match (&prev_image, &self.image) {
                    (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                    (None, None) => true,
                    _ => false,
                };
                if !same_image || prev_style != self.style {
                    self.generated = None;
                }
                Ok(())
            }
            Err(e) => {
                self.image = prev_image;
                self.style = prev_style;
                if let Err(restore) = self.render() {
                    tracing::warn!(error = %restore, "failed to restore previous preview");
                }
                self.fail(e)
            }
        }
    }

    /// Validate an upload before decoding it.
    pub fn begin_upload(
        &mut self,
        name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> CaptionResult<PendingDecode> {
        if let Err(e) = validate_upload(mime, bytes.len()) {
            return self.fail(e);
        }
        Ok(PendingDecode {
            info: UploadInfo {
                name: name.to_string(),
                size_bytes: bytes.len(),
            },
            bytes,
        })
    }

    /// Install a decoded upload.
    ///
    /// Uploads are not sequenced: when several decodes are in flight, the last one finished
    /// is what the session shows.
    pub fn finish_upload(&mut self, decoded: DecodedUpload) -> CaptionResult<()> {
        let image = match decoded.image {
            Ok(image) => Arc::new(image),
            Err(e) => return self.fail(e),
        };
        tracing::debug!(
            name = %decoded.info.name,
            width = image.width(),
            height = image.height(),
            "upload decoded"
        );
        let style = self.style.clone();
        self.install(Some(image), style)?;
        self.notices.success(format!(
            "loaded {} ({})",
            decoded.info.name,
            decoded.info.display_size()
        ));
        self.upload = Some(decoded.info);
        Ok(())
    }

    /// Validate, decode and install in one step.
    pub fn load_image_bytes(&mut self, name: &str, mime: &str, bytes: Vec<u8>) -> CaptionResult<()> {
        let pending = self.begin_upload(name, mime, bytes)?;
        self.finish_upload(pending.decode())
    }

    /// Replace the whole style, caption text included.
    pub fn set_style(&mut self, style: StyleConfig) -> CaptionResult<()> {
        if let Err(e) = style.validate() {
            return self.fail(e);
        }
        let image = self.image.clone();
        self.install(image, style)
    }

    /// Replace the caption text.
    pub fn set_caption_text(&mut self, text: &str) -> CaptionResult<()> {
        let style = StyleConfig {
            caption_text: text.to_string(),
            ..self.style.clone()
        };
        self.set_style(style)
    }

    /// Replace the caption with built-in template `number` (1-based).
    pub fn apply_template(&mut self, number: usize) -> CaptionResult<()> {
        let Some(text) = caption_template(number) else {
            return self.fail(CaptionError::validation(format!(
                "no caption template {number}"
            )));
        };
        self.set_caption_text(text)?;
        self.notices.success("template applied");
        Ok(())
    }

    /// Empty the caption text.
    pub fn clear_text(&mut self) -> CaptionResult<()> {
        self.set_caption_text("")?;
        self.notices.info("text cleared");
        Ok(())
    }

    /// Line and character counts of the caption text.
    pub fn text_stats(&self) -> TextStats {
        TextStats::of(&self.style.caption_text)
    }

    /// Re-render and return the preview frame, or `None` without an image.
    pub fn preview(&mut self) -> CaptionResult<Option<&Surface>> {
        match self.render() {
            Ok(Some(_)) => Ok(Some(&self.surface)),
            Ok(None) => Ok(None),
            Err(e) => self.fail(e),
        }
    }

    /// Render the final frame, record it in history and the recent list, and keep it for
    /// saving. Returns the PNG data URI of the frame.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn generate(&mut self) -> CaptionResult<&str> {
        let Some(image) = self.image.clone() else {
            return self.fail(CaptionError::validation("upload an image first"));
        };
        let rendered = match self
            .render()
            .and_then(|_| encode_surface(&self.surface, ExportFormat::Png))
        {
            Ok(png) => data_uri(ExportFormat::Png.mime(), &png),
            Err(e) => return self.fail(e),
        };

        self.history.push(HistoryEntry {
            image: image.clone(),
            style: self.style.clone(),
        });

        let source = data_uri(image.mime(), image.encoded());
        let inserted = self.recent.insert(
            rendered.clone(),
            source,
            self.style.clone(),
            OffsetDateTime::now_utc(),
        );
        if inserted {
            if let Err(e) = self.recent.persist(self.store.as_mut()) {
                tracing::warn!(error = %e, "failed to persist recent images");
            }
        }

        self.notices.success("image generated");
        Ok(self.generated.insert(rendered).as_str())
    }

    /// Export the current frame. Requires a prior [`CaptionSession::generate`].
    pub fn save(&mut self, format: ExportFormat) -> CaptionResult<ExportedImage> {
        if self.generated.is_none() {
            return self.fail(CaptionError::validation("generate an image first"));
        }
        let now_ms = i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000)
            .unwrap_or(i64::MAX);
        match export_surface(&self.surface, format, now_ms) {
            Ok(exported) => {
                self.notices.success("image saved");
                Ok(exported)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Restore the previous history entry. Returns `false` when there is none.
    pub fn undo(&mut self) -> CaptionResult<bool> {
        let Some(entry) = self.history.undo().cloned() else {
            return Ok(false);
        };
        if let Err(e) = self.install(Some(entry.image), entry.style) {
            self.history.redo();
            return Err(e);
        }
        self.notices.info("undone");
        Ok(true)
    }

    /// Re-apply the next history entry. Returns `false` when there is none.
    pub fn redo(&mut self) -> CaptionResult<bool> {
        let Some(entry) = self.history.redo().cloned() else {
            return Ok(false);
        };
        if let Err(e) = self.install(Some(entry.image), entry.style) {
            self.history.undo();
            return Err(e);
        }
        self.notices.info("redone");
        Ok(true)
    }

    /// Reload the source image and style of recent record `index`.
    ///
    /// A record whose snapshot has no caption text keeps the current caption.
    pub fn load_recent(&mut self, index: usize) -> CaptionResult<()> {
        let Some(record) = self.recent.get(index).cloned() else {
            return self.fail(CaptionError::validation(format!(
                "no recent image at index {index}"
            )));
        };
        let image = match parse_data_uri(&record.source_image)
            .and_then(|(_, bytes)| SourceImage::decode(&bytes))
        {
            Ok(image) => Arc::new(image),
            Err(e) => return self.fail(e),
        };
        let mut style = record.style_snapshot;
        if style.caption_text.trim().is_empty() {
            style.caption_text = self.style.caption_text.clone();
        }
        if let Err(e) = style.validate() {
            return self.fail(e);
        }
        self.install(Some(image), style)?;
        self.upload = None;
        self.generated = None;
        self.notices.success("recent image loaded");
        Ok(())
    }

    /// Delete recent record `index` and persist the list.
    pub fn delete_recent(&mut self, index: usize) -> CaptionResult<RecentImageRecord> {
        let Some(removed) = self.recent.remove(index) else {
            return self.fail(CaptionError::validation(format!(
                "no recent image at index {index}"
            )));
        };
        if let Err(e) = self.recent.persist(self.store.as_mut()) {
            self.recent.restore(index, removed);
            return self.fail(e);
        }
        self.notices.success("image deleted");
        Ok(removed)
    }

    /// Persist the current style (without caption text) as preferences.
    pub fn save_preferences(&mut self) -> CaptionResult<()> {
        let prefs = self.style.preferences();
        if let Err(e) = PreferenceStore::save(self.store.as_mut(), &prefs) {
            return self.fail(e);
        }
        self.notices.success("preferences saved");
        Ok(())
    }

    /// Forget stored preferences; the current style is untouched.
    pub fn clear_preferences(&mut self) -> CaptionResult<()> {
        if let Err(e) = PreferenceStore::clear(self.store.as_mut()) {
            return self.fail(e);
        }
        self.notices.info("preferences cleared");
        Ok(())
    }

    /// Back to defaults: no image, default style, empty history.
    ///
    /// The recent list and stored preferences are kept.
    pub fn reset(&mut self) {
        self.style = StyleConfig::default();
        self.image = None;
        self.upload = None;
        self.generated = None;
        self.history.clear();
        self.slice_cache.invalidate();
        self.surface = Surface::default();
        self.notices.success("settings reset");
    }

    /// Take all queued notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/caption_session.rs"]
mod tests;
