//! Captioner overlays multi-line, outlined caption text onto still images.
//!
//! Each non-blank caption line gets its own band appended beneath the image. A band is a solid
//! tint blended with a copy of the image's bottom strip, with the text centered vertically on
//! it. The public API is session-oriented:
//!
//! - Open a [`CaptionSession`] over a [`KeyValueStore`]
//! - Upload an image and adjust the [`StyleConfig`]
//! - Preview, generate, and export the frame as PNG or JPEG
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod encode;
pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod style;

pub use crate::foundation::core::{Rect, Rgba8Premul, Size};
pub use crate::foundation::error::{CaptionError, CaptionResult};

pub use crate::assets::fonts::{FontBook, FontFace, parse_stack};
pub use crate::assets::image::{
    MAX_UPLOAD_BYTES, SourceImage, format_file_size, validate_upload,
};
pub use crate::encode::export::{
    DEFAULT_JPEG_QUALITY, ExportFormat, ExportedImage, data_uri, encode_surface,
    export_file_name, export_surface, parse_data_uri,
};
pub use crate::layout::geometry::{
    CanvasGeometry, CaptionLayout, LayoutEngine, MAX_CANVAS_PIXELS, MAX_CANVAS_SIDE, caption_lines,
};
pub use crate::render::compositor::SubtitleCompositor;
pub use crate::render::slice::{BackgroundSlice, BackgroundSliceCache, SliceKey};
pub use crate::render::surface::Surface;
pub use crate::session::caption_session::{
    CaptionSession, DecodedUpload, PendingDecode, UploadInfo,
};
pub use crate::session::history::{HistoryEntry, HistoryStack, MAX_HISTORY};
pub use crate::session::notice::{NOTICE_LIFETIME, Notice, NoticeBoard, NoticeKind};
pub use crate::session::prefs::{PREFERENCES_KEY, PreferenceStore};
pub use crate::session::recent::{
    MAX_RECENT_IMAGES, RECENT_IMAGES_KEY, RecentImageRecord, RecentImageStore,
};
pub use crate::session::store::{FileStore, KeyValueStore, MemoryStore};
pub use crate::style::color::Color;
pub use crate::style::config::{
    DEFAULT_FONT_FAMILY, MAX_BACKDROP_BLUR_PX, StyleConfig, StylePreferences, TextAlign,
};
pub use crate::style::templates::{CAPTION_TEMPLATES, DEFAULT_CAPTION, TextStats, caption_template};
