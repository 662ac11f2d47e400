//! Bounded, deduplicated list of recently generated captions.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::session::store::KeyValueStore;
use crate::style::config::StyleConfig;

/// Store key of the persisted record list.
pub const RECENT_IMAGES_KEY: &str = "recent-images";

/// Most records kept; the oldest is evicted first.
pub const MAX_RECENT_IMAGES: usize = 6;

/// One generated caption image, kept for reloading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentImageRecord {
    /// Creation time in epoch milliseconds, strictly increasing across records.
    pub id: u64,
    /// PNG data URI of the generated frame. Records are deduplicated on this.
    #[serde(alias = "imageData")]
    pub rendered_image: String,
    /// Data URI of the original upload.
    #[serde(alias = "originalImageData")]
    pub source_image: String,
    /// Creation time, RFC 3339 on disk.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Style and caption used for the render.
    #[serde(alias = "settings", default)]
    pub style_snapshot: StyleConfig,
}

/// In-memory list of [`RecentImageRecord`]s, newest first.
#[derive(Clone, Debug, Default)]
pub struct RecentImageStore {
    records: Vec<RecentImageRecord>,
}

impl RecentImageStore {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the persisted list. Missing or corrupt data yields an empty list.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(RECENT_IMAGES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read recent images");
                return Self::new();
            }
        };
        match serde_json::from_str::<Vec<RecentImageRecord>>(&raw) {
            Ok(mut records) => {
                records.truncate(MAX_RECENT_IMAGES);
                Self { records }
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored recent images are corrupt, starting empty");
                Self::new()
            }
        }
    }

    /// Write the list back under [`RECENT_IMAGES_KEY`].
    pub fn persist(&self, store: &mut dyn KeyValueStore) -> CaptionResult<()> {
        let json = serde_json::to_string(&self.records)
            .map_err(|e| CaptionError::persistence(format!("serialize recent images: {e}")))?;
        store.set(RECENT_IMAGES_KEY, &json)
    }

    /// Record a generated image at `now`.
    ///
    /// Returns `false` (and changes nothing) when a record with the same rendered image exists.
    pub fn insert(
        &mut self,
        rendered_image: String,
        source_image: String,
        style_snapshot: StyleConfig,
        now: OffsetDateTime,
    ) -> bool {
        if self
            .records
            .iter()
            .any(|r| r.rendered_image == rendered_image)
        {
            return false;
        }

        let now_ms = u64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
        let id = match self.records.iter().map(|r| r.id).max() {
            Some(last) if last >= now_ms => last + 1,
            _ => now_ms,
        };

        self.records.insert(
            0,
            RecentImageRecord {
                id,
                rendered_image,
                source_image,
                timestamp: now,
                style_snapshot,
            },
        );
        self.records.truncate(MAX_RECENT_IMAGES);
        true
    }

    /// Remove and return the record at `index`.
    pub fn remove(&mut self, index: usize) -> Option<RecentImageRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    /// Put a removed record back at `index`.
    pub(crate) fn restore(&mut self, index: usize, record: RecentImageRecord) {
        let index = index.min(self.records.len());
        self.records.insert(index, record);
    }

    /// Record at `index`, newest first.
    pub fn get(&self, index: usize) -> Option<&RecentImageRecord> {
        self.records.get(index)
    }

    /// All records, newest first.
    pub fn records(&self) -> &[RecentImageRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/recent.rs"]
mod tests;
