//! Persisted style preferences.

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::session::store::KeyValueStore;
use crate::style::config::StylePreferences;

/// Store key of the persisted [`StylePreferences`].
pub const PREFERENCES_KEY: &str = "preferences";

/// Reads and writes [`StylePreferences`] through a [`KeyValueStore`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PreferenceStore;

impl PreferenceStore {
    /// Stored preferences, or `None` when absent or unreadable.
    ///
    /// Unreadable data is logged and treated as absent.
    pub fn load(store: &dyn KeyValueStore) -> Option<StylePreferences> {
        let raw = match store.get(PREFERENCES_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored preferences");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(prefs) => Some(prefs),
            Err(e) => {
                tracing::warn!(error = %e, "stored preferences are corrupt, using defaults");
                None
            }
        }
    }

    /// Persist `prefs`.
    pub fn save(store: &mut dyn KeyValueStore, prefs: &StylePreferences) -> CaptionResult<()> {
        let json = serde_json::to_string_pretty(prefs)
            .map_err(|e| CaptionError::persistence(format!("serialize preferences: {e}")))?;
        store.set(PREFERENCES_KEY, &json)
    }

    /// Forget stored preferences.
    pub fn clear(store: &mut dyn KeyValueStore) -> CaptionResult<()> {
        store.remove(PREFERENCES_KEY)
    }
}
