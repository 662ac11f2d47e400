//! String-keyed persistence for preferences and the recent-image list.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::foundation::error::{CaptionError, CaptionResult};

/// Minimal key/value contract the session persists through.
///
/// Values are JSON documents; a missing key reads as `None`.
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> CaptionResult<Option<String>>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> CaptionResult<()>;
    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> CaptionResult<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> CaptionResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            CaptionError::persistence(format!("create store dir '{}': {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> CaptionResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CaptionError::persistence(format!("invalid store key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> CaptionResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CaptionError::persistence(format!(
                "read '{}': {e}",
                path.display()
            ))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> CaptionResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .and_then(|()| std::fs::rename(&tmp, &path))
            .map_err(|e| {
                if let Err(cleanup) = std::fs::remove_file(&tmp)
                    && cleanup.kind() != std::io::ErrorKind::NotFound
                {
                    tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp file");
                }
                CaptionError::persistence(format!("write '{}': {e}", path.display()))
            })
    }

    fn remove(&mut self, key: &str) -> CaptionResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CaptionError::persistence(format!(
                "remove '{}': {e}",
                path.display()
            ))),
        }
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CaptionResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| CaptionError::persistence("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> CaptionResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CaptionResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CaptionResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
