//! Linear undo/redo stack of generated states.

use std::sync::Arc;

use crate::assets::image::SourceImage;
use crate::style::config::StyleConfig;

/// Most entries kept; the oldest is dropped first.
pub const MAX_HISTORY: usize = 10;

/// Image and style at the moment of a generate.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Source image.
    pub image: Arc<SourceImage>,
    /// Style, caption text included.
    pub style: StyleConfig,
}

/// Bounded history with a cursor at the current entry.
#[derive(Clone, Debug, Default)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl HistoryStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `entry` after the cursor, discarding anything that was redoable.
    pub fn push(&mut self, entry: HistoryEntry) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(entry);
        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back and return the entry now current.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let c = self.cursor.filter(|&c| c > 0)? - 1;
        self.cursor = Some(c);
        self.entries.get(c)
    }

    /// Step forward and return the entry now current.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let c = self.cursor? + 1;
        if c >= self.entries.len() {
            return None;
        }
        self.cursor = Some(c);
        self.entries.get(c)
    }

    /// Whether [`HistoryStack::undo`] would move.
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// Whether [`HistoryStack::redo`] would move.
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor?)
    }

    /// Cursor position.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/history.rs"]
mod tests;
