//! Font stack resolution.
//!
//! A configured font family is a CSS-style stack (`"Impact, Microsoft YaHei, Arial"`). The first
//! entry that names a loaded face wins; when none does, the first loaded face is used so captions
//! still render.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use usvg::fontdb;

use crate::foundation::error::{CaptionError, CaptionResult};

/// Raw bytes of one resolved font face.
#[derive(Clone, Debug)]
pub struct FontFace {
    /// Family name as reported by the font.
    pub family: String,
    /// Font file bytes (may be a collection).
    pub data: Arc<Vec<u8>>,
    /// Face index within a collection.
    pub index: u32,
}

/// Loaded font faces plus a memo of resolved stacks.
pub struct FontBook {
    db: fontdb::Database,
    resolved: HashMap<String, Option<Arc<FontFace>>>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .field("resolved", &self.resolved.len())
            .finish()
    }
}

impl FontBook {
    /// An empty book; captions render without text until fonts are loaded.
    pub fn new() -> Self {
        Self {
            db: fontdb::Database::new(),
            resolved: HashMap::new(),
        }
    }

    /// A book preloaded with the fonts installed on this system.
    pub fn with_system_fonts() -> Self {
        let mut book = Self::new();
        book.db.load_system_fonts();
        tracing::debug!(faces = book.db.len(), "loaded system fonts");
        book
    }

    /// Add the faces of a font file.
    pub fn load_font_file(&mut self, path: &Path) -> CaptionResult<()> {
        let before = self.db.len();
        self.db.load_font_file(path).map_err(|e| {
            CaptionError::validation(format!("failed to load font '{}': {e}", path.display()))
        })?;
        if self.db.len() == before {
            return Err(CaptionError::validation(format!(
                "no font faces found in '{}'",
                path.display()
            )));
        }
        self.resolved.clear();
        Ok(())
    }

    /// Add the faces contained in `bytes`.
    pub fn load_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
        self.resolved.clear();
    }

    /// Number of loaded faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Sorted, deduplicated family names of every loaded face.
    pub fn families(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .db
            .faces()
            .filter_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Resolve a font stack to a face. `None` only when no face is loaded at all.
    pub fn resolve(&mut self, stack: &str) -> Option<Arc<FontFace>> {
        if let Some(hit) = self.resolved.get(stack) {
            return hit.clone();
        }

        let id = parse_stack(stack)
            .iter()
            .find_map(|name| self.query(name))
            .or_else(|| self.db.faces().next().map(|face| face.id));
        let face = id.and_then(|id| self.load_face(id)).map(Arc::new);
        match &face {
            Some(face) => tracing::debug!(stack, family = %face.family, "resolved font stack"),
            None => tracing::warn!(stack, "no font faces loaded; captions render without text"),
        }
        self.resolved.insert(stack.to_string(), face.clone());
        face
    }

    fn query(&self, name: &str) -> Option<fontdb::ID> {
        let family = match name.to_ascii_lowercase().as_str() {
            "serif" => fontdb::Family::Serif,
            "sans-serif" => fontdb::Family::SansSerif,
            "monospace" => fontdb::Family::Monospace,
            "cursive" => fontdb::Family::Cursive,
            "fantasy" => fontdb::Family::Fantasy,
            _ => fontdb::Family::Name(name),
        };
        let families = [family];
        let query = fontdb::Query {
            families: &families,
            ..Default::default()
        };
        self.db.query(&query)
    }

    fn load_face(&self, id: fontdb::ID) -> Option<FontFace> {
        let family = self
            .db
            .face(id)
            .and_then(|info| info.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_default();
        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;
        Some(FontFace {
            family,
            data: Arc::new(data),
            index,
        })
    }
}

/// Split a CSS-style font stack into trimmed, unquoted family names.
pub fn parse_stack(stack: &str) -> Vec<&str> {
    stack
        .split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|name| !name.is_empty())
        .collect()
}
