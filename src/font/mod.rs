// src/font/mod.rs

//! Bitmap fonts: named sets of pre-drawn glyphs.
//!
//! - [`store`] reads glyph images from a font's source directory.
//! - [`persist`] encodes a font into its compressed on-disk cache file.
//! - [`library`] is the process-wide font cache tying the two together.

pub mod library;
pub mod persist;
pub mod store;

pub use library::{FontLibrary, LibraryStats};
pub use store::{DirectoryStore, GlyphStore, MemoryStore};

use crate::glyph::Glyph;
use std::collections::BTreeMap;

/// Suffix of the glyph drawn above a symbol's body (e.g. a diacritic).
pub const UPPER_SUFFIX: &str = "_upper";
/// Suffix of the glyph drawn below a symbol's body.
pub const LOWER_SUFFIX: &str = "_lower";

/// A named, immutable mapping from symbol key to glyph.
///
/// Built once per process per name and shared read-only by every render
/// that uses it.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    name: String,
    glyphs: BTreeMap<String, Glyph>,
    em_height: u32,
}

impl Font {
    pub fn new(name: impl Into<String>, glyphs: BTreeMap<String, Glyph>) -> Self {
        let em_height = glyphs
            .iter()
            .filter(|(key, _)| !is_annotation_key(key))
            .map(|(_, glyph)| glyph.height())
            .max()
            .unwrap_or(0);
        Font {
            name: name.into(),
            glyphs,
            em_height,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Body glyph for `key`.
    pub fn glyph(&self, key: &str) -> Option<&Glyph> {
        self.glyphs.get(key)
    }

    /// Optional `(upper, lower)` annotation glyphs for `key`.
    ///
    /// Missing annotations are simply `None`.
    pub fn annotations(&self, key: &str) -> (Option<&Glyph>, Option<&Glyph>) {
        let upper = self.glyphs.get(&format!("{key}{UPPER_SUFFIX}"));
        let lower = self.glyphs.get(&format!("{key}{LOWER_SUFFIX}"));
        (upper, lower)
    }

    /// Height of the tallest body glyph; the reference for the size effect.
    pub fn em_height(&self) -> u32 {
        self.em_height
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub(crate) fn glyphs(&self) -> &BTreeMap<String, Glyph> {
        &self.glyphs
    }
}

pub(crate) fn is_annotation_key(key: &str) -> bool {
    (key.len() > UPPER_SUFFIX.len() && key.ends_with(UPPER_SUFFIX))
        || (key.len() > LOWER_SUFFIX.len() && key.ends_with(LOWER_SUFFIX))
}

/// Font names map onto directory and file names, so they may not contain
/// path separators or be `.`/`..`.
pub(crate) fn is_valid_font_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
