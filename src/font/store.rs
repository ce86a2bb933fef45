// src/font/store.rs

//! Glyph sources.
//!
//! The `GlyphStore` trait is the I/O leaf of the pipeline: it enumerates a
//! font's glyphs and decodes them. `DirectoryStore` reads one image file per
//! glyph from `<root>/<font name>/`; `MemoryStore` serves fonts assembled in
//! memory and counts its loads, which is what the tests and embedders use.

use super::{is_valid_font_name, LOWER_SUFFIX, UPPER_SUFFIX};
use crate::error::{RenderError, Result};
use crate::glyph::Glyph;
use image::ImageFormat;
use log::{debug, trace, warn};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A source of glyph sets, keyed by font name.
pub trait GlyphStore: Send + Sync {
    /// Loads every glyph of font `name`.
    ///
    /// Returns `Ok(None)` when the store has no font by that name.
    fn load_font(&self, name: &str) -> Result<Option<BTreeMap<String, Glyph>>>;

    /// Names of the fonts this store can load, sorted.
    fn font_names(&self) -> Result<Vec<String>>;

    /// Where the store looks, for error messages.
    fn root(&self) -> &Path;
}

// Shared stores, so a caller can keep a handle on the store it hands over.
impl<S: GlyphStore + ?Sized> GlyphStore for Arc<S> {
    fn load_font(&self, name: &str) -> Result<Option<BTreeMap<String, Glyph>>> {
        (**self).load_font(name)
    }

    fn font_names(&self) -> Result<Vec<String>> {
        (**self).font_names()
    }

    fn root(&self) -> &Path {
        (**self).root()
    }
}

// --- DirectoryStore ---

/// Reads fonts from `<root>/<name>/`, one image file per glyph.
///
/// The file stem is the symbol key. A stem of the form `U+XXXX` names the
/// character with that code point, so keys such as a space or `/` can be
/// stored. Annotation files append `_upper`/`_lower` to either form.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl GlyphStore for DirectoryStore {
    fn load_font(&self, name: &str) -> Result<Option<BTreeMap<String, Glyph>>> {
        if !is_valid_font_name(name) {
            return Ok(None);
        }
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Ok(None);
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| RenderError::io(&dir, e))? {
            let entry = entry.map_err(|e| RenderError::io(&dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| RenderError::io(&path, e))?;
            if !file_type.is_file() || is_hidden(&path) {
                continue;
            }
            if ImageFormat::from_path(&path).is_err() {
                debug!("DirectoryStore: skipping non-image file {}", path.display());
                continue;
            }
            paths.push(path);
        }
        // read_dir order is platform dependent.
        paths.sort();

        let mut glyphs = BTreeMap::new();
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!("DirectoryStore: skipping non UTF-8 file name {}", path.display());
                continue;
            };
            let key = decode_stem(stem);
            let glyph = load_glyph(&path)?;
            trace!(
                "DirectoryStore: '{}' -> {:?} ({}x{})",
                name,
                key,
                glyph.width(),
                glyph.height()
            );
            if glyphs.insert(key.clone(), glyph).is_some() {
                warn!(
                    "DirectoryStore: font '{}' has several files for {:?}; using {}",
                    name,
                    key,
                    path.display()
                );
            }
        }
        debug!("DirectoryStore: loaded {} glyphs for '{}'", glyphs.len(), name);
        Ok(Some(glyphs))
    }

    fn font_names(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(|e| RenderError::io(&self.root, e))? {
            let entry = entry.map_err(|e| RenderError::io(&self.root, e))?;
            let path = entry.path();
            if !path.is_dir() || is_hidden(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/// Loads a single glyph image, decoded as 8-bit grayscale.
pub fn load_glyph(path: &Path) -> Result<Glyph> {
    let image = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(source) => RenderError::io(path, source),
        source => RenderError::GlyphDecode {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(Glyph::from(image.to_luma8()))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.starts_with('.'))
}

/// Turns a file stem into a symbol key, expanding `U+XXXX` escapes.
fn decode_stem(stem: &str) -> String {
    for suffix in [UPPER_SUFFIX, LOWER_SUFFIX] {
        if let Some(base) = stem.strip_suffix(suffix) {
            if !base.is_empty() {
                return format!("{}{}", decode_code_point(base), suffix);
            }
        }
    }
    decode_code_point(stem)
}

fn decode_code_point(stem: &str) -> String {
    let escaped = stem
        .strip_prefix("U+")
        .filter(|hex| (4..=6).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .and_then(char::from_u32);
    match escaped {
        Some(c) => c.to_string(),
        None => stem.to_string(),
    }
}

// --- MemoryStore ---

/// Serves fonts held in memory.
///
/// `loads()` counts calls to `load_font` that found a font, which lets
/// callers observe whether the library went back to the source.
#[derive(Debug, Default)]
pub struct MemoryStore {
    fonts: Mutex<HashMap<String, BTreeMap<String, Glyph>>>,
    loads: AtomicUsize,
    root: PathBuf,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("<memory>"),
            ..Self::default()
        }
    }

    pub fn insert(&self, name: impl Into<String>, glyphs: BTreeMap<String, Glyph>) {
        self.fonts.lock().insert(name.into(), glyphs);
    }

    pub fn remove(&self, name: &str) {
        self.fonts.lock().remove(name);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl GlyphStore for MemoryStore {
    fn load_font(&self, name: &str) -> Result<Option<BTreeMap<String, Glyph>>> {
        let glyphs = self.fonts.lock().get(name).cloned();
        if glyphs.is_some() {
            self.loads.fetch_add(1, Ordering::SeqCst);
        }
        Ok(glyphs)
    }

    fn font_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.fonts.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
