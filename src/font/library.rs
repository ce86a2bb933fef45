// src/font/library.rs

//! The process-wide font cache.
//!
//! `FontLibrary::get` resolves a font name in three steps:
//!
//! 1. The in-memory slot for that name, if it has been filled.
//! 2. The compressed cache file in the cache directory. A corrupt or
//!    version-mismatched file is logged and ignored.
//! 3. The glyph store (a directory of glyph images). The freshly built font
//!    is written to the cache file before `get` returns, so later processes
//!    skip the directory scan.
//!
//! Each name has its own slot (`OnceCell`). The first caller for a name runs
//! steps 2-3 inside the slot's initializer; concurrent callers for the same
//! name block on it, callers for other names do not. A failed load leaves
//! the slot empty so the next call retries. Fonts are never evicted.
//!
//! Every build of a name, from `get` or `rebuild`, also holds that name's
//! build lock, so one library never scans and persists the same font twice
//! at once.

use super::persist;
use super::store::{DirectoryStore, GlyphStore};
use super::{is_valid_font_name, Font};
use crate::config::Settings;
use crate::error::{RenderError, Result};
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

type Slot = Arc<OnceCell<Arc<Font>>>;

#[derive(Default)]
struct Entry {
    /// Held while the font is read and persisted.
    build: Mutex<()>,
    /// Replaced wholesale by `rebuild`.
    slot: Mutex<Slot>,
}

impl Entry {
    fn slot(&self) -> Slot {
        self.slot.lock().clone()
    }

    fn is_resident(&self) -> bool {
        self.slot.lock().get().is_some()
    }
}

/// Counters describing where fonts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LibraryStats {
    /// Fonts built by reading the glyph store.
    pub source_builds: usize,
    /// Fonts restored from a cache file.
    pub cache_loads: usize,
    /// Fonts currently held in memory.
    pub resident: usize,
}

/// Font cache shared by every render in the process.
pub struct FontLibrary {
    store: Box<dyn GlyphStore>,
    /// `None` disables the on-disk cache.
    cache_dir: Option<PathBuf>,
    entries: Mutex<HashMap<String, Arc<Entry>>>,
    source_builds: AtomicUsize,
    cache_loads: AtomicUsize,
}

impl FontLibrary {
    /// A library reading glyph directories under `fonts_dir` and keeping
    /// cache files in `cache_dir`.
    pub fn new(fonts_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self::with_store(DirectoryStore::new(fonts_dir), Some(cache_dir.into()))
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.fonts_dir, settings.cache_dir())
    }

    /// A library over any glyph store. Pass `None` to keep fonts in memory
    /// only.
    pub fn with_store(store: impl GlyphStore + 'static, cache_dir: Option<PathBuf>) -> Self {
        Self {
            store: Box::new(store),
            cache_dir,
            entries: Mutex::new(HashMap::new()),
            source_builds: AtomicUsize::new(0),
            cache_loads: AtomicUsize::new(0),
        }
    }

    /// Returns the font called `name`, loading it on first use.
    pub fn get(&self, name: &str) -> Result<Arc<Font>> {
        let entry = self.entry(name);
        entry
            .slot()
            .get_or_try_init(|| {
                let _build = entry.build.lock();
                self.load(name).map(Arc::new)
            })
            .map(Arc::clone)
    }

    /// Rebuilds `name` from the glyph store, overwriting its cache file and
    /// the in-memory copy.
    ///
    /// Cache files are never checked for staleness; this is how a changed
    /// font directory gets picked up.
    pub fn rebuild(&self, name: &str) -> Result<Arc<Font>> {
        let entry = self.entry(name);
        let _build = entry.build.lock();
        let font = Arc::new(self.build_from_store(name)?);
        *entry.slot.lock() = Arc::new(OnceCell::with_value(Arc::clone(&font)));
        Ok(font)
    }

    /// Names of every font the library can serve, from the store and from
    /// cache files, sorted and deduplicated.
    pub fn available_fonts(&self) -> Result<Vec<String>> {
        let mut names = self.store.font_names()?;
        if let Some(dir) = &self.cache_dir {
            names.extend(persist::cached_font_names(dir)?);
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// True if `name` is already held in memory.
    pub fn is_resident(&self, name: &str) -> bool {
        self.entries
            .lock()
            .get(name)
            .is_some_and(|entry| entry.is_resident())
    }

    pub fn stats(&self) -> LibraryStats {
        let resident = self
            .entries
            .lock()
            .values()
            .filter(|entry| entry.is_resident())
            .count();
        LibraryStats {
            source_builds: self.source_builds.load(Ordering::SeqCst),
            cache_loads: self.cache_loads.load(Ordering::SeqCst),
            resident,
        }
    }

    pub fn fonts_root(&self) -> &Path {
        self.store.root()
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    fn entry(&self, name: &str) -> Arc<Entry> {
        let mut entries = self.entries.lock();
        Arc::clone(entries.entry(name.to_string()).or_default())
    }

    fn load(&self, name: &str) -> Result<Font> {
        if !is_valid_font_name(name) {
            return Err(self.not_found(name));
        }

        if let Some(path) = self.cache_path(name) {
            let started = Instant::now();
            match persist::read(&path, name) {
                Ok(Some(font)) => {
                    self.cache_loads.fetch_add(1, Ordering::SeqCst);
                    info!(
                        "FontLibrary: loaded '{}' from cache ({} glyphs, {:?})",
                        name,
                        font.len(),
                        started.elapsed()
                    );
                    return Ok(font);
                }
                Ok(None) => debug!("FontLibrary: no cache file for '{}'", name),
                Err(e) => warn!(
                    "FontLibrary: cache file {} is unusable ({}); rebuilding '{}' from source",
                    path.display(),
                    e,
                    name
                ),
            }
        }

        self.build_from_store(name)
    }

    fn build_from_store(&self, name: &str) -> Result<Font> {
        let started = Instant::now();
        info!("FontLibrary: building '{}' from {}", name, self.store.root().display());
        let glyphs = self
            .store
            .load_font(name)?
            .ok_or_else(|| self.not_found(name))?;
        let font = Font::new(name, glyphs);
        if font.is_empty() {
            warn!("FontLibrary: font '{}' has no glyph images", name);
        }
        self.source_builds.fetch_add(1, Ordering::SeqCst);

        if let Some(path) = self.cache_path(name) {
            persist::write(&path, &font)?;
            debug!("FontLibrary: wrote cache file {}", path.display());
        }
        info!(
            "FontLibrary: built '{}' ({} glyphs, {:?})",
            name,
            font.len(),
            started.elapsed()
        );
        Ok(font)
    }

    fn cache_path(&self, name: &str) -> Option<PathBuf> {
        self.cache_dir
            .as_deref()
            .and_then(|dir| persist::cache_path(dir, name))
    }

    fn not_found(&self, name: &str) -> RenderError {
        RenderError::FontNotFound {
            name: name.to_string(),
            root: self.store.root().to_path_buf(),
        }
    }
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("root", &self.store.root())
            .field("cache_dir", &self.cache_dir)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::MemoryStore;
    use crate::glyph::Glyph;
    use std::collections::BTreeMap;
    use std::sync::Barrier;
    use test_log::test;

    fn glyphs() -> BTreeMap<String, Glyph> {
        let mut glyphs = BTreeMap::new();
        glyphs.insert("a".to_string(), Glyph::from_raw(2, 2, vec![255; 4]).unwrap());
        glyphs
    }

    fn shared_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.insert("mem", glyphs());
        store
    }

    #[test]
    fn memory_hit_does_not_reload() {
        let store = shared_store();
        let library = FontLibrary::with_store(Arc::clone(&store), None);

        let first = library.get("mem").unwrap();
        let second = library.get("mem").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.loads(), 1);
        assert!(library.is_resident("mem"));
        assert_eq!(library.stats().resident, 1);
    }

    #[test]
    fn missing_font_is_font_not_found_and_retries() {
        let store = shared_store();
        let library = FontLibrary::with_store(Arc::clone(&store), None);

        assert!(matches!(
            library.get("later"),
            Err(RenderError::FontNotFound { .. })
        ));
        assert!(!library.is_resident("later"));

        store.insert("later", glyphs());
        assert!(library.get("later").is_ok());
    }

    #[test]
    fn cache_file_serves_a_new_library() {
        let cache = tempfile::tempdir().unwrap();
        let store = shared_store();

        let first = FontLibrary::with_store(
            Arc::clone(&store),
            Some(cache.path().to_path_buf()),
        );
        first.get("mem").unwrap();
        assert_eq!(first.stats().source_builds, 1);
        assert!(cache.path().join("mem.glyphs.gz").is_file());

        let second = FontLibrary::with_store(
            Arc::clone(&store),
            Some(cache.path().to_path_buf()),
        );
        let font = second.get("mem").unwrap();
        assert_eq!(font.len(), 1);
        assert_eq!(second.stats().cache_loads, 1);
        assert_eq!(second.stats().source_builds, 0);
        assert_eq!(store.loads(), 1);
    }

    #[test]
    fn corrupt_cache_falls_back_to_source() {
        let cache = tempfile::tempdir().unwrap();
        std::fs::write(cache.path().join("mem.glyphs.gz"), b"garbage").unwrap();
        let store = shared_store();
        let library = FontLibrary::with_store(
            Arc::clone(&store),
            Some(cache.path().to_path_buf()),
        );

        let font = library.get("mem").unwrap();
        assert_eq!(font.len(), 1);
        assert_eq!(library.stats().source_builds, 1);
        // The rebuilt font replaced the corrupt file.
        assert!(persist::read(&cache.path().join("mem.glyphs.gz"), "mem")
            .unwrap()
            .is_some());
    }

    #[test]
    fn concurrent_first_use_builds_once() {
        let cache = tempfile::tempdir().unwrap();
        let store = shared_store();
        let library = Arc::new(FontLibrary::with_store(
            Arc::clone(&store),
            Some(cache.path().to_path_buf()),
        ));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let library = Arc::clone(&library);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    library.get("mem").unwrap()
                })
            })
            .collect();
        let fonts: Vec<Arc<Font>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(store.loads(), 1);
        assert_eq!(library.stats().source_builds, 1);
        assert!(fonts.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn concurrent_rebuilds_and_gets_share_one_cache_file() {
        let cache = tempfile::tempdir().unwrap();
        let store = shared_store();
        let library = FontLibrary::with_store(
            Arc::clone(&store),
            Some(cache.path().to_path_buf()),
        );
        let barrier = Barrier::new(8);

        std::thread::scope(|scope| {
            for i in 0..8 {
                let (library, barrier) = (&library, &barrier);
                scope.spawn(move || {
                    barrier.wait();
                    for _ in 0..10 {
                        if i % 2 == 0 {
                            library.rebuild("mem").unwrap();
                        } else {
                            library.get("mem").unwrap();
                        }
                    }
                });
            }
        });

        let path = cache.path().join("mem.glyphs.gz");
        assert_eq!(persist::read(&path, "mem").unwrap().unwrap().len(), 1);
        assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 1);
        assert!(library.is_resident("mem"));
    }

    #[test]
    fn rebuild_replaces_resident_font() {
        let store = shared_store();
        let library = FontLibrary::with_store(Arc::clone(&store), None);
        let before = library.get("mem").unwrap();

        let mut changed = glyphs();
        changed.insert("b".to_string(), Glyph::from_raw(1, 1, vec![9]).unwrap());
        store.insert("mem", changed);

        let rebuilt = library.rebuild("mem").unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(rebuilt.len(), 2);
        assert!(Arc::ptr_eq(&rebuilt, &library.get("mem").unwrap()));
    }

    #[test]
    fn available_fonts_merges_store_and_cache() {
        let cache = tempfile::tempdir().unwrap();
        let store = shared_store();
        let library = FontLibrary::with_store(
            Arc::clone(&store),
            Some(cache.path().to_path_buf()),
        );
        library.get("mem").unwrap();
        store.remove("mem");
        store.insert("other", glyphs());

        assert_eq!(
            library.available_fonts().unwrap(),
            vec!["mem".to_string(), "other".to_string()]
        );
    }
}
