//! Fixture fonts for integration tests.
//!
//! Each fixture is a fresh temporary directory laid out like a real fonts
//! root: `<root>/<font>/<key>.png`, one grayscale image per glyph.

use image::{GrayImage, Luma};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const FONT: &str = "blocks";

/// A temporary fonts root with one font, [`FONT`], containing:
///
/// - `A`: 6x10, solid ink
/// - `B`: 8x10, ink on the left half only
/// - ` ` (stored as `U+0020.png`): 4x10, blank
/// - `e`: 5x6 with a 3x2 `e_upper` and a 5x1 `e_lower`
pub struct FixtureFonts {
    dir: TempDir,
    cache: TempDir,
}

impl FixtureFonts {
    pub fn new() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().unwrap(),
            cache: tempfile::tempdir().unwrap(),
        };
        let font = fixture.font_dir(FONT);
        std::fs::create_dir_all(&font).unwrap();

        solid(6, 10, 255).save(font.join("A.png")).unwrap();
        GrayImage::from_fn(8, 10, |x, _| Luma([if x < 4 { 255 } else { 0 }]))
            .save(font.join("B.png"))
            .unwrap();
        solid(4, 10, 0).save(font.join("U+0020.png")).unwrap();
        solid(5, 6, 200).save(font.join("e.png")).unwrap();
        solid(3, 2, 120).save(font.join("e_upper.png")).unwrap();
        solid(5, 1, 90).save(font.join("e_lower.png")).unwrap();
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[allow(dead_code)]
    pub fn font_dir(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// An empty cache directory, separate from the fonts root.
    pub fn cache_dir(&self) -> &Path {
        self.cache.path()
    }
}

fn solid(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}
