// src/config.rs

//! Configuration structures for `typecaster`.
//!
//! Two layers live here:
//!
//! - [`Typeface`]: the per-render options (font, size, clarity, italic,
//!   color, spacing, height/width ratio, raw input). A render call takes one
//!   complete `Typeface` and validates it before touching any font data.
//! - [`Settings`]: application-level paths (fonts, cache, output) plus the
//!   default `Typeface`, deserialized from a JSON file.
//!
//! Both derive `Deserialize` with `#[serde(default)]`, so a settings file
//! only needs the fields it wants to change.

use crate::color::Rgb;
use crate::error::{ConfigError, RenderError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_FONT: &str = "sculpture";

pub const SIZE_RANGE: (u32, u32) = (1, 1024);
pub const CLARITY_RANGE: (i32, i32) = (-10, 10);
pub const SPACING_RANGE: (i32, i32) = (-32, 32);
pub const HW_RATIO_RANGE: (f32, f32) = (0.25, 4.0);

// --- Typeface ---

/// The complete set of options for one render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typeface {
    /// Font name: a directory under the fonts root, or a cached font.
    pub font: String,
    /// Target glyph height in pixels. `None` keeps the font's native size.
    pub size: Option<u32>,
    /// Stroke weight: negative thins strokes, positive bolds them.
    pub clarity: i32,
    /// Applies a fixed 15° shear.
    pub italic: bool,
    /// Foreground color. `None` keeps the grayscale output.
    pub color: Option<Rgb>,
    /// Extra horizontal gap between symbols, in glyph pixels.
    #[serde(alias = "char_spacing")]
    pub symbol_spacing: i32,
    /// Extra vertical gap around each line, in glyph pixels.
    pub line_spacing: i32,
    /// Height-to-width stretch factor applied to the final image.
    pub hw_ratio: f32,
    /// Treat every character (spaces included) as its own symbol instead of
    /// splitting lines into whitespace-delimited tokens.
    pub raw_input: bool,
}

impl Default for Typeface {
    fn default() -> Self {
        Typeface {
            font: DEFAULT_FONT.to_string(),
            size: None,
            clarity: 0,
            italic: false,
            color: None,
            symbol_spacing: 0,
            line_spacing: 0,
            hw_ratio: 1.0,
            raw_input: false,
        }
    }
}

impl Typeface {
    /// Checks every option against its accepted range.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.font.trim().is_empty() {
            return Err(ConfigError::EmptyFontName);
        }
        if let Some(size) = self.size {
            check_range("size", size, SIZE_RANGE)?;
        }
        check_range("clarity", self.clarity, CLARITY_RANGE)?;
        check_range("symbol_spacing", self.symbol_spacing, SPACING_RANGE)?;
        check_range("line_spacing", self.line_spacing, SPACING_RANGE)?;
        if !self.hw_ratio.is_finite() {
            return Err(ConfigError::NonFiniteRatio(self.hw_ratio));
        }
        check_range("hw_ratio", self.hw_ratio, HW_RATIO_RANGE)?;
        Ok(())
    }

    /// True when the effects pipeline leaves the composited canvas untouched
    /// apart from sizing.
    pub fn is_plain(&self) -> bool {
        self.clarity == 0 && !self.italic && self.hw_ratio == 1.0 && self.color.is_none()
    }
}

fn check_range<T>(field: &'static str, value: T, (min, max): (T, T)) -> std::result::Result<(), ConfigError>
where
    T: PartialOrd + ToString,
{
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

// --- Application settings ---

/// Application-level settings: where fonts, caches and output images live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root holding one directory of glyph images per font.
    pub fonts_dir: PathBuf,
    /// Directory for compressed glyph caches. Defaults to `fonts_dir`.
    pub cache_dir: Option<PathBuf>,
    /// Default directory for saved images.
    pub output_dir: PathBuf,
    /// Typeface used when the caller does not override an option.
    pub typeface: Typeface,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            fonts_dir: PathBuf::from("fonts"),
            cache_dir: None,
            output_dir: PathBuf::from("out"),
            typeface: Typeface::default(),
        }
    }
}

impl Settings {
    /// Reads settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| RenderError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| RenderError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        self.cache_dir.as_deref().unwrap_or(&self.fonts_dir)
    }
}
