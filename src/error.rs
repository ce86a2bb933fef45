// src/error.rs

//! Error types for the typesetting pipeline.
//!
//! Every fallible public operation returns [`Result`], whose error side is
//! [`RenderError`]. Cache corruption has its own [`CacheError`] type because
//! it never reaches callers: the font library logs it and rebuilds the font
//! from its source directory instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that abort a render call.
///
/// A render that fails never hands back a partially composited image.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Neither a source directory nor a cache file exists for the font.
    #[error("font '{name}' not found (looked in {root})")]
    FontNotFound { name: String, root: PathBuf },

    /// A symbol key in the input has no glyph in the active font.
    #[error("unknown symbol {key:?} at line {line}, column {column} (font '{font}')")]
    UnknownSymbol {
        key: String,
        font: String,
        line: usize,
        column: usize,
    },

    /// The typeface configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// A settings file is not valid JSON for [`crate::config::Settings`].
    #[error("invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A glyph file exists but could not be decoded as an image.
    #[error("failed to decode glyph {path}: {source}")]
    GlyphDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Filesystem failure while reading glyphs or writing cache/output files.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output image could not be encoded.
    #[error("failed to encode image to {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl RenderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A typeface option outside its accepted range.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("`font` must not be empty")]
    EmptyFontName,

    #[error("`{field}` = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("`hw_ratio` must be a finite number, got {0}")]
    NonFiniteRatio(f32),
}

/// Reasons a persisted font cache file cannot be used.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache file undecodable: {0}")]
    Decode(#[from] bincode::Error),

    #[error("not a glyph cache file")]
    BadMagic,

    #[error("cache format version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("cache holds font '{found}', expected '{expected}'")]
    NameMismatch { found: String, expected: String },
}
