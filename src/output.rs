// src/output.rs

//! Rendered images and where they get saved.

use crate::error::{RenderError, Result};
use image::{DynamicImage, ImageFormat};
use log::info;
use std::path::{Path, PathBuf};

/// File name used when the text gives nothing better.
pub const FALLBACK_FILE_NAME: &str = "text.png";

const MAX_STEM_CHARS: usize = 64;

/// The finished raster of one render call.
///
/// Grayscale (`Luma8`) unless a color was requested, in which case it is
/// `Rgba8` with the ink as alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    image: DynamicImage,
}

impl RenderedImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Saves as PNG, creating parent directories as needed.
    ///
    /// `.png` is appended when `path` has no extension. Returns the path
    /// actually written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let mut path = path.as_ref().to_path_buf();
        if path.extension().is_none() {
            path.set_extension("png");
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RenderError::io(parent, e))?;
        }
        self.image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| match e {
                image::ImageError::IoError(source) => RenderError::io(&path, source),
                source => RenderError::Encode {
                    path: path.clone(),
                    source,
                },
            })?;
        info!(
            "saved {}x{} image to {}",
            self.width(),
            self.height(),
            path.display()
        );
        Ok(path)
    }
}

/// Derives a file name from the first non-blank line of `text`.
///
/// Path separators and control characters become `_` and the stem is cut
/// to 64 characters.
pub fn default_file_name(text: &str) -> String {
    let Some(line) = text.lines().map(str::trim).find(|line| !line.is_empty()) else {
        return FALLBACK_FILE_NAME.to_string();
    };
    let stem: String = line
        .chars()
        .take(MAX_STEM_CHARS)
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim_end();
    // A stem of dots would name the directory itself or its parent.
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        return FALLBACK_FILE_NAME.to_string();
    }
    format!("{stem}.png")
}

/// `output_dir` joined with [`default_file_name`].
pub fn default_output_path(output_dir: &Path, text: &str) -> PathBuf {
    output_dir.join(default_file_name(text))
}
