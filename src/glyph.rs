// src/glyph.rs

//! Defines `Glyph`, the grayscale bitmap drawn for one symbol.
//!
//! Pixel values are ink coverage: 0 is blank background, 255 is full ink.
//! Glyphs are immutable once loaded and are owned by their `Font`.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single-channel bitmap, stored row-major.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Glyph {
    /// Builds a glyph from raw row-major pixels.
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Glyph {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Coverage at `(x, y)`. Callers stay within bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }
}

impl From<GrayImage> for Glyph {
    fn from(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Glyph {
            width,
            height,
            pixels: image.into_raw(),
        }
    }
}

// Pixel buffers are large; print dimensions only.
impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glyph")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
