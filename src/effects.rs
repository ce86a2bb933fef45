// src/effects.rs

//! Raster effects applied to a composited canvas.
//!
//! The stages run in a fixed order, each a pure function of the pixel buffer
//! it receives and one option:
//!
//! 1. size: uniform scale so the font's em height becomes `size` pixels
//! 2. clarity: grey-level dilation (bolder) or erosion (thinner)
//! 3. italic: 15° horizontal shear, growing the canvas to the right
//! 4. hw_ratio: vertical stretch
//! 5. color: intensity becomes the alpha of a solid color
//!
//! A typeface with no size, zero clarity, no italic, a ratio of 1.0 and no
//! color passes the canvas through untouched.
//!
//! Clarity and italic work row by row on `rayon`'s pool. No output pixel
//! depends on another output pixel, so the result does not depend on
//! scheduling.

use crate::color::Rgb;
use crate::config::Typeface;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgba, RgbaImage};
use log::debug;
use rayon::prelude::*;

/// Shear angle of the italic stage, in degrees from vertical.
pub const ITALIC_ANGLE_DEG: f32 = 15.0;

/// Runs every stage enabled by `typeface`.
///
/// `em_height` is the height of the font's tallest body glyph; the size
/// stage scales relative to it.
pub fn apply(canvas: GrayImage, typeface: &Typeface, em_height: u32) -> DynamicImage {
    let mut image = canvas;
    if let Some(size) = typeface.size {
        image = scale_to_size(image, size, em_height);
    }
    image = clarity(image, typeface.clarity);
    if typeface.italic {
        image = italic(image);
    }
    image = stretch(image, typeface.hw_ratio);
    match typeface.color {
        Some(color) => DynamicImage::ImageRgba8(colorize(&image, color)),
        None => DynamicImage::ImageLuma8(image),
    }
}

/// Scales uniformly by `size / em_height`.
pub fn scale_to_size(image: GrayImage, size: u32, em_height: u32) -> GrayImage {
    if em_height == 0 || size == em_height || is_empty(&image) {
        return image;
    }
    let factor = size as f64 / em_height as f64;
    let width = scaled(image.width(), factor);
    let height = scaled(image.height(), factor);
    debug!(
        "effects: size {}x{} -> {}x{} (x{:.3})",
        image.width(),
        image.height(),
        width,
        height,
        factor
    );
    imageops::resize(&image, width, height, FilterType::Triangle)
}

/// Applies `|amount|` passes of a 3x3 cross-shaped grey-level dilation
/// (positive) or erosion (negative).
///
/// Neighbours outside the image are ignored rather than treated as
/// background, so erosion does not eat ink touching the border.
pub fn clarity(image: GrayImage, amount: i32) -> GrayImage {
    if amount == 0 || is_empty(&image) {
        return image;
    }
    let combine: fn(u8, u8) -> u8 = if amount > 0 { u8::max } else { u8::min };
    debug!(
        "effects: clarity {} ({} passes)",
        amount,
        amount.unsigned_abs()
    );
    (0..amount.unsigned_abs()).fold(image, |image, _| morph_pass(&image, combine))
}

fn morph_pass(src: &GrayImage, combine: fn(u8, u8) -> u8) -> GrayImage {
    let (width, height) = (src.width() as usize, src.height() as usize);
    let pixels: &[u8] = src;
    let mut out = src.clone();
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let at = |x: usize, y: usize| pixels[y * width + x];
        for (x, value) in row.iter_mut().enumerate() {
            let mut v = at(x, y);
            if x > 0 {
                v = combine(v, at(x - 1, y));
            }
            if x + 1 < width {
                v = combine(v, at(x + 1, y));
            }
            if y > 0 {
                v = combine(v, at(x, y - 1));
            }
            if y + 1 < height {
                v = combine(v, at(x, y + 1));
            }
            *value = v;
        }
    });
    out
}

/// Shears the image so its top leans right by [`ITALIC_ANGLE_DEG`].
///
/// The bottom row stays put and row `y` moves right by
/// `(h - 1 - y) * tan(angle)` pixels, blending the two nearest source
/// columns. The canvas widens so nothing is clipped.
pub fn italic(image: GrayImage) -> GrayImage {
    if is_empty(&image) {
        return image;
    }
    let tan = ITALIC_ANGLE_DEG.to_radians().tan();
    let (src_w, height) = (image.width() as usize, image.height());
    let extra = ((height - 1) as f32 * tan).ceil() as u32;
    let width = image.width() + extra;
    debug!("effects: italic shear widens canvas by {} px", extra);

    let mut out = GrayImage::new(width, height);
    out.par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let src = &image.as_raw()[y * src_w..(y + 1) * src_w];
            let shift = (height as usize - 1 - y) as f32 * tan;
            let whole = shift.floor() as usize;
            let frac = shift - whole as f32;
            let sample = |x: usize| -> f32 {
                x.checked_sub(whole)
                    .and_then(|sx| src.get(sx))
                    .map_or(0.0, |&v| v as f32)
            };
            for (x, value) in row.iter_mut().enumerate() {
                let near = sample(x);
                let far = x.checked_sub(1).map_or(0.0, &sample);
                *value = to_u8(near * (1.0 - frac) + far * frac);
            }
        });
    out
}

/// Scales the vertical axis by `ratio`, keeping the width.
pub fn stretch(image: GrayImage, ratio: f32) -> GrayImage {
    if ratio == 1.0 || is_empty(&image) {
        return image;
    }
    let height = scaled(image.height(), ratio as f64);
    if height == image.height() {
        return image;
    }
    debug!(
        "effects: hw_ratio {} -> height {} -> {}",
        ratio,
        image.height(),
        height
    );
    imageops::resize(&image, image.width(), height, FilterType::Triangle)
}

/// Paints `color` everywhere, with the grey intensity as alpha.
///
/// Background (0) becomes fully transparent.
pub fn colorize(image: &GrayImage, color: Rgb) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        Rgba([color.r, color.g, color.b, image.get_pixel(x, y).0[0]])
    })
}

fn is_empty(image: &GrayImage) -> bool {
    image.width() == 0 || image.height() == 0
}

fn scaled(length: u32, factor: f64) -> u32 {
    ((length as f64 * factor).round() as u32).max(1)
}

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
