// src/compositor.rs

//! Paints a laid-out [`Text`] onto a grayscale canvas.
//!
//! The canvas is exactly `text.width() x text.height()` and starts blank
//! (0). Symbols are placed by walking lines top to bottom and symbols left
//! to right, advancing the cursors by the same `width()`/`height()` values
//! the layout summed, so the walk always ends on the canvas edges.
//!
//! Negative spacing can make neighbours overlap or push a glyph past the
//! border. Overlapping ink keeps the brighter value, and anything outside
//! the canvas is dropped.

use crate::glyph::Glyph;
use crate::layout::Text;
use image::GrayImage;
use log::debug;

/// Where one glyph lands on the canvas. Coordinates may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<'f> {
    pub glyph: &'f Glyph,
    pub x: i64,
    pub y: i64,
}

/// Cursor position reached after walking the whole text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

/// Walks `text` and reports every glyph placement, upper annotation first,
/// then body, then lower annotation.
///
/// Returns the extent the walk covered, which matches
/// `(text.width(), text.height())`.
pub fn walk<'f>(text: &Text<'f>, mut place: impl FnMut(Placement<'f>)) -> Extent {
    let text_left = text.margin.left as i64;
    let mut y = text.margin.vertical as i64;
    let mut widest = 0i64;

    for line in &text.lines {
        let top = y + line.margin.vertical as i64;
        let mut x = text_left + line.margin.left as i64;
        for symbol in &line.symbols {
            let glyph_x = x + symbol.margin.left as i64;
            let mut glyph_y = top + symbol.margin.vertical as i64;
            for glyph in symbol.stack() {
                place(Placement {
                    glyph,
                    x: glyph_x,
                    y: glyph_y,
                });
                glyph_y += glyph.height() as i64;
            }
            x += symbol.width() as i64;
        }
        let line_end = x + line.margin.right as i64;
        widest = widest.max((line_end - text_left).max(0));
        y += line.height() as i64;
    }

    Extent {
        width: to_px(text_left + widest + text.margin.right as i64),
        height: to_px(y + text.margin.vertical as i64),
    }
}

/// Renders `text` into a new canvas.
pub fn composite(text: &Text<'_>) -> GrayImage {
    let mut canvas = GrayImage::new(text.width(), text.height());
    let mut painted = 0usize;
    let extent = walk(text, |p| {
        paint(&mut canvas, p.glyph, p.x, p.y);
        painted += 1;
    });
    debug_assert_eq!(
        (extent.width, extent.height),
        canvas.dimensions(),
        "compositor walk disagrees with layout totals"
    );
    debug!(
        "composite: {} glyphs on a {}x{} canvas",
        painted,
        canvas.width(),
        canvas.height()
    );
    canvas
}

/// Draws `glyph` with its top-left corner at `(x, y)`, keeping the brighter
/// of canvas and glyph per pixel.
fn paint(canvas: &mut GrayImage, glyph: &Glyph, x: i64, y: i64) {
    let (canvas_w, canvas_h) = (canvas.width() as i64, canvas.height() as i64);
    let (left, right) = (x.max(0), (x + glyph.width() as i64).min(canvas_w));
    if left >= right {
        return;
    }
    for gy in 0..glyph.height() {
        let cy = y + gy as i64;
        if cy < 0 || cy >= canvas_h {
            continue;
        }
        let row = glyph.row(gy);
        for cx in left..right {
            let pixel = canvas.get_pixel_mut(cx as u32, cy as u32);
            pixel.0[0] = pixel.0[0].max(row[(cx - x) as usize]);
        }
    }
}

fn to_px(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}
