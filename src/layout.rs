// src/layout.rs

//! Builds the Text → Line → Symbol tree for a tokenized input.
//!
//! Layout is purely computational: it borrows glyphs from an already loaded
//! [`Font`] and does no I/O. Every node carries a [`Margin`], and sizes are
//! computed bottom-up:
//!
//! ```text
//! symbol.width  = left + max(body, upper, lower widths) + right
//! symbol.height = 2·vertical + upper.h + body.h + lower.h
//! line.width    = left + Σ symbol.width + right
//! line.height   = 2·vertical + max symbol.height        (0 for an empty line)
//! text.width    = left + max line.width + right
//! text.height   = 2·vertical + Σ line.height
//! ```
//!
//! Spacing options may drive margins negative. Each size is clamped at zero,
//! and the compositor clips anything drawn outside the canvas.

use crate::config::Typeface;
use crate::error::{RenderError, Result};
use crate::font::Font;
use crate::glyph::Glyph;
use crate::tokenizer::SymbolKey;
use log::trace;

/// Space around a node: `vertical` applies above and below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margin {
    pub vertical: i32,
    pub left: i32,
    pub right: i32,
}

impl Margin {
    pub const fn new(vertical: i32, left: i32, right: i32) -> Self {
        Self {
            vertical,
            left,
            right,
        }
    }
}

pub const SYMBOL_MARGIN: Margin = Margin::new(0, 1, 1);
pub const LINE_MARGIN: Margin = Margin::new(2, 0, 0);
pub const TEXT_MARGIN: Margin = Margin::new(4, 4, 4);

/// Spacing deltas applied on top of the base margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spacing {
    /// Added to each symbol's right margin.
    pub symbol: i32,
    /// Added to each line's vertical margin.
    pub line: i32,
}

impl From<&Typeface> for Spacing {
    fn from(typeface: &Typeface) -> Self {
        Spacing {
            symbol: typeface.symbol_spacing,
            line: typeface.line_spacing,
        }
    }
}

fn clamp_px(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// One placed glyph with its optional annotations.
#[derive(Debug, Clone)]
pub struct Symbol<'f> {
    pub key: String,
    pub body: &'f Glyph,
    pub upper: Option<&'f Glyph>,
    pub lower: Option<&'f Glyph>,
    pub margin: Margin,
}

impl<'f> Symbol<'f> {
    /// The glyphs of this symbol from top to bottom.
    pub fn stack(&self) -> impl Iterator<Item = &'f Glyph> {
        self.upper
            .into_iter()
            .chain(std::iter::once(self.body))
            .chain(self.lower)
    }

    /// Width of the glyph stack, without margins.
    pub fn content_width(&self) -> u32 {
        self.stack().map(Glyph::width).max().unwrap_or(0)
    }

    /// Height of the glyph stack, without margins.
    pub fn content_height(&self) -> u32 {
        self.stack().map(Glyph::height).sum()
    }

    pub fn width(&self) -> u32 {
        clamp_px(
            self.margin.left as i64 + self.content_width() as i64 + self.margin.right as i64,
        )
    }

    pub fn height(&self) -> u32 {
        clamp_px(2 * self.margin.vertical as i64 + self.content_height() as i64)
    }
}

/// An ordered run of symbols.
#[derive(Debug, Clone)]
pub struct Line<'f> {
    pub symbols: Vec<Symbol<'f>>,
    pub margin: Margin,
}

impl Line<'_> {
    pub fn width(&self) -> u32 {
        let symbols: i64 = self.symbols.iter().map(|s| s.width() as i64).sum();
        clamp_px(self.margin.left as i64 + symbols + self.margin.right as i64)
    }

    pub fn height(&self) -> u32 {
        let tallest = self.symbols.iter().map(Symbol::height).max().unwrap_or(0);
        clamp_px(2 * self.margin.vertical as i64 + tallest as i64)
    }
}

/// The root of a laid-out text.
#[derive(Debug, Clone)]
pub struct Text<'f> {
    pub lines: Vec<Line<'f>>,
    pub margin: Margin,
}

impl Text<'_> {
    pub fn width(&self) -> u32 {
        let widest = self.lines.iter().map(Line::width).max().unwrap_or(0);
        clamp_px(self.margin.left as i64 + widest as i64 + self.margin.right as i64)
    }

    pub fn height(&self) -> u32 {
        let lines: i64 = self.lines.iter().map(|l| l.height() as i64).sum();
        clamp_px(2 * self.margin.vertical as i64 + lines)
    }

    pub fn symbol_count(&self) -> usize {
        self.lines.iter().map(|l| l.symbols.len()).sum()
    }
}

/// Resolves every symbol key against `font` and arranges the result.
///
/// Fails on the first key the font has no glyph for.
pub fn layout<'f>(lines: &[Vec<SymbolKey>], font: &'f Font, spacing: Spacing) -> Result<Text<'f>> {
    let symbol_margin = Margin {
        right: SYMBOL_MARGIN.right + spacing.symbol,
        ..SYMBOL_MARGIN
    };
    let line_margin = Margin {
        vertical: LINE_MARGIN.vertical + spacing.line,
        ..LINE_MARGIN
    };

    let mut text = Text {
        lines: Vec::with_capacity(lines.len()),
        margin: TEXT_MARGIN,
    };
    for keys in lines {
        let mut line = Line {
            symbols: Vec::with_capacity(keys.len()),
            margin: line_margin,
        };
        for key in keys {
            let body = font.glyph(&key.text).ok_or_else(|| RenderError::UnknownSymbol {
                key: key.text.clone(),
                font: font.name().to_string(),
                line: key.line,
                column: key.column,
            })?;
            let (upper, lower) = font.annotations(&key.text);
            line.symbols.push(Symbol {
                key: key.text.clone(),
                body,
                upper,
                lower,
                margin: symbol_margin,
            });
        }
        trace!(
            "layout: line {} -> {} symbols, {}x{}",
            text.lines.len() + 1,
            line.symbols.len(),
            line.width(),
            line.height()
        );
        text.lines.push(line);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use std::collections::BTreeMap;
    use test_log::test;

    fn glyph(width: u32, height: u32) -> Glyph {
        Glyph::from_raw(width, height, vec![255; (width * height) as usize]).unwrap()
    }

    fn font() -> Font {
        let mut glyphs = BTreeMap::new();
        glyphs.insert("A".to_string(), glyph(6, 10));
        glyphs.insert("B".to_string(), glyph(8, 10));
        glyphs.insert("e".to_string(), glyph(5, 6));
        glyphs.insert("e_upper".to_string(), glyph(3, 2));
        glyphs.insert("e_lower".to_string(), glyph(7, 1));
        Font::new("test", glyphs)
    }

    #[test]
    fn sizes_are_computed_bottom_up() {
        let font = font();
        let text = layout(&tokenize("A B", false), &font, Spacing::default()).unwrap();
        let line = &text.lines[0];

        // 1 + 6 + 1 and 1 + 8 + 1
        assert_eq!(line.symbols[0].width(), 8);
        assert_eq!(line.symbols[1].width(), 10);
        assert_eq!(line.width(), 18);
        assert_eq!(line.height(), 2 * 2 + 10);
        assert_eq!(text.width(), 4 + 18 + 4);
        assert_eq!(text.height(), 2 * 4 + 14);
    }

    #[test]
    fn blank_line_contributes_only_its_margin() {
        let font = font();
        let text = layout(&tokenize("A\n\nB", false), &font, Spacing::default()).unwrap();
        assert_eq!(text.lines.len(), 3);
        assert!(text.lines[1].symbols.is_empty());
        assert_eq!(text.lines[1].height(), 4);
        // margins: text 4 top + 4 bottom; lines (2+10+2) + (2+0+2) + (2+10+2)
        assert_eq!(text.height(), 8 + 14 + 4 + 14);
    }

    #[test]
    fn annotations_extend_the_symbol() {
        let font = font();
        let text = layout(&tokenize("e", false), &font, Spacing::default()).unwrap();
        let symbol = &text.lines[0].symbols[0];
        assert!(symbol.upper.is_some() && symbol.lower.is_some());
        assert_eq!(symbol.content_width(), 7);
        assert_eq!(symbol.content_height(), 2 + 6 + 1);
    }

    #[test]
    fn spacing_adjusts_margins() {
        let font = font();
        let spacing = Spacing { symbol: 3, line: -1 };
        let text = layout(&tokenize("A", false), &font, spacing).unwrap();
        assert_eq!(text.lines[0].symbols[0].margin, Margin::new(0, 1, 4));
        assert_eq!(text.lines[0].margin, Margin::new(1, 0, 0));
        assert_eq!(text.lines[0].width(), 1 + 6 + 4);
    }

    #[test]
    fn strongly_negative_spacing_clamps_at_zero() {
        let font = font();
        let spacing = Spacing { symbol: -20, line: -20 };
        let text = layout(&tokenize("A B", false), &font, spacing).unwrap();
        assert_eq!(text.lines[0].symbols[0].width(), 0);
        assert_eq!(text.lines[0].height(), 0);
        assert_eq!(text.height(), 8);
    }

    #[test]
    fn unknown_symbol_reports_position() {
        let font = font();
        let err = layout(&tokenize("A\nB Z", false), &font, Spacing::default()).unwrap_err();
        match err {
            RenderError::UnknownSymbol {
                key, line, column, ..
            } => {
                assert_eq!(key, "Z");
                assert_eq!((line, column), (2, 3));
            }
            other => panic!("expected UnknownSymbol, got {other:?}"),
        }
    }

    #[test]
    fn annotation_keys_are_not_required() {
        let font = font();
        let text = layout(&tokenize("A", false), &font, Spacing::default()).unwrap();
        let symbol = &text.lines[0].symbols[0];
        assert!(symbol.upper.is_none() && symbol.lower.is_none());
    }
}
