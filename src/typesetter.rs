// src/typesetter.rs

//! The render call: text plus typeface in, image out.
//!
//! `Typesetter::render` runs the whole chain synchronously on the calling
//! thread (validate, tokenize, fetch font, layout, composite, effects).
//! Any failure aborts the call before an image exists, so callers never see
//! a partial render. A `Typesetter` is cheap to clone and can be shared
//! across threads; clones share one [`FontLibrary`].

use crate::compositor::composite;
use crate::config::{Settings, Typeface};
use crate::effects;
use crate::error::Result;
use crate::font::FontLibrary;
use crate::layout::{layout, Spacing};
use crate::output::RenderedImage;
use crate::tokenizer::tokenize;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Typesetter {
    library: Arc<FontLibrary>,
}

impl Typesetter {
    pub fn new(library: Arc<FontLibrary>) -> Self {
        Self { library }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(Arc::new(FontLibrary::from_settings(settings)))
    }

    pub fn library(&self) -> &Arc<FontLibrary> {
        &self.library
    }

    /// Renders `text` with `typeface`.
    pub fn render(&self, text: &str, typeface: &Typeface) -> Result<RenderedImage> {
        let started = Instant::now();
        typeface.validate()?;

        let lines = tokenize(text, typeface.raw_input);
        let font = self.library.get(&typeface.font)?;
        let tree = layout(&lines, &font, Spacing::from(typeface))?;
        debug!(
            "Typesetter: {} lines, {} symbols, layout {}x{}",
            tree.lines.len(),
            tree.symbol_count(),
            tree.width(),
            tree.height()
        );

        let canvas = composite(&tree);
        let image = RenderedImage::new(effects::apply(canvas, typeface, font.em_height()));
        info!(
            "Typesetter: rendered {} symbols in '{}' as {}x{} ({:?})",
            tree.symbol_count(),
            font.name(),
            image.width(),
            image.height(),
            started.elapsed()
        );
        Ok(image)
    }
}
