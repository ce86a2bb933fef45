// src/lib.rs

//! `typecaster` typesets text with pre-drawn bitmap fonts.
//!
//! A render runs a fixed chain of stages:
//!
//! ```text
//! text ─► tokenizer ─► layout ─► compositor ─► effects ─► RenderedImage
//!                        ▲
//!            font::FontLibrary (memory ─► cache file ─► glyph directory)
//! ```
//!
//! [`Typesetter`] is the entry point; the stage modules are public for
//! callers that want to inspect intermediate results.

pub mod color;
pub mod compositor;
pub mod config;
pub mod effects;
pub mod error;
pub mod font;
pub mod glyph;
pub mod layout;
pub mod output;
pub mod tokenizer;
pub mod typesetter;

pub use color::Rgb;
pub use config::{Settings, Typeface};
pub use error::{ConfigError, RenderError, Result};
pub use font::{Font, FontLibrary};
pub use glyph::Glyph;
pub use output::RenderedImage;
pub use typesetter::Typesetter;
