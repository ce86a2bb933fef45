// src/main.rs

//! Command-line front end: renders text to a PNG file.

use anyhow::{bail, Context};
use clap::Parser;
use log::{info, warn};
use std::io::Read;
use std::path::PathBuf;
use typecaster::{output, Rgb, Settings, Typeface, Typesetter};

#[derive(Parser, Debug)]
#[command(name = "typecaster", version, about = "Typeset text with bitmap fonts")]
struct Cli {
    /// Text to render. Read from --input or stdin when omitted.
    text: Option<String>,

    /// Read the text from a file
    #[arg(long, value_name = "FILE", conflicts_with = "text")]
    input: Option<PathBuf>,

    /// JSON settings file (paths and default typeface)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Directory holding one glyph directory per font
    #[arg(long, value_name = "DIR")]
    fonts_dir: Option<PathBuf>,

    /// Directory for compressed font caches
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Output file. Defaults to a name derived from the text
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Directory for the default output file
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[arg(long)]
    font: Option<String>,

    /// Glyph height in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Stroke weight, negative thins and positive bolds
    #[arg(long, allow_hyphen_values = true)]
    clarity: Option<i32>,

    /// Slant glyphs by 15°
    #[arg(long, overrides_with = "no_italic")]
    italic: bool,

    /// Upright glyphs, even if the settings file enables italic
    #[arg(long, overrides_with = "italic")]
    no_italic: bool,

    /// Ink color as #rrggbb
    #[arg(long)]
    color: Option<Rgb>,

    #[arg(long, alias = "char-spacing", allow_hyphen_values = true)]
    symbol_spacing: Option<i32>,

    #[arg(long, allow_hyphen_values = true)]
    line_spacing: Option<i32>,

    /// Height to width stretch factor
    #[arg(long)]
    hw_ratio: Option<f32>,

    /// Treat every character as its own symbol
    #[arg(long, overrides_with = "no_raw_input")]
    raw_input: bool,

    /// Split lines into whitespace-delimited symbols
    #[arg(long, overrides_with = "raw_input")]
    no_raw_input: bool,

    /// List available fonts and exit
    #[arg(long)]
    list_fonts: bool,

    /// Rebuild the selected font's cache from its glyph directory first
    #[arg(long)]
    rebuild_cache: bool,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(dir) = &self.fonts_dir {
            settings.fonts_dir = dir.clone();
        }
        if let Some(dir) = &self.cache_dir {
            settings.cache_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        self.apply_typeface(&mut settings.typeface);
        Ok(settings)
    }

    fn apply_typeface(&self, typeface: &mut Typeface) {
        if let Some(font) = &self.font {
            typeface.font = font.clone();
        }
        if self.size.is_some() {
            typeface.size = self.size;
        }
        if let Some(clarity) = self.clarity {
            typeface.clarity = clarity;
        }
        if let Some(italic) = switch(self.italic, self.no_italic) {
            typeface.italic = italic;
        }
        if self.color.is_some() {
            typeface.color = self.color;
        }
        if let Some(spacing) = self.symbol_spacing {
            typeface.symbol_spacing = spacing;
        }
        if let Some(spacing) = self.line_spacing {
            typeface.line_spacing = spacing;
        }
        if let Some(ratio) = self.hw_ratio {
            typeface.hw_ratio = ratio;
        }
        if let Some(raw) = switch(self.raw_input, self.no_raw_input) {
            typeface.raw_input = raw;
        }
    }

    fn read_text(&self) -> anyhow::Result<String> {
        let text = if let Some(text) = &self.text {
            text.clone()
        } else if let Some(path) = &self.input {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?
        } else {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read text from stdin")?;
            text
        };
        Ok(text.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// `Some` when either the `--flag` or the `--no-flag` form was given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let typesetter = Typesetter::from_settings(&settings);
    let library = typesetter.library();

    if cli.list_fonts {
        let fonts = library
            .available_fonts()
            .with_context(|| format!("Failed to list fonts in {}", library.fonts_root().display()))?;
        if fonts.is_empty() {
            warn!("No fonts found in {}", library.fonts_root().display());
        }
        for font in fonts {
            println!("{font}");
        }
        return Ok(());
    }

    let typeface = &settings.typeface;
    if cli.rebuild_cache {
        let font = library
            .rebuild(&typeface.font)
            .with_context(|| format!("Failed to rebuild font '{}'", typeface.font))?;
        info!("Rebuilt '{}' ({} glyphs)", font.name(), font.len());
        if cli.text.is_none() && cli.input.is_none() {
            return Ok(());
        }
    }

    let text = cli.read_text()?;
    if text.is_empty() {
        bail!("No text to render");
    }

    let image = typesetter
        .render(&text, typeface)
        .with_context(|| format!("Failed to render with font '{}'", typeface.font))?;
    let path = match &cli.output {
        Some(path) => path.clone(),
        None => output::default_output_path(&settings.output_dir, &text),
    };
    let written = image
        .save(&path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    println!("{} ({}x{})", written.display(), image.width(), image.height());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn typeface_from(settings: Typeface, args: &[&str]) -> Typeface {
        let cli = Cli::parse_from(std::iter::once("typecaster").chain(args.iter().copied()));
        let mut typeface = settings;
        cli.apply_typeface(&mut typeface);
        typeface
    }

    #[test]
    fn no_flags_turn_off_settings_file_switches() {
        let from_file = Typeface {
            italic: true,
            raw_input: true,
            ..Typeface::default()
        };
        let typeface = typeface_from(from_file.clone(), &["--no-italic", "--no-raw-input"]);
        assert!(!typeface.italic);
        assert!(!typeface.raw_input);

        assert!(typeface_from(from_file, &[]).italic);
    }

    #[test]
    fn last_of_a_flag_pair_wins() {
        assert!(typeface_from(Typeface::default(), &["--no-italic", "--italic"]).italic);
        assert!(!typeface_from(Typeface::default(), &["--italic", "--no-italic"]).italic);
    }

    #[test]
    fn options_override_the_typeface() {
        let typeface = typeface_from(
            Typeface::default(),
            &[
                "--font",
                "scroll",
                "--clarity",
                "-2",
                "--char-spacing",
                "-3",
                "--color",
                "#102030",
                "--hw-ratio",
                "1.5",
                "ka",
            ],
        );
        assert_eq!(typeface.font, "scroll");
        assert_eq!(typeface.clarity, -2);
        assert_eq!(typeface.symbol_spacing, -3);
        assert_eq!(typeface.color, Some(Rgb::new(16, 32, 48)));
        assert_eq!(typeface.hw_ratio, 1.5);
    }
}
