// src/font/persist.rs

//! On-disk font cache files.
//!
//! Each font is stored as `<cache dir>/<name>.glyphs.gz`: a gzip stream
//! holding a bincode header (magic + format version) followed by the font
//! name and its glyph map. The header is decoded on its own first so a file
//! written by another format version is recognised as such rather than
//! misread.
//!
//! The format is private to this crate. Anything unreadable comes back as a
//! [`CacheError`], and the caller rebuilds the font from its source.

use super::{is_valid_font_name, Font};
use crate::error::{CacheError, RenderError, Result};
use crate::glyph::Glyph;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CACHE_EXTENSION: &str = ".glyphs.gz";
pub const FORMAT_VERSION: u32 = 1;
const MAGIC: [u8; 4] = *b"TCGF";

#[derive(Serialize, Deserialize)]
struct Header {
    magic: [u8; 4],
    version: u32,
}

#[derive(Serialize)]
struct PayloadRef<'a> {
    name: &'a str,
    glyphs: &'a BTreeMap<String, Glyph>,
}

#[derive(Deserialize)]
struct Payload {
    name: String,
    glyphs: BTreeMap<String, Glyph>,
}

/// Location of the cache file for `name`, or `None` if the name cannot be
/// used as a file name.
pub fn cache_path(cache_dir: &Path, name: &str) -> Option<PathBuf> {
    is_valid_font_name(name).then(|| cache_dir.join(format!("{name}{CACHE_EXTENSION}")))
}

/// Reads a cached font.
///
/// `Ok(None)` means no cache file exists; `Err` means one exists but cannot
/// be used.
pub fn read(path: &Path, expected_name: &str) -> std::result::Result<Option<Font>, CacheError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut decoder = GzDecoder::new(BufReader::new(file));

    let header: Header = bincode::deserialize_from(&mut decoder)?;
    if header.magic != MAGIC {
        return Err(CacheError::BadMagic);
    }
    if header.version != FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            found: header.version,
            expected: FORMAT_VERSION,
        });
    }

    let payload: Payload = bincode::deserialize_from(&mut decoder)?;
    if payload.name != expected_name {
        return Err(CacheError::NameMismatch {
            found: payload.name,
            expected: expected_name.to_string(),
        });
    }
    for (key, glyph) in &payload.glyphs {
        if glyph.pixels().len() != glyph.width() as usize * glyph.height() as usize {
            return Err(CacheError::Decode(Box::new(bincode::ErrorKind::Custom(
                format!("glyph {key:?} has a truncated pixel buffer"),
            ))));
        }
    }
    Ok(Some(Font::new(payload.name, payload.glyphs)))
}

/// Writes `font` to `path`, replacing any existing file.
///
/// The data goes to a uniquely named temporary sibling first and is renamed
/// into place, so concurrent writers never share a partial file and a
/// reader sees either the old file or a complete new one.
pub fn write(path: &Path, font: &Font) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| RenderError::io(dir, e))?;

    let tmp = tempfile::Builder::new()
        .prefix(".glyphs-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| RenderError::io(dir, e))?;
    write_to(tmp.as_file(), font).map_err(|e| RenderError::io(tmp.path(), e))?;
    // On failure the temporary file is removed when `PersistError` drops.
    tmp.persist(path)
        .map_err(|e| RenderError::io(path, e.error))?;
    Ok(())
}

fn write_to(file: &File, font: &Font) -> std::io::Result<()> {
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let header = Header {
        magic: MAGIC,
        version: FORMAT_VERSION,
    };
    let payload = PayloadRef {
        name: font.name(),
        glyphs: font.glyphs(),
    };
    bincode::serialize_into(&mut encoder, &header).map_err(into_io)?;
    bincode::serialize_into(&mut encoder, &payload).map_err(into_io)?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

fn into_io(e: bincode::Error) -> std::io::Error {
    match *e {
        bincode::ErrorKind::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
    }
}

/// Names of fonts with a cache file in `cache_dir`, sorted.
pub fn cached_font_names(cache_dir: &Path) -> Result<Vec<String>> {
    if !cache_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(cache_dir).map_err(|e| RenderError::io(cache_dir, e))? {
        let entry = entry.map_err(|e| RenderError::io(cache_dir, e))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }
        if let Some(name) = file_name.strip_suffix(CACHE_EXTENSION) {
            if is_valid_font_name(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
