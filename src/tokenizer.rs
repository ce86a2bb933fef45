// src/tokenizer.rs

//! Splits input text into lines of symbol keys.
//!
//! In token mode every whitespace-delimited run on a line is one symbol key
//! (one glyph lookup). In raw mode every character, spaces included, is its
//! own key. Either way each input line yields exactly one output line, so
//! blank lines survive as empty lines and keep their vertical space.

/// A symbol key with its 1-based position in the input, for error reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolKey {
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl SymbolKey {
    pub fn new(text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            text: text.into(),
            line,
            column,
        }
    }
}

/// Splits `text` into lines of symbol keys.
///
/// Lines break on `\n`; a trailing `\r` is dropped. Columns count
/// characters, not bytes.
pub fn tokenize(text: &str, raw_input: bool) -> Vec<Vec<SymbolKey>> {
    text.split('\n')
        .enumerate()
        .map(|(index, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if raw_input {
                raw_symbols(line, index + 1)
            } else {
                token_symbols(line, index + 1)
            }
        })
        .collect()
}

fn raw_symbols(line: &str, line_no: usize) -> Vec<SymbolKey> {
    line.chars()
        .enumerate()
        .map(|(col, c)| SymbolKey::new(c.to_string(), line_no, col + 1))
        .collect()
}

fn token_symbols(line: &str, line_no: usize) -> Vec<SymbolKey> {
    let mut symbols = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    for (col, c) in line.chars().enumerate() {
        if c.is_whitespace() {
            if !current.is_empty() {
                symbols.push(SymbolKey::new(std::mem::take(&mut current), line_no, start + 1));
            }
        } else {
            if current.is_empty() {
                start = col;
            }
            current.push(c);
        }
    }
    if !current.is_empty() {
        symbols.push(SymbolKey::new(current, line_no, start + 1));
    }
    symbols
}
