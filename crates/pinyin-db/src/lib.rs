//! Load CC-CEDICT style lexicons and resolve Chinese text against them.
//!
//! A [`Lexicon`] is built once per language from up to three sources found in
//! a dictionary directory:
//!
//! - the primary bilingual file (`cedict_ts.u8`, `cfdict.u8`, `handedict_nb.u8`),
//!   which supplies readings and meanings;
//! - the English CC-CEDICT as a cross-reference for readings when the primary
//!   file has no match;
//! - the Unihan `kMandarin` table for single characters nothing else covers.
//!
//! Missing files are empty layers, never errors. [`Dictionary`] resolves text
//! against a lexicon with longest-match segmentation; [`LexiconRegistry`]
//! memoizes lexicons per language for concurrent callers.
//!
//! # Example
//! ```no_run
//! use pinyin_db::{LexiconRegistry, LoadMode, SimpTrad};
//! use pinyin_types::flatten;
//!
//! let registry = LexiconRegistry::new("/path/to/dicts", LoadMode::Mmap);
//! let dict = registry.dictionary("en");
//! println!("{}", flatten(&dict.reading("你好")));
//! if let Some(found) = dict.meanings("书", SimpTrad::Simp) {
//!     println!("{} senses", found.meanings.len());
//! }
//! ```

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use memmap2::Mmap;

mod dictionary;
mod lexicon;
pub mod meanings;
pub mod numbers;
mod registry;

pub use dictionary::Dictionary;
pub use lexicon::{
    CEDICT_FILE, Entry, Lexicon, UNIHAN_FILE, parse_cedict_line, parse_unihan_line,
    primary_file_for,
};
pub use meanings::{MeaningFormatter, Meanings, MeasureWord, SimpTrad, combine_meanings_mws};
pub use registry::LexiconRegistry;

/// Strategy for loading lexicon files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each file while parsing it.
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

fn load_file(path: PathBuf, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn load_optional_file(path: PathBuf, mode: LoadMode) -> Result<Option<Buffer>> {
    if !path.exists() {
        return Ok(None);
    }
    load_file(path, mode).map(Some)
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
