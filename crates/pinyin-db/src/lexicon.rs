use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use pinyin_parse::{parse, tokenize_space_separated};
use pinyin_types::{Pinyin, Token};
use tracing::{debug, info, warn};

use crate::{Buffer, LoadMode, load_optional_file, strip_cr};

/// English CC-CEDICT; the primary file for `en` and the reading cross-reference for others.
pub const CEDICT_FILE: &str = "cedict_ts.u8";
/// Unihan readings table (`U+XXXX<TAB>kMandarin<TAB>reading`).
pub const UNIHAN_FILE: &str = "Unihan_Readings.txt";

/// Primary bilingual lexicon file for a language code, if one is known.
pub fn primary_file_for(language: &str) -> Option<&'static str> {
    match language {
        "en" => Some(CEDICT_FILE),
        "fr" => Some("cfdict.u8"),
        "de" => Some("handedict_nb.u8"),
        _ => None,
    }
}

/// One lexicon line: `TRAD SIMP [pin1 yin1] /definition/`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub traditional: String,
    pub simplified: String,
    pub reading: Vec<Token>,
    pub definition: String,
}

/// Parse one CC-CEDICT line; comments, blanks and malformed lines yield `None`.
pub fn parse_cedict_line(line: &str) -> Option<Entry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (traditional, rest) = line.split_once(' ')?;
    let (simplified, rest) = rest.trim_start().split_once(' ')?;
    let rest = rest.trim_start().strip_prefix('[')?;
    let (reading, definition) = rest.split_once(']')?;
    let definition = definition.trim();
    if !definition.starts_with('/') {
        return None;
    }
    Some(Entry {
        traditional: traditional.to_string(),
        simplified: simplified.to_string(),
        reading: tokenize_space_separated(reading),
        definition: definition.to_string(),
    })
}

/// Parse one `kMandarin` line of the Unihan readings table.
pub fn parse_unihan_line(line: &str) -> Option<(char, Vec<Pinyin>)> {
    if line.starts_with('#') {
        return None;
    }
    let mut fields = line.split('\t');
    let codepoint = fields.next()?.strip_prefix("U+")?;
    if fields.next()? != "kMandarin" {
        return None;
    }
    let character = u32::from_str_radix(codepoint, 16)
        .ok()
        .and_then(char::from_u32)?;
    let readings: Vec<Pinyin> = fields
        .next()?
        .split_whitespace()
        .filter_map(|reading| parse(reading).ok())
        .collect();
    (!readings.is_empty()).then_some((character, readings))
}

/// Entries keyed by both character forms, first insertion winning.
#[derive(Default)]
pub(crate) struct Layer {
    entries: Vec<Entry>,
    keys: HashMap<String, usize>,
    longest_key: usize,
}

impl Layer {
    fn insert(&mut self, entry: Entry) {
        // keys with digits never take part in readings
        let keys = [entry.traditional.clone(), entry.simplified.clone()];
        if keys.iter().any(|k| k.chars().any(|c| c.is_ascii_digit())) {
            return;
        }
        let index = self.entries.len();
        let mut inserted = false;
        for key in keys {
            let chars = key.chars().count();
            if let std::collections::hash_map::Entry::Vacant(slot) = self.keys.entry(key) {
                slot.insert(index);
                self.longest_key = self.longest_key.max(chars);
                inserted = true;
            }
        }
        if inserted {
            self.entries.push(entry);
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Entry> {
        self.keys.get(key).map(|i| &self.entries[*i])
    }

    /// Longest key equal to `chars[start..start + n]` with `start + n <= end`.
    pub(crate) fn longest_match(
        &self,
        chars: &[char],
        start: usize,
        end: usize,
    ) -> Option<(usize, &Entry)> {
        let max = self.longest_key.min(end.saturating_sub(start));
        let mut key = String::new();
        (1..=max).rev().find_map(|len| {
            key.clear();
            key.extend(&chars[start..start + len]);
            self.get(&key).map(|entry| (len, entry))
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn from_bytes(bytes: &[u8], source: &str) -> Self {
        let mut layer = Layer::default();
        let mut skipped = 0usize;
        for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
            let line = strip_cr(raw_line);
            if line.is_empty() || line.first() == Some(&b'#') {
                continue;
            }
            let Ok(line_str) = std::str::from_utf8(line) else {
                warn!("{source}:{} is not valid utf-8, skipping", lineno + 1);
                skipped += 1;
                continue;
            };
            match parse_cedict_line(line_str) {
                Some(entry) => layer.insert(entry),
                None => {
                    debug!("{source}:{} malformed entry, skipping", lineno + 1);
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            warn!("skipped {skipped} malformed lines in {source}");
        }
        layer
    }

    fn from_buffer(buffer: Option<Buffer>, source: &str) -> Self {
        buffer
            .map(|b| Self::from_bytes(b.as_slice(), source))
            .unwrap_or_default()
    }
}

/// Read-only lexicon for one language: primary entries, cross-reference
/// readings and the Unihan per-character table.
pub struct Lexicon {
    language: String,
    primary: Layer,
    crossref: Layer,
    unihan: HashMap<char, Vec<Pinyin>>,
}

impl Lexicon {
    /// A lexicon with no data at all; every lookup misses.
    pub fn empty(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            primary: Layer::default(),
            crossref: Layer::default(),
            unihan: HashMap::new(),
        }
    }

    /// Load the files for `language` from `dict_dir`; absent files are empty layers.
    pub fn load(dict_dir: impl AsRef<Path>, language: &str, mode: LoadMode) -> Result<Self> {
        let dir = dict_dir.as_ref();
        let start = Instant::now();

        let cedict = load_optional_file(dir.join(CEDICT_FILE), mode)?;
        let (primary, crossref) = match primary_file_for(language) {
            Some(CEDICT_FILE) => (Layer::from_buffer(cedict, CEDICT_FILE), Layer::default()),
            Some(name) => (
                Layer::from_buffer(load_optional_file(dir.join(name), mode)?, name),
                Layer::from_buffer(cedict, CEDICT_FILE),
            ),
            None => {
                warn!("no lexicon for language {language:?}, readings only");
                (Layer::default(), Layer::from_buffer(cedict, CEDICT_FILE))
            }
        };
        let unihan = load_optional_file(dir.join(UNIHAN_FILE), mode)?
            .map(|b| parse_unihan(b.as_slice()))
            .unwrap_or_default();

        info!(
            "loaded {language} lexicon: {} entries, {} cross-reference, {} unihan in {} ms",
            primary.len(),
            crossref.len(),
            unihan.len(),
            start.elapsed().as_millis()
        );
        Ok(Self {
            language: language.to_string(),
            primary,
            crossref,
            unihan,
        })
    }

    /// Build a lexicon from in-memory sources in the same formats as the files.
    pub fn from_sources(
        language: impl Into<String>,
        primary: Option<&str>,
        crossref: Option<&str>,
        unihan: Option<&str>,
    ) -> Self {
        let layer = |text: Option<&str>, source: &str| {
            text.map(|t| Layer::from_bytes(t.as_bytes(), source))
                .unwrap_or_default()
        };
        Self {
            language: language.into(),
            primary: layer(primary, "primary"),
            crossref: layer(crossref, "cross-reference"),
            unihan: unihan
                .map(|t| parse_unihan(t.as_bytes()))
                .unwrap_or_default(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Number of primary entries (those that carry meanings).
    pub fn entry_count(&self) -> usize {
        self.primary.len()
    }

    pub fn has_meanings(&self) -> bool {
        self.primary.len() > 0
    }

    /// Exact primary entry for a simplified or traditional key.
    pub fn lookup_exact(&self, key: &str) -> Option<&Entry> {
        self.primary.get(key)
    }

    /// Longest entry starting at `start` and ending by `end`; the
    /// cross-reference wins only when strictly longer.
    pub fn longest_match(&self, chars: &[char], start: usize, end: usize) -> Option<(usize, &Entry)> {
        let primary = self.primary.longest_match(chars, start, end);
        let crossref = self.crossref.longest_match(chars, start, end);
        match (primary, crossref) {
            (Some(p), Some(c)) if c.0 > p.0 => Some(c),
            (Some(p), _) => Some(p),
            (None, c) => c,
        }
    }

    /// Preferred (first) Unihan reading of a character.
    pub fn unihan_reading(&self, c: char) -> Option<&Pinyin> {
        self.unihan.get(&c).and_then(|readings| readings.first())
    }
}

fn parse_unihan(bytes: &[u8]) -> HashMap<char, Vec<Pinyin>> {
    let mut table = HashMap::new();
    for raw_line in bytes.split(|b| *b == b'\n') {
        let Ok(line) = std::str::from_utf8(strip_cr(raw_line)) else {
            continue;
        };
        if let Some((character, readings)) = parse_unihan_line(line) {
            table.entry(character).or_insert(readings);
        }
    }
    table
}
