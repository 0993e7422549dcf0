//! Split raw `/sense/sense/CL:...` definitions into meanings and measure words.
//!
//! Embedded references such as `辭典|辞典[ci2 dian3]` are resolved to the
//! preferred character form and rendered through a caller-supplied callback
//! (normally the dictionary's per-character tone lookup), followed by their
//! reading: `辞典 - ci2 dian3`.

use pinyin_parse::{tokenize, tokenize_space_separated};
use pinyin_types::{Text, Word};

const MEASURE_WORD_MARKER: &str = "CL:";

/// Which character set to show when a definition offers both forms.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum SimpTrad {
    #[default]
    Simp,
    Trad,
}

/// Measure word: the character form and its reading.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MeasureWord {
    pub characters: Vec<Word>,
    pub pinyin: Vec<Word>,
}

/// Parsed definition: one word list per sense, plus measure words.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Meanings {
    pub meanings: Vec<Vec<Word>>,
    pub measure_words: Vec<MeasureWord>,
}

impl Meanings {
    pub fn is_empty(&self) -> bool {
        self.meanings.is_empty() && self.measure_words.is_empty()
    }
}

/// Renders hanzi as a single plain text word; the callback to use when no
/// tone information is available.
pub fn plain_hanzi(hanzi: &str) -> Vec<Word> {
    Text::new(hanzi).map(|t| vec![Word::single(t)]).unwrap_or_default()
}

/// Parses definitions for one character-set preference.
#[derive(Clone, Copy, Debug)]
pub struct MeaningFormatter {
    simplified_index: usize,
    prefer: SimpTrad,
}

/// A `FORM|FORM[pinyin]` reference found inside a sense.
struct Reference<'a> {
    forms: Vec<&'a str>,
    pinyin: Option<&'a str>,
}

impl MeaningFormatter {
    /// `simplified_index` is the position of the simplified form in `A|B` pairs.
    pub fn new(simplified_index: usize, prefer: SimpTrad) -> Self {
        Self {
            simplified_index,
            prefer,
        }
    }

    pub fn parse_definition(
        &self,
        definition: &str,
        tonedchars: &dyn Fn(&str) -> Vec<Word>,
    ) -> Meanings {
        let mut found = Meanings::default();
        for sense in definition.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            match sense.strip_prefix(MEASURE_WORD_MARKER) {
                Some(list) => found
                    .measure_words
                    .extend(self.measure_words(list, tonedchars)),
                None => found.meanings.push(self.sense(sense, tonedchars)),
            }
        }
        found
    }

    fn select<'a>(&self, forms: &[&'a str]) -> &'a str {
        let index = match (forms.len(), self.prefer) {
            (1, _) => 0,
            (_, SimpTrad::Simp) => self.simplified_index,
            (_, SimpTrad::Trad) => 1 - self.simplified_index.min(1),
        };
        forms.get(index).or(forms.first()).copied().unwrap_or("")
    }

    fn measure_words(
        &self,
        list: &str,
        tonedchars: &dyn Fn(&str) -> Vec<Word>,
    ) -> Vec<MeasureWord> {
        list.split(',')
            .filter_map(|item| {
                let (reference, rest) = scan_reference(item.trim())?;
                if !rest.trim().is_empty() {
                    return None;
                }
                Some(MeasureWord {
                    characters: tonedchars(self.select(&reference.forms)),
                    pinyin: reference.pinyin.map(reading_words).unwrap_or_default(),
                })
            })
            .collect()
    }

    fn sense(&self, sense: &str, tonedchars: &dyn Fn(&str) -> Vec<Word>) -> Vec<Word> {
        let mut words = Vec::new();
        let mut plain_start = 0;
        let mut at = 0;
        while at < sense.len() {
            let rest = &sense[at..];
            let Some(c) = rest.chars().next() else {
                break;
            };
            if !is_reference_char(c) {
                at += c.len_utf8();
                continue;
            }
            match scan_reference(rest) {
                Some((reference, after))
                    if reference.forms.len() > 1 || reference.pinyin.is_some() =>
                {
                    push_plain(&mut words, &sense[plain_start..at]);
                    words.extend(tonedchars(self.select(&reference.forms)));
                    if let Some(pinyin) = reference.pinyin {
                        words.push(Word::single(Text::reading_separator()));
                        words.extend(reading_words(pinyin));
                    }
                    at = sense.len() - after.len();
                    plain_start = at;
                }
                _ => {
                    at += rest
                        .find(|c: char| !is_reference_char(c))
                        .unwrap_or(rest.len());
                }
            }
        }
        push_plain(&mut words, &sense[plain_start..]);
        words
    }
}

/// Characters that can make up a hanzi form inside a definition.
fn is_reference_char(c: char) -> bool {
    !c.is_ascii() && !c.is_whitespace()
}

/// Parse `A`, `A|B`, optionally followed by `[pinyin]` (one space allowed before `[`).
fn scan_reference(s: &str) -> Option<(Reference<'_>, &str)> {
    let mut forms = Vec::new();
    let mut rest = s;
    loop {
        let len = rest
            .find(|c: char| !is_reference_char(c))
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        forms.push(&rest[..len]);
        rest = &rest[len..];
        match rest.strip_prefix('|') {
            Some(next) if next.starts_with(is_reference_char) => rest = next,
            _ => break,
        }
    }
    let bracket = rest.strip_prefix(' ').unwrap_or(rest);
    let pinyin = bracket
        .strip_prefix('[')
        .and_then(|inner| inner.split_once(']'));
    match pinyin {
        Some((pinyin, after)) => Some((
            Reference {
                forms,
                pinyin: Some(pinyin),
            },
            after,
        )),
        None => Some((Reference { forms, pinyin: None }, rest)),
    }
}

fn reading_words(pinyin: &str) -> Vec<Word> {
    Word::spaced_from_unspaced(tokenize_space_separated(pinyin))
        .into_iter()
        .collect()
}

fn push_plain(words: &mut Vec<Word>, plain: &str) {
    if let Ok(word) = Word::new(tokenize(plain, false)) {
        words.push(word);
    }
}

/// Fold measure words into the sense list as a trailing `MW: 本 - ben3, ...` sense.
pub fn combine_meanings_mws(found: Meanings) -> Vec<Vec<Word>> {
    let Meanings {
        mut meanings,
        measure_words,
    } = found;
    if measure_words.is_empty() {
        return meanings;
    }
    let text = |s: &str| Text::new(s).map(Word::single);
    let mut line: Vec<Word> = text("MW: ").into_iter().collect();
    for (i, mw) in measure_words.into_iter().enumerate() {
        if i > 0 {
            line.extend(text(", "));
        }
        line.extend(mw.characters);
        if !mw.pinyin.is_empty() {
            line.push(Word::single(Text::reading_separator()));
            line.extend(mw.pinyin);
        }
    }
    meanings.push(line);
    meanings
}
