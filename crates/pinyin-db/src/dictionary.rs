use std::sync::Arc;

use pinyin_parse::tokenize;
use pinyin_types::{
    Text, Token, TonedCharacter, Word, is_han, needs_space_before_append,
    toned_characters_from_reading,
};
use tracing::debug;

use crate::lexicon::Lexicon;
use crate::meanings::{MeaningFormatter, Meanings, SimpTrad};

/// CC-CEDICT writes `TRAD|SIMP`, so the simplified form sits at index 1.
const SIMPLIFIED_INDEX: usize = 1;

/// Map full-width punctuation to its Western equivalent.
fn westernize(c: char) -> char {
    match c {
        '，' | '、' => ',',
        '。' => '.',
        '！' => '!',
        '？' => '?',
        '：' => ':',
        '；' => ';',
        '（' => '(',
        '）' => ')',
        '“' | '”' => '"',
        _ => c,
    }
}

fn is_query_junk(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation() || westernize(c) != c || c == '·' || c == '・'
}

/// Longest-match resolver over one [`Lexicon`]. Never fails: misses degrade to
/// Unihan readings, then to plain text.
#[derive(Clone)]
pub struct Dictionary {
    lexicon: Arc<Lexicon>,
}

enum Segment<'a> {
    Match { chars: String, entry: &'a crate::Entry },
    Unmatched(char),
    Other(String),
}

impl Dictionary {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn language(&self) -> &str {
        self.lexicon.language()
    }

    /// Split text into dictionary matches, unmatched Han characters and other runs.
    fn segments(&self, text: &str) -> Vec<Segment<'_>> {
        let chars: Vec<char> = text.chars().collect();
        let mut segments = Vec::new();
        let mut other = String::new();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if !is_han(c) {
                other.push(c);
                i += 1;
                continue;
            }
            if !other.is_empty() {
                segments.push(Segment::Other(std::mem::take(&mut other)));
            }
            // matches may run over punctuation such as the middle dot in
            // transliterated names, but never over digits or whitespace
            let end = chars[i..]
                .iter()
                .position(|c| c.is_ascii_digit() || c.is_whitespace())
                .map_or(chars.len(), |p| i + p);
            match self.lexicon.longest_match(&chars, i, end) {
                Some((len, entry)) => {
                    segments.push(Segment::Match {
                        chars: chars[i..i + len].iter().collect(),
                        entry,
                    });
                    i += len;
                }
                None => {
                    segments.push(Segment::Unmatched(c));
                    i += 1;
                }
            }
        }
        if !other.is_empty() {
            segments.push(Segment::Other(other));
        }
        segments
    }

    /// Pinyin reading of `text`, one [`Word`] per dictionary match or fallback.
    pub fn reading(&self, text: &str) -> Vec<Word> {
        let mut words = Vec::new();
        for segment in self.segments(text) {
            match segment {
                Segment::Match { entry, .. } => {
                    if let Some(word) = Word::spaced_from_unspaced(entry.reading.iter().cloned()) {
                        append_reading(&mut words, word);
                    }
                }
                Segment::Unmatched(c) => match self.lexicon.unihan_reading(c) {
                    Some(pinyin) => append_reading(&mut words, Word::single(pinyin.clone())),
                    None => {
                        debug!("no reading for {c:?}");
                        words.push(Word::single(Text::from_char(c)));
                    }
                },
                Segment::Other(run) => {
                    let western: String = run.chars().map(westernize).collect();
                    words.extend(tokenize(&western, true).into_iter().map(Word::single));
                }
            }
        }
        words
    }

    /// Han characters of `text` annotated with their tones; everything else is text.
    pub fn tonedchars(&self, text: &str) -> Vec<Word> {
        let mut words = Vec::new();
        for segment in self.segments(text) {
            let tokens = match segment {
                Segment::Match { chars, entry } => {
                    toned_characters_from_reading(&chars, &entry.reading)
                }
                Segment::Unmatched(c) => vec![match self.lexicon.unihan_reading(c) {
                    Some(pinyin) => Token::TonedCharacter(TonedCharacter::new(c, pinyin.toneinfo)),
                    None => Token::Text(Text::from_char(c)),
                }],
                Segment::Other(run) => Text::new(run).map(|t| vec![t.into()]).unwrap_or_default(),
            };
            words.extend(Word::new(tokens).ok());
        }
        words
    }

    /// Meanings and measure words of the entry exactly matching `text`.
    ///
    /// Surrounding whitespace and punctuation are ignored; phrases are never
    /// assembled from sub-word matches.
    pub fn meanings(&self, text: &str, prefer: SimpTrad) -> Option<Meanings> {
        let key = text.trim_matches(is_query_junk);
        if key.is_empty() {
            return None;
        }
        let entry = self.lexicon.lookup_exact(key)?;
        let formatter = MeaningFormatter::new(SIMPLIFIED_INDEX, prefer);
        let found =
            formatter.parse_definition(&entry.definition, &|hanzi: &str| self.tonedchars(hanzi));
        (!found.is_empty()).then_some(found)
    }
}

/// Append a reading word, separating it from a preceding word when needed.
fn append_reading(words: &mut Vec<Word>, word: Word) {
    if matches!(word.first(), Token::Pinyin(_)) && needs_space_before_append(words) {
        words.push(Word::single(Text::space()));
    }
    words.push(word);
}
