//! Shared token model for romanized Chinese text.
//!
//! Every stage of the pipeline (tokenizer, dictionary resolver, tone sandhi,
//! colorizer) speaks in terms of the types defined here: a [`Token`] is one of
//! [`Text`], [`Pinyin`] or [`TonedCharacter`], and a [`Word`] is a non-empty
//! run of tokens forming one semantic unit. Tokens carry a [`ToneInfo`] that
//! separates the dictionary (written) tone from the pronounced (spoken) one.
//!
//! The token kinds are closed: callers either `match` on [`Token`] or
//! implement the three-method [`TokenVisitor`].
//!
//! ```rust
//! use pinyin_types::{Pinyin, Tone, ToneInfo, ToneKind, Word, flatten};
//!
//! let hen = Pinyin::new("hen", ToneInfo::new(Some(Tone::Dipping), None).unwrap());
//! assert_eq!(hen.numeric_format(ToneKind::Written, false), "hen3");
//! assert_eq!(hen.tonified_format(), "hěn");
//! assert_eq!(flatten(&[Word::single(hen)]), "hen3");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

mod word;

pub use word::{
    Rendering, Word, flatten, flatten_tonified, flatten_with, needs_space_before_append,
    toned_characters_from_reading,
};

/// Attribute bag attached to tokens (styling hints such as `color`).
///
/// Ordered so equality and debug output are deterministic.
pub type Attributes = BTreeMap<String, String>;

/// Attribute key rendered by [`flatten`] as an inline color span.
pub const COLOR_ATTRIBUTE: &str = "color";

/// Violations of the construction invariants of the token model.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ModelError {
    #[error("text tokens must not be empty")]
    EmptyText,
    #[error("a word must contain at least one token")]
    EmptyWord,
    #[error("at least one of the written or spoken tone must be supplied")]
    NoTone,
}

/// Mandarin tone; `Neutral` is conventionally written as tone 5.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Tone {
    Flat = 1,
    Rising = 2,
    Dipping = 3,
    Falling = 4,
    Neutral = 5,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Flat,
        Tone::Rising,
        Tone::Dipping,
        Tone::Falling,
        Tone::Neutral,
    ];

    /// Map a tone number (1–5) to a tone.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Tone::Flat),
            2 => Some(Tone::Rising),
            3 => Some(Tone::Dipping),
            4 => Some(Tone::Falling),
            5 => Some(Tone::Neutral),
            _ => None,
        }
    }

    /// Map an ASCII tone digit (`'1'`–`'5'`) to a tone.
    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10).and_then(|d| Self::from_number(d as u8))
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Zero-based position, handy for indexing five-entry palettes.
    pub fn index(self) -> usize {
        self as usize - 1
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Which side of a [`ToneInfo`] to read.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ToneKind {
    Written,
    Spoken,
}

/// Written (dictionary) and spoken (post-sandhi) tone of a syllable.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct ToneInfo {
    pub written: Tone,
    pub spoken: Tone,
}

impl ToneInfo {
    /// Build tone info from either side; a missing side copies the other.
    pub fn new(written: Option<Tone>, spoken: Option<Tone>) -> Result<Self, ModelError> {
        match (written, spoken) {
            (Some(written), Some(spoken)) => Ok(Self { written, spoken }),
            (Some(tone), None) | (None, Some(tone)) => Ok(Self::both(tone)),
            (None, None) => Err(ModelError::NoTone),
        }
    }

    pub const fn both(tone: Tone) -> Self {
        Self {
            written: tone,
            spoken: tone,
        }
    }

    pub fn tone(self, kind: ToneKind) -> Tone {
        match kind {
            ToneKind::Written => self.written,
            ToneKind::Spoken => self.spoken,
        }
    }

    pub fn with_spoken(self, spoken: Tone) -> Self {
        Self { spoken, ..self }
    }
}

impl From<Tone> for ToneInfo {
    fn from(tone: Tone) -> Self {
        Self::both(tone)
    }
}

impl fmt::Debug for ToneInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ToneInfo(written={}, spoken={})",
            self.written, self.spoken
        )
    }
}

/// Non-empty run of content that is not a syllable (English, punctuation, markup).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Text {
    text: String,
    attributes: Attributes,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Result<Self, ModelError> {
        Self::with_attributes(text, Attributes::new())
    }

    pub fn with_attributes(
        text: impl Into<String>,
        attributes: Attributes,
    ) -> Result<Self, ModelError> {
        let text = text.into();
        if text.is_empty() {
            return Err(ModelError::EmptyText);
        }
        Ok(Self { text, attributes })
    }

    /// A single ASCII space, the separator inserted between reading syllables.
    pub fn space() -> Self {
        Self::from_char(' ')
    }

    /// ` - `, joining a cross-referenced headword to its reading.
    pub fn reading_separator() -> Self {
        Self {
            text: " - ".to_string(),
            attributes: Attributes::new(),
        }
    }

    pub fn from_char(c: char) -> Self {
        Self {
            text: c.to_string(),
            attributes: Attributes::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// One romanized syllable such as `ma3` / `mǎ`.
///
/// Parsing from strings lives in `pinyin-parse`; this type only stores the
/// canonical base (with `ü`, never `v`/`u:`) and renders it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Pinyin {
    pub base: String,
    pub toneinfo: ToneInfo,
    pub attributes: Attributes,
}

impl Pinyin {
    pub fn new(base: impl Into<String>, toneinfo: impl Into<ToneInfo>) -> Self {
        Self {
            base: base.into(),
            toneinfo: toneinfo.into(),
            attributes: Attributes::new(),
        }
    }

    /// The `r` suffix of an erhua syllable.
    pub fn erhua() -> Self {
        Self::new("r", Tone::Neutral)
    }

    pub fn is_er(&self) -> bool {
        self.base.eq_ignore_ascii_case("r") && self.toneinfo.written == Tone::Neutral
    }

    /// Base followed by the tone digit of the selected side.
    pub fn numeric_format(&self, kind: ToneKind, hide_neutral: bool) -> String {
        let tone = self.toneinfo.tone(kind);
        if hide_neutral && tone == Tone::Neutral {
            self.base.clone()
        } else {
            format!("{}{}", self.base, tone)
        }
    }

    /// Base with the written tone rendered as a diacritic.
    pub fn tonified_format(&self) -> String {
        tonify_base(&self.base, self.toneinfo.written)
    }
}

impl fmt::Display for Pinyin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.numeric_format(ToneKind::Written, true))
    }
}

/// A Han character whose tone is known.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TonedCharacter {
    pub character: String,
    pub toneinfo: ToneInfo,
    pub attributes: Attributes,
}

impl TonedCharacter {
    pub fn new(character: impl Into<String>, toneinfo: impl Into<ToneInfo>) -> Self {
        Self {
            character: character.into(),
            toneinfo: toneinfo.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn is_er(&self) -> bool {
        matches!(self.character.as_str(), "儿" | "兒") && self.toneinfo.written == Tone::Neutral
    }
}

/// Closed set of token kinds making up a [`Word`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Token {
    Text(Text),
    Pinyin(Pinyin),
    TonedCharacter(TonedCharacter),
}

/// Visitor over the three token kinds.
pub trait TokenVisitor {
    type Output;

    fn visit_text(&mut self, text: &Text) -> Self::Output;
    fn visit_pinyin(&mut self, pinyin: &Pinyin) -> Self::Output;
    fn visit_toned_character(&mut self, character: &TonedCharacter) -> Self::Output;
}

impl Token {
    pub fn accept<V: TokenVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Token::Text(text) => visitor.visit_text(text),
            Token::Pinyin(pinyin) => visitor.visit_pinyin(pinyin),
            Token::TonedCharacter(character) => visitor.visit_toned_character(character),
        }
    }

    pub fn is_er(&self) -> bool {
        match self {
            Token::Text(_) => false,
            Token::Pinyin(pinyin) => pinyin.is_er(),
            Token::TonedCharacter(character) => character.is_er(),
        }
    }

    /// Tone of syllables and toned characters; `None` for text.
    pub fn toneinfo(&self) -> Option<ToneInfo> {
        match self {
            Token::Text(_) => None,
            Token::Pinyin(pinyin) => Some(pinyin.toneinfo),
            Token::TonedCharacter(character) => Some(character.toneinfo),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            Token::Text(text) => &text.attributes,
            Token::Pinyin(pinyin) => &pinyin.attributes,
            Token::TonedCharacter(character) => &character.attributes,
        }
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        match self {
            Token::Text(text) => &mut text.attributes,
            Token::Pinyin(pinyin) => &mut pinyin.attributes,
            Token::TonedCharacter(character) => &mut character.attributes,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes_mut().insert(key.into(), value.into());
        self
    }

    /// Replace the spoken tone, leaving text untouched.
    pub fn with_spoken_tone(self, spoken: Tone) -> Self {
        match self {
            Token::Text(text) => Token::Text(text),
            Token::Pinyin(mut pinyin) => {
                pinyin.toneinfo = pinyin.toneinfo.with_spoken(spoken);
                Token::Pinyin(pinyin)
            }
            Token::TonedCharacter(mut character) => {
                character.toneinfo = character.toneinfo.with_spoken(spoken);
                Token::TonedCharacter(character)
            }
        }
    }

    /// Content of a text token.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Display form using the written tone, neutral tone hidden.
    pub fn render(&self, tonified: bool) -> String {
        match self {
            Token::Text(text) => text.text.clone(),
            Token::Pinyin(pinyin) if tonified => pinyin.tonified_format(),
            Token::Pinyin(pinyin) => pinyin.to_string(),
            Token::TonedCharacter(character) => character.character.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

impl From<Text> for Token {
    fn from(text: Text) -> Self {
        Token::Text(text)
    }
}

impl From<Pinyin> for Token {
    fn from(pinyin: Pinyin) -> Self {
        Token::Pinyin(pinyin)
    }
}

impl From<TonedCharacter> for Token {
    fn from(character: TonedCharacter) -> Self {
        Token::TonedCharacter(character)
    }
}

const MARKED_VOWELS: [(char, [char; 4]); 12] = [
    ('a', ['ā', 'á', 'ǎ', 'à']),
    ('e', ['ē', 'é', 'ě', 'è']),
    ('i', ['ī', 'í', 'ǐ', 'ì']),
    ('o', ['ō', 'ó', 'ǒ', 'ò']),
    ('u', ['ū', 'ú', 'ǔ', 'ù']),
    ('ü', ['ǖ', 'ǘ', 'ǚ', 'ǜ']),
    ('A', ['Ā', 'Á', 'Ǎ', 'À']),
    ('E', ['Ē', 'É', 'Ě', 'È']),
    ('I', ['Ī', 'Í', 'Ǐ', 'Ì']),
    ('O', ['Ō', 'Ó', 'Ǒ', 'Ò']),
    ('U', ['Ū', 'Ú', 'Ǔ', 'Ù']),
    ('Ü', ['Ǖ', 'Ǘ', 'Ǚ', 'Ǜ']),
];

const COMBINING_MARKS: [char; 4] = ['\u{0304}', '\u{0301}', '\u{030C}', '\u{0300}'];

/// Precomposed vowel carrying the diacritic for `tone`.
pub fn mark_vowel(vowel: char, tone: Tone) -> Option<char> {
    if tone == Tone::Neutral {
        return None;
    }
    MARKED_VOWELS
        .iter()
        .find(|(plain, _)| *plain == vowel)
        .map(|(_, marked)| marked[tone.index()])
}

/// Split a precomposed tone-marked vowel into its plain vowel and tone.
pub fn unmark_vowel(c: char) -> Option<(char, Tone)> {
    MARKED_VOWELS.iter().find_map(|(plain, marked)| {
        marked
            .iter()
            .position(|m| *m == c)
            .and_then(|i| Tone::from_number(i as u8 + 1))
            .map(|tone| (*plain, tone))
    })
}

/// Tone expressed by a standalone combining diacritic (macron, acute, caron, grave).
pub fn combining_mark_tone(c: char) -> Option<Tone> {
    COMBINING_MARKS
        .iter()
        .position(|m| *m == c)
        .and_then(|i| Tone::from_number(i as u8 + 1))
}

/// Whether `c` is a CJK ideograph (unified, extensions or compatibility).
pub fn is_han(c: char) -> bool {
    matches!(c,
        '\u{3007}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}'
        | '\u{2A700}'..='\u{2EBEF}'
        | '\u{2F800}'..='\u{2FA1F}'
        | '\u{30000}'..='\u{3134F}')
}

fn combining_mark(tone: Tone) -> Option<char> {
    (tone != Tone::Neutral).then(|| COMBINING_MARKS[tone.index()])
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'ü' | 'ê')
}

/// Place the tone mark: `a`/`e` first, then the `o` of `ou`, else the last vowel.
fn tonify_base(base: &str, tone: Tone) -> String {
    if tone == Tone::Neutral {
        return base.to_string();
    }
    let chars: Vec<char> = base.chars().collect();
    let lower: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();
    let target = lower
        .iter()
        .position(|c| *c == 'a')
        .or_else(|| lower.iter().position(|c| *c == 'e'))
        .or_else(|| lower.windows(2).position(|w| matches!(w, ['o', 'u'])))
        .or_else(|| lower.iter().rposition(|c| is_vowel(*c)))
        .unwrap_or(0);

    let mut out = String::with_capacity(base.len() + 2);
    for (i, c) in chars.iter().enumerate() {
        if i != target {
            out.push(*c);
            continue;
        }
        match mark_vowel(*c, tone) {
            Some(marked) => out.push(marked),
            None => {
                out.push(*c);
                out.extend(combining_mark(tone));
            }
        }
    }
    out
}
