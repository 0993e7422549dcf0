use pinyin_types::{Pinyin, Tone, combining_mark_tone, unmark_vowel};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::syllables::is_syllable;

/// Reasons a string is not a single pinyin syllable.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum PinyinError {
    #[error("empty syllable")]
    Empty,
    #[error("{0:?} contains digits that are not a trailing tone number")]
    Numeric(String),
    #[error("{0:?} ends in a digit that is not a tone between 1 and 5")]
    InvalidTone(String),
    #[error("{0:?} carries more than one tone mark")]
    MultipleToneMarks(String),
    #[error("{0:?} has no tone number")]
    MissingTone(String),
    #[error("{0:?} is not a Mandarin syllable")]
    NotASyllable(String),
}

/// Parse a numeric (`xiao3`, `nu:3`, `nv3`) or diacritic (`xiǎo`) syllable.
///
/// A syllable without any tone is read as neutral.
pub fn parse(input: &str) -> Result<Pinyin, PinyinError> {
    parse_with(input, false)
}

/// Parse a syllable; with `force_numeric` only a trailing tone digit is accepted.
pub fn parse_with(input: &str, force_numeric: bool) -> Result<Pinyin, PinyinError> {
    let normalized: String = input.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(PinyinError::Empty);
    }
    let err = |make: fn(String) -> PinyinError| make(input.to_string());

    let (body, numeric_tone) = match normalized.char_indices().last() {
        Some((at, c)) if c.is_ascii_digit() => {
            let tone = Tone::from_digit(c).ok_or_else(|| err(PinyinError::InvalidTone))?;
            (&normalized[..at], Some(tone))
        }
        _ => (normalized.as_str(), None),
    };
    if body.is_empty() || body.chars().any(|c| c.is_ascii_digit()) {
        return Err(err(PinyinError::Numeric));
    }

    let mut base = String::with_capacity(body.len());
    let mut marked: Option<Tone> = None;
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(tone) = combining_mark_tone(c) {
            if marked.replace(tone).is_some() {
                return Err(err(PinyinError::MultipleToneMarks));
            }
            continue;
        }
        let c = match unmark_vowel(c) {
            Some((plain, tone)) => {
                if marked.replace(tone).is_some() {
                    return Err(err(PinyinError::MultipleToneMarks));
                }
                plain
            }
            None => c,
        };
        match c {
            'u' if chars.peek() == Some(&':') => {
                chars.next();
                base.push('ü');
            }
            'U' if chars.peek() == Some(&':') => {
                chars.next();
                base.push('Ü');
            }
            'v' => base.push('ü'),
            'V' => base.push('Ü'),
            _ => base.push(c),
        }
    }

    let tone = match (marked, numeric_tone) {
        (Some(_), Some(_)) => return Err(err(PinyinError::MultipleToneMarks)),
        (Some(_), None) | (None, None) if force_numeric => {
            return Err(err(PinyinError::MissingTone));
        }
        (Some(tone), None) | (None, Some(tone)) => tone,
        (None, None) => Tone::Neutral,
    };

    if !is_syllable(&base) {
        return Err(err(PinyinError::NotASyllable));
    }
    Ok(Pinyin::new(base, tone))
}

/// Whether `chunk` carries a diacritic tone mark in any normalization form.
pub(crate) fn has_tone_mark(chunk: &str) -> bool {
    chunk.nfd().any(|c| combining_mark_tone(c).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinyin_types::ToneKind;

    fn py(base: &str, tone: u8) -> Pinyin {
        Pinyin::new(base, Tone::from_number(tone).unwrap())
    }

    #[test]
    fn parses_numeric_tones() {
        for tone in 1..=5 {
            assert_eq!(parse(&format!("ma{tone}")).unwrap(), py("ma", tone));
        }
        assert_eq!(parse("er5").unwrap(), py("er", 5));
        assert_eq!(parse("r2").unwrap(), py("r", 2));
        assert_eq!(parse("a1").unwrap(), py("a", 1));
        assert_eq!(parse("zhuang1").unwrap(), py("zhuang", 1));
        assert_eq!(parse("xiong1").unwrap(), py("xiong", 1));
    }

    #[test]
    fn normalises_umlaut_spellings() {
        assert_eq!(parse("nu:3").unwrap(), parse("nü3").unwrap());
        assert_eq!(parse("nv3").unwrap(), parse("nü3").unwrap());
        assert_eq!(parse("lu:3").unwrap(), parse("lü3").unwrap());
        assert_eq!(parse("nU:3").unwrap(), parse("nÜ3").unwrap());
        assert_eq!(parse("nV3").unwrap(), parse("nÜ3").unwrap());
        assert_eq!(parse("lve4").unwrap().base, "lüe");
        assert_eq!(parse("nü5").unwrap().to_string(), "nü");
        assert_eq!(parse("nü").unwrap().to_string(), "nü");
    }

    #[test]
    fn parses_diacritics_to_numeric_equivalent() {
        for (marked, numeric) in [
            ("chī", "chi1"),
            ("shí", "shi2"),
            ("xiǎo", "xiao3"),
            ("dàn", "dan4"),
            ("huan", "huan"),
            ("nǚ", "nü3"),
        ] {
            assert_eq!(parse(marked).unwrap(), parse(numeric).unwrap(), "{marked}");
        }
        // decomposed input: x i a + combining caron + o
        assert_eq!(parse("xia\u{030C}o").unwrap(), py("xiao", 3));
    }

    #[test]
    fn missing_tone_is_neutral_unless_forced_numeric() {
        assert_eq!(parse("chi").unwrap(), py("chi", 5));
        assert_eq!(
            parse_with("chi", true),
            Err(PinyinError::MissingTone("chi".into()))
        );
        assert!(matches!(
            parse_with("xiǎo", true),
            Err(PinyinError::MissingTone(_))
        ));
    }

    #[test]
    fn rejects_non_syllables() {
        assert!(matches!(parse("xíǎo"), Err(PinyinError::MultipleToneMarks(_))));
        assert!(matches!(parse("xiǎo3"), Err(PinyinError::MultipleToneMarks(_))));
        assert!(matches!(parse("1"), Err(PinyinError::Numeric(_))));
        assert!(matches!(parse("12345"), Err(PinyinError::Numeric(_))));
        assert!(matches!(parse("ma6"), Err(PinyinError::InvalidTone(_))));
        assert!(matches!(parse("USB"), Err(PinyinError::NotASyllable(_))));
        assert_eq!(parse(""), Err(PinyinError::Empty));
    }

    #[test]
    fn keeps_case_of_base() {
        let han = parse("Han4").unwrap();
        assert_eq!(han.base, "Han");
        assert_eq!(han.numeric_format(ToneKind::Written, false), "Han4");
        assert_eq!(han.tonified_format(), "Hàn");
    }

    #[test]
    fn detects_tone_marks() {
        assert!(has_tone_mark("xiǎo"));
        assert!(has_tone_mark("xia\u{030C}o"));
        assert!(!has_tone_mark("nü"));
        assert!(!has_tone_mark("xiao3"));
    }
}
