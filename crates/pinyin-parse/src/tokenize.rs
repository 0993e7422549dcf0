use pinyin_types::{COLOR_ATTRIBUTE, Pinyin, Text, Token, Word};

use crate::parse::{has_tone_mark, parse_with};

/// Split mixed text into syllables and verbatim text runs.
///
/// Runs of letters and digits become [`Pinyin`] tokens only when every
/// syllable in the run carries a tone (a trailing digit, or a diacritic unless
/// `force_numeric`). Anything else, including markup tags, whitespace and Han
/// characters, is kept verbatim as [`Text`]. The one exception is a
/// `<span style="color:X">` tag: its color moves onto the [`Pinyin`] tokens
/// up to the closing `</span>`, leaving `<span style="">` behind, so colored
/// output can be tokenized again. Never fails.
pub fn tokenize(text: &str, force_numeric: bool) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut color: Option<&str> = None;
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        if first == '<' {
            if let Some(end) = tag_end(rest) {
                let tag = &rest[..end];
                if let Some(tag_color) = span_color(tag) {
                    color = Some(tag_color);
                    push_text(&mut tokens, EMPTY_SPAN);
                } else {
                    if tag.eq_ignore_ascii_case("</span>") {
                        color = None;
                    }
                    push_text(&mut tokens, tag);
                }
                rest = &rest[end..];
                continue;
            }
        }
        let len = if is_word_char(first) {
            let len = word_run_len(rest);
            tokens.extend(
                tokenize_run(&rest[..len], force_numeric)
                    .into_iter()
                    .map(|token| match (color, token) {
                        (Some(color), token @ Token::Pinyin(_)) => {
                            token.with_attribute(COLOR_ATTRIBUTE, color)
                        }
                        (_, token) => token,
                    }),
            );
            len
        } else {
            let len = other_run_len(rest);
            push_text(&mut tokens, &rest[..len]);
            len
        };
        rest = &rest[len..];
    }
    tokens
}

/// [`tokenize`], wrapping every token in its own [`Word`].
pub fn tokenize_words(text: &str, force_numeric: bool) -> Vec<Word> {
    tokenize(text, force_numeric)
        .into_iter()
        .map(Word::single)
        .collect()
}

/// Tokenize whitespace-separated numeric pinyin such as a dictionary reading.
///
/// Pieces that do not parse (`USB`, `·`) are kept as text; whitespace is dropped.
pub fn tokenize_space_separated(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|piece| match parse_with(piece, true) {
            Ok(pinyin) => Some(Token::Pinyin(pinyin)),
            Err(_) => Text::new(piece).ok().map(Token::Text),
        })
        .collect()
}

fn push_text(tokens: &mut Vec<Token>, s: &str) {
    if let Ok(text) = Text::new(s) {
        tokens.push(Token::Text(text));
    }
}

fn is_latin_letter(c: char) -> bool {
    c.is_alphabetic() && matches!(c, '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}')
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_latin_letter(c) || is_combining_mark(c)
}

/// Byte length of the leading word run; `:` counts only inside `u:`.
fn word_run_len(s: &str) -> usize {
    let mut prev: Option<char> = None;
    let mut iter = s.char_indices().peekable();
    while let Some((at, c)) = iter.next() {
        let continues = is_word_char(c)
            || (c == ':'
                && matches!(prev, Some('u' | 'U'))
                && iter.peek().is_some_and(|(_, next)| is_word_char(*next)));
        if !continues {
            return at;
        }
        prev = Some(c);
    }
    s.len()
}

fn other_run_len(s: &str) -> usize {
    for (at, c) in s.char_indices().skip(1) {
        if is_word_char(c) || (c == '<' && tag_end(&s[at..]).is_some()) {
            return at;
        }
    }
    s.len()
}

const EMPTY_SPAN: &str = r#"<span style="">"#;

/// The color of a `<span style="color:X">` opening tag.
fn span_color(tag: &str) -> Option<&str> {
    let color = tag
        .strip_prefix(r#"<span style="color:"#)?
        .strip_suffix(r#"">"#)?
        .trim()
        .trim_end_matches(';');
    (!color.is_empty() && !color.contains(['"', ';'])).then_some(color)
}

/// Byte length of a `<...>` tag at the start of `s`, if it is well formed.
fn tag_end(s: &str) -> Option<usize> {
    let inner = s.strip_prefix('<')?;
    let close = inner.find(['<', '>'])?;
    (close > 0 && inner[close..].starts_with('>')).then_some(close + 2)
}

/// Tokenize one word run, all-or-nothing.
fn tokenize_run(run: &str, force_numeric: bool) -> Vec<Token> {
    syllables_of_run(run, force_numeric)
        .map(|syllables| syllables.into_iter().map(Token::Pinyin).collect())
        .unwrap_or_else(|| {
            Text::new(run)
                .map(|text| vec![Token::Text(text)])
                .unwrap_or_default()
        })
}

fn syllables_of_run(run: &str, force_numeric: bool) -> Option<Vec<Pinyin>> {
    let chunks = split_after_digits(run);
    let mut syllables = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.ends_with(|c: char| c.is_ascii_digit()) {
            syllables.push(parse_with(chunk, true).ok()?);
        } else if chunk.eq_ignore_ascii_case("r") && !syllables.is_empty() {
            syllables.push(erhua_like(chunk));
        } else if !force_numeric && has_tone_mark(chunk) {
            syllables.extend(diacritic_chunk(chunk)?);
        } else {
            return None;
        }
    }
    Some(syllables)
}

/// A diacritic syllable, optionally followed by an erhua `r` (`wànr`).
fn diacritic_chunk(chunk: &str) -> Option<Vec<Pinyin>> {
    if let Ok(pinyin) = parse_with(chunk, false) {
        return Some(vec![pinyin]);
    }
    let stem = chunk.strip_suffix(['r', 'R'])?;
    let pinyin = parse_with(stem, false).ok()?;
    let r = &chunk[stem.len()..];
    Some(vec![pinyin, erhua_like(r)])
}

fn erhua_like(r: &str) -> Pinyin {
    let mut erhua = Pinyin::erhua();
    erhua.base = r.to_string();
    erhua
}

fn split_after_digits(run: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for (at, c) in run.char_indices() {
        if c.is_ascii_digit() {
            chunks.push(&run[start..at + 1]);
            start = at + 1;
        }
    }
    if start < run.len() {
        chunks.push(&run[start..]);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_runs_after_tone_digits() {
        assert_eq!(split_after_digits("wan4r"), vec!["wan4", "r"]);
        assert_eq!(split_after_digits("Zhong1guo2"), vec!["Zhong1", "guo2"]);
        assert_eq!(split_after_digits("color"), vec!["color"]);
    }

    #[test]
    fn finds_well_formed_tags() {
        assert_eq!(tag_end("<b>rest"), Some(3));
        assert_eq!(tag_end("</span>"), Some(7));
        assert_eq!(tag_end("<>"), None);
        assert_eq!(tag_end("< <b>"), None);
        assert_eq!(tag_end("<unterminated"), None);
    }

    #[test]
    fn reads_span_colors() {
        assert_eq!(span_color(r#"<span style="color:#123456">"#), Some("#123456"));
        assert_eq!(span_color(r#"<span style="color: red;">"#), Some("red"));
        assert_eq!(span_color(r#"<span style="mehhhh!">"#), None);
        assert_eq!(span_color(r#"<span style="color:red;font-weight:bold">"#), None);
        assert_eq!(span_color(r#"<span style="color:">"#), None);
    }

    #[test]
    fn colon_only_joins_u_umlaut() {
        assert_eq!(word_run_len("lu:3 x"), 4);
        assert_eq!(word_run_len("you: x"), 3);
        assert_eq!(word_run_len("ma:3"), 2);
    }

    #[test]
    fn diacritic_erhua_splits_off_r() {
        let syllables = diacritic_chunk("wànr").unwrap();
        assert_eq!(syllables.len(), 2);
        assert!(syllables[1].is_er());
    }
}
