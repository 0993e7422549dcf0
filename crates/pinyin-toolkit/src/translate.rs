//! Machine translation as a last resort for meanings.
//!
//! The toolkit never talks to a network itself. Callers plug in a
//! [`Translator`]; [`interpret_google_response`] decodes the JSON bodies the
//! Google Translate endpoint has produced over the years.

use pinyin_types::{Text, Word};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error("malformed translation response: {0}")]
    MalformedResponse(String),
}

/// Result of one translation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranslationOutcome {
    Phrase(String),
    /// A phrase plus dictionary-style groups of `(part of speech, terms)`.
    Definitions {
        phrase: String,
        groups: Vec<(String, Vec<String>)>,
    },
    /// The service answered with the query itself.
    NotAvailable,
    Unreachable,
    Malformed(String),
}

pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, language: &str) -> TranslationOutcome;
}

/// Translate `query` into `language`, returning one word list per meaning.
///
/// HTML is stripped first; a query with no text left is never sent.
pub fn translate_meanings(
    translator: &dyn Translator,
    query: &str,
    language: &str,
) -> Result<Option<Vec<Vec<Word>>>, TranslateError> {
    let query = strip_html(query);
    let query = query.trim();
    if query.is_empty() {
        return Ok(None);
    }
    info!("falling back on translation of {query:?} to {language}");
    meanings_from_outcome(translator.translate(query, language))
}

pub fn meanings_from_outcome(
    outcome: TranslationOutcome,
) -> Result<Option<Vec<Vec<Word>>>, TranslateError> {
    let line = |s: String| Text::new(s).map(|t| vec![Word::single(t)]).ok();
    match outcome {
        TranslationOutcome::Phrase(phrase) => Ok(line(phrase).map(|l| vec![l])),
        TranslationOutcome::Definitions { phrase, groups } => {
            let meanings: Vec<Vec<Word>> = line(phrase)
                .into_iter()
                .chain(
                    groups
                        .into_iter()
                        .filter_map(|(pos, terms)| line(format!("{pos}: {}", terms.join(", ")))),
                )
                .collect();
            Ok((!meanings.is_empty()).then_some(meanings))
        }
        TranslationOutcome::NotAvailable => Ok(None),
        TranslationOutcome::Unreachable => {
            warn!("translator unreachable");
            Ok(None)
        }
        TranslationOutcome::Malformed(detail) => Err(TranslateError::MalformedResponse(detail)),
    }
}

/// Remove `<...>` tags, keeping the text between them.
pub fn strip_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Decode a raw Google Translate response body for `query`.
///
/// Handles a bare JSON string, the positional list formats (flat and nested)
/// and the `sentences`/`dict` object. Elided list entries (`[a,,b]`) read as
/// `null`. A translation identical to the query is [`TranslationOutcome::NotAvailable`].
pub fn interpret_google_response(query: &str, body: &str) -> TranslationOutcome {
    let value: Value = match serde_json::from_str(&fill_elided_values(body)) {
        Ok(value) => value,
        Err(err) => return TranslationOutcome::Malformed(format!("unparseable response: {err}")),
    };
    interpret_value(query, &value)
        .unwrap_or_else(|| TranslationOutcome::Malformed(format!("unexpected response {value}")))
}

fn interpret_value(query: &str, value: &Value) -> Option<TranslationOutcome> {
    match value {
        Value::String(phrase) => Some(phrase_outcome(query, phrase, Vec::new())),
        Value::Array(items) => match items.first()? {
            // [[["Good","好",""]],[["verb",["Love","Like"]],...],"zh-CN"]
            Value::Array(sentences) => {
                let first = sentences.first()?.as_array()?;
                let translated = first.first()?.as_str()?;
                if first.get(1).and_then(Value::as_str) == Some(translated) {
                    return Some(TranslationOutcome::NotAvailable);
                }
                let groups = match items.get(1) {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(defs)) => {
                        defs.iter().map(nested_group).collect::<Option<Vec<_>>>()?
                    }
                    Some(_) => return None,
                };
                Some(phrase_outcome(query, translated, groups))
            }
            // ["Well",[["verb","like","love"],...]]
            Value::String(phrase) => {
                let groups = match items.get(1) {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(defs)) => {
                        defs.iter().map(flat_group).collect::<Option<Vec<_>>>()?
                    }
                    Some(_) => return None,
                };
                Some(phrase_outcome(query, phrase, groups))
            }
            _ => None,
        },
        // {"sentences":[{"trans":"Well","orig":"好"}],"dict":[{"pos":"verb","terms":[...]}]}
        Value::Object(map) => {
            let sentences = map.get("sentences")?.as_array()?;
            let phrase = sentences
                .iter()
                .map(|s| s.get("trans").and_then(Value::as_str))
                .collect::<Option<Vec<_>>>()?
                .join(" ");
            let groups = match map.get("dict") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(defs)) => {
                    defs.iter().map(object_group).collect::<Option<Vec<_>>>()?
                }
                Some(_) => return None,
            };
            Some(phrase_outcome(query, &phrase, groups))
        }
        _ => None,
    }
}

fn phrase_outcome(
    query: &str,
    phrase: &str,
    groups: Vec<(String, Vec<String>)>,
) -> TranslationOutcome {
    if phrase == query {
        TranslationOutcome::NotAvailable
    } else if groups.is_empty() {
        TranslationOutcome::Phrase(phrase.to_string())
    } else {
        TranslationOutcome::Definitions {
            phrase: phrase.to_string(),
            groups,
        }
    }
}

fn nested_group(def: &Value) -> Option<(String, Vec<String>)> {
    let def = def.as_array()?;
    let terms = def
        .get(1)?
        .as_array()?
        .iter()
        .map(|t| t.as_str().map(str::to_lowercase))
        .collect::<Option<Vec<_>>>()?;
    Some((capitalize(def.first()?.as_str()?), terms))
}

fn flat_group(def: &Value) -> Option<(String, Vec<String>)> {
    let (pos, terms) = def.as_array()?.split_first()?;
    let terms = terms
        .iter()
        .map(|t| t.as_str().map(String::from))
        .collect::<Option<Vec<_>>>()?;
    Some((capitalize(pos.as_str()?), terms))
}

fn object_group(def: &Value) -> Option<(String, Vec<String>)> {
    let terms = def
        .get("terms")?
        .as_array()?
        .iter()
        .map(|t| t.as_str().map(String::from))
        .collect::<Option<Vec<_>>>()?;
    Some((capitalize(def.get("pos")?.as_str()?), terms))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Insert `null` where a value was left out: `[,`, `,,`, `,]` and `:}`.
fn fill_elided_values(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_string = false;
    let mut escaped = false;
    // last structural character outside strings, if nothing followed it
    let mut pending: Option<char> = None;
    for c in body.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c.is_whitespace() {
            out.push(c);
            continue;
        }
        let missing = matches!(
            (pending, c),
            (Some('[' | ',' | ':'), ',') | (Some(','), ']') | (Some(':'), '}' | ',')
        );
        if missing {
            out.push_str("null");
        }
        out.push(c);
        pending = matches!(c, '[' | ',' | ':' | '{').then_some(c);
        in_string = c == '"';
    }
    out
}
