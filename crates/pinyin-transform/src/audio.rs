//! Choose audio files for a reading from the available media packs.
//!
//! Packs are plain filename indexes supplied by the host; nothing here reads
//! the filesystem. The pack covering the most syllables wins, and ties are
//! settled by an injected [`TieBreaker`] so repeated lookups spread across
//! equally good voices.

use std::collections::HashMap;

use pinyin_types::{Pinyin, Token, Tone, ToneKind, Word};
use rand::Rng;
use rand::rngs::ThreadRng;
use tracing::debug;

/// One set of syllable recordings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MediaPack {
    name: String,
    /// Lower-cased filename to the filename as stored.
    files: HashMap<String, String>,
}

impl MediaPack {
    /// Pack from `(filename, stored filename)` pairs; lookups ignore case.
    pub fn new<I>(name: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            name: name.into(),
            files: files
                .into_iter()
                .map(|(key, stored)| (key.to_lowercase(), stored))
                .collect(),
        }
    }

    /// Pack whose files are stored under their own names.
    pub fn from_filenames<I, S>(name: impl Into<String>, filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            filenames.into_iter().map(|f| {
                let f = f.into();
                (f.clone(), f)
            }),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn lookup(&self, filename: &str) -> Option<&str> {
        self.files.get(&filename.to_lowercase()).map(String::as_str)
    }
}

/// Picks one of `candidates` equally good options.
pub trait TieBreaker {
    /// Index in `0..candidates`; only called with `candidates >= 2`.
    fn choose(&mut self, candidates: usize) -> usize;
}

/// Uniformly random tie-breaking.
pub struct RandomTieBreaker<R = ThreadRng>(R);

impl<R: Rng> RandomTieBreaker<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl Default for RandomTieBreaker {
    fn default() -> Self {
        Self(rand::thread_rng())
    }
}

impl<R: Rng> TieBreaker for RandomTieBreaker<R> {
    fn choose(&mut self, candidates: usize) -> usize {
        self.0.gen_range(0..candidates)
    }
}

/// Files chosen for one reading.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AudioReading<'a> {
    /// `None` only when no packs are available.
    pub pack: Option<&'a MediaPack>,
    /// Stored filenames in reading order.
    pub files: Vec<String>,
    /// Some syllable had no recording in the chosen pack.
    pub media_missing: bool,
}

/// Audio lookup over a fixed set of packs and preferred extensions.
pub struct AudioReadings {
    packs: Vec<MediaPack>,
    extensions: Vec<String>,
}

impl AudioReadings {
    /// `extensions` include the dot and are tried in order (`.mp3`, `.ogg`).
    pub fn new<S: Into<String>>(packs: Vec<MediaPack>, extensions: impl IntoIterator<Item = S>) -> Self {
        Self {
            packs,
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn packs(&self) -> &[MediaPack] {
        &self.packs
    }

    pub fn audio_reading(
        &self,
        words: &[Word],
        tie_breaker: &mut impl TieBreaker,
    ) -> AudioReading<'_> {
        let syllables: Vec<&Pinyin> = words
            .iter()
            .flatten()
            .filter_map(|token| match token {
                Token::Pinyin(pinyin) if !pinyin.is_er() => Some(pinyin),
                _ => None,
            })
            .collect();

        let resolved: Vec<Vec<String>> = self
            .packs
            .iter()
            .map(|pack| {
                syllables
                    .iter()
                    .filter_map(|pinyin| self.find(pack, pinyin))
                    .collect()
            })
            .collect();
        let Some(best) = resolved.iter().map(Vec::len).max() else {
            return AudioReading {
                pack: None,
                files: Vec::new(),
                media_missing: !syllables.is_empty(),
            };
        };
        let tied: Vec<usize> = (0..resolved.len())
            .filter(|i| resolved[*i].len() == best)
            .collect();
        let chosen = match tied.len() {
            1 => tied[0],
            n => tied[tie_breaker.choose(n).min(n - 1)],
        };
        debug!(
            "audio pack {} covers {best} of {} syllables",
            self.packs[chosen].name(),
            syllables.len()
        );
        AudioReading {
            pack: Some(&self.packs[chosen]),
            media_missing: best < syllables.len(),
            files: resolved.into_iter().nth(chosen).unwrap_or_default(),
        }
    }

    fn find(&self, pack: &MediaPack, pinyin: &Pinyin) -> Option<String> {
        let candidates = candidate_stems(pinyin);
        self.extensions.iter().find_map(|ext| {
            candidates
                .iter()
                .find_map(|stem| pack.lookup(&format!("{stem}{ext}")))
                .map(str::to_string)
        })
    }
}

/// Filename stems for a syllable, most preferred first.
fn candidate_stems(pinyin: &Pinyin) -> Vec<String> {
    let base = pinyin.base.to_lowercase();
    let bases = if base.contains('ü') {
        vec![base.replace('ü', "v"), base.replace('ü', "u:")]
    } else {
        vec![base]
    };
    let tones: Vec<String> = match pinyin.toneinfo.tone(ToneKind::Spoken) {
        Tone::Neutral => vec!["5".to_string(), String::new(), "4".to_string()],
        tone => vec![tone.to_string()],
    };
    bases
        .iter()
        .flat_map(|base| tones.iter().map(move |tone| format!("{base}{tone}")))
        .collect()
}
