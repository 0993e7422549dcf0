//! End-to-end pipeline: readings, colored characters and formatted meanings
//! driven by a [`Config`].
//!
//! ```no_run
//! use pinyin_toolkit::{Config, Toolkit};
//!
//! let toolkit = Toolkit::from_config(Config::default())?;
//! println!("{}", toolkit.reading("你好"));
//! if let Some(meanings) = toolkit.formatted_meanings("书", None)? {
//!     println!("{meanings}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod translate;

use std::sync::Arc;

use pinyin_db::numbers::{meaning_from_number_like, reading_from_number_like};
use pinyin_db::{Dictionary, LexiconRegistry, Meanings, combine_meanings_mws};
use pinyin_transform::{
    AudioReading, AudioReadings, TieBreaker, ToneColors, colorize, mask_hanzi, tone_sandhi,
    trim_erhua,
};
use pinyin_types::{Rendering, Text, Word, flatten, flatten_with};
use tracing::debug;

pub use config::{
    CharacterSet, Config, ConfigError, DictLoadMode, MeaningNumbering, MeaningSeparator,
    ToneDisplay,
};
pub use translate::{
    TranslateError, TranslationOutcome, Translator, interpret_google_response,
    meanings_from_outcome, strip_html, translate_meanings,
};

pub struct Toolkit {
    config: Config,
    colors: ToneColors,
    registry: Arc<LexiconRegistry>,
}

impl Toolkit {
    /// Fails only when the configured tone palette is unusable.
    pub fn new(config: Config, registry: Arc<LexiconRegistry>) -> Result<Self, ConfigError> {
        let colors = config.tone_colors()?;
        Ok(Self {
            config,
            colors,
            registry,
        })
    }

    /// Toolkit with its own registry over the configured dictionary directory.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let registry = Arc::new(LexiconRegistry::new(
            config.dict_dir.clone(),
            config.load_mode(),
        ));
        Self::new(config, registry)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dictionary(&self) -> Dictionary {
        self.registry.dictionary(&self.config.dict_language)
    }

    /// Reading words after the configured erhua, sandhi and color passes.
    ///
    /// Number-like input (`1000AD`, `25%`) is read the way it is said aloud.
    pub fn reading_words(&self, text: &str) -> Vec<Word> {
        let dictionary = self.dictionary();
        let words = reading_from_number_like(text.trim(), &dictionary)
            .unwrap_or_else(|| dictionary.reading(text));
        let words = if self.config.trim_erhua {
            trim_erhua(&words)
        } else {
            words
        };
        let words = self.sandhi(words);
        if self.config.colorize {
            colorize(&self.colors, &words)
        } else {
            words
        }
    }

    pub fn reading(&self, text: &str) -> String {
        flatten_with(&self.reading_words(text), self.rendering())
    }

    /// Characters of `text` colored by their spoken tone.
    pub fn colored_characters(&self, text: &str) -> String {
        let words = self.sandhi(self.dictionary().tonedchars(text));
        flatten(&colorize(&self.colors, &words))
    }

    /// Meanings from the dictionary, a number-like expression or, when
    /// enabled and supplied, the translator; in that order.
    pub fn meanings(
        &self,
        text: &str,
        translator: Option<&dyn Translator>,
    ) -> Result<Option<Meanings>, TranslateError> {
        if let Some(found) = self.dictionary().meanings(text, self.config.simp_trad()) {
            return Ok(Some(found));
        }
        if let Some(meaning) = meaning_from_number_like(text.trim()) {
            let meanings = Text::new(meaning)
                .map(|t| vec![vec![Word::single(t)]])
                .unwrap_or_default();
            return Ok(Some(Meanings {
                meanings,
                measure_words: Vec::new(),
            }));
        }
        let translator = match translator {
            Some(translator) if self.config.fallback_on_translator => translator,
            _ => {
                debug!("no meaning for {text:?}");
                return Ok(None);
            }
        };
        let found = translate_meanings(translator, text, &self.config.dict_language)?;
        Ok(found.map(|meanings| Meanings {
            meanings,
            measure_words: Vec::new(),
        }))
    }

    /// Meanings rendered and joined according to the configuration, with
    /// the headword masked out of them when masking is on.
    pub fn formatted_meanings(
        &self,
        text: &str,
        translator: Option<&dyn Translator>,
    ) -> Result<Option<String>, TranslateError> {
        let Some(found) = self.meanings(text, translator)? else {
            return Ok(None);
        };
        let senses = if self.config.detect_measure_words {
            found.meanings
        } else {
            combine_meanings_mws(found)
        };
        let mask = self.config.format_hanzi_masking_character();
        let rendering = Rendering {
            tonified: self.config.should_tonify(),
            ..Rendering::default()
        };
        let rendered: Vec<String> = senses
            .iter()
            .map(|sense| {
                if self.config.hanzi_masking {
                    flatten_with(&mask_hanzi(text, &mask, sense), rendering)
                } else {
                    flatten_with(sense, rendering)
                }
            })
            .collect();
        Ok(Some(self.config.format_meanings(&rendered)))
    }

    /// Audio files speaking `text`, chosen from the best-covering pack.
    pub fn audio<'a>(
        &self,
        text: &str,
        readings: &'a AudioReadings,
        tie_breaker: &mut impl TieBreaker,
    ) -> AudioReading<'a> {
        readings.audio_reading(&self.reading_words(text), tie_breaker)
    }

    fn sandhi(&self, words: Vec<Word>) -> Vec<Word> {
        if self.config.tone_sandhi {
            tone_sandhi(&words)
        } else {
            words
        }
    }

    fn rendering(&self) -> Rendering {
        Rendering {
            tonified: self.config.should_tonify(),
            show_neutral: !self.config.hide_neutral_tone,
        }
    }
}
