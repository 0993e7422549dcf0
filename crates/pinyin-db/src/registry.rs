use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::warn;

use crate::{Dictionary, LoadMode, Lexicon};

type Slot = Arc<OnceLock<Arc<Lexicon>>>;

/// Process-wide cache of lexicons, loaded at most once per language.
///
/// Concurrent first requests for the same language block on a single load;
/// other languages proceed independently. A lexicon that fails to load is
/// cached as empty so later callers do not retry.
pub struct LexiconRegistry {
    dict_dir: PathBuf,
    mode: LoadMode,
    lexicons: DashMap<String, Slot>,
}

impl LexiconRegistry {
    pub fn new(dict_dir: impl Into<PathBuf>, mode: LoadMode) -> Self {
        Self {
            dict_dir: dict_dir.into(),
            mode,
            lexicons: DashMap::new(),
        }
    }

    /// Register an already built lexicon under its language.
    pub fn with_lexicon(self, lexicon: Lexicon) -> Self {
        let language = lexicon.language().to_string();
        self.lexicons
            .insert(language, Arc::new(OnceLock::from(Arc::new(lexicon))));
        self
    }

    pub fn dict_dir(&self) -> &PathBuf {
        &self.dict_dir
    }

    pub fn lexicon(&self, language: &str) -> Arc<Lexicon> {
        // clone the slot out so the shard lock is not held while loading
        let slot = self
            .lexicons
            .entry(language.to_string())
            .or_insert_with(|| Arc::new(OnceLock::new()))
            .clone();
        slot.get_or_init(|| {
            let lexicon = Lexicon::load(&self.dict_dir, language, self.mode).unwrap_or_else(|err| {
                warn!("failed to load {language} lexicon from {}: {err:#}", self.dict_dir.display());
                Lexicon::empty(language)
            });
            Arc::new(lexicon)
        })
        .clone()
    }

    pub fn dictionary(&self, language: &str) -> Dictionary {
        Dictionary::new(self.lexicon(language))
    }

    /// Languages requested or registered so far.
    pub fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.lexicons.iter().map(|e| e.key().clone()).collect();
        languages.sort();
        languages
    }
}
