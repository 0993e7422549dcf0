use std::path::PathBuf;
use std::{env, fs};

use pinyin_db::{LoadMode, SimpTrad};
use pinyin_transform::ToneColors;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DICT_DIR: &str = "dictionaries";
pub const DEFAULT_DICT_LANGUAGE: &str = "en";
const DEFAULT_MEANING_NUMBER_COLOR: &str = "#aaaaaa";
const DEFAULT_MASKING_CHARACTER: &str = "~";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tone palette needs exactly 5 colors, got {0}")]
    InvalidToneColors(usize),
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictLoadMode {
    #[default]
    Mmap,
    Owned,
}

impl From<DictLoadMode> for LoadMode {
    fn from(mode: DictLoadMode) -> Self {
        match mode {
            DictLoadMode::Mmap => LoadMode::Mmap,
            DictLoadMode::Owned => LoadMode::Owned,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterSet {
    #[default]
    Simp,
    Trad,
}

impl From<CharacterSet> for SimpTrad {
    fn from(set: CharacterSet) -> Self {
        match set {
            CharacterSet::Simp => SimpTrad::Simp,
            CharacterSet::Trad => SimpTrad::Trad,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneDisplay {
    Numeric,
    #[default]
    Tonified,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeaningNumbering {
    ArabicParens,
    #[default]
    CircledChinese,
    CircledArabic,
    None,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeaningSeparator {
    Lines,
    #[default]
    Commas,
    Custom,
}

/// User-facing settings for the reading and meaning pipeline.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dict_dir: PathBuf,
    pub dict_language: String,
    pub load_mode: DictLoadMode,
    pub prefer_simp_trad: CharacterSet,
    pub tone_display: ToneDisplay,
    pub hide_neutral_tone: bool,
    pub tone_sandhi: bool,
    pub colorize: bool,
    pub trim_erhua: bool,
    pub tone_colors: Vec<String>,
    pub meaning_numbering: MeaningNumbering,
    pub meaning_separator: MeaningSeparator,
    pub custom_meaning_separator: String,
    pub color_meaning_numbers: bool,
    pub meaning_number_color: String,
    pub emphasise_main_meaning: bool,
    pub main_meaning_emphasis_tag: String,
    pub hanzi_masking: bool,
    pub hanzi_masking_character: String,
    pub detect_measure_words: bool,
    pub fallback_on_translator: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dict_dir: PathBuf::from(DEFAULT_DICT_DIR),
            dict_language: DEFAULT_DICT_LANGUAGE.to_string(),
            load_mode: DictLoadMode::default(),
            prefer_simp_trad: CharacterSet::default(),
            tone_display: ToneDisplay::default(),
            hide_neutral_tone: true,
            tone_sandhi: true,
            colorize: true,
            trim_erhua: false,
            tone_colors: ToneColors::default().as_slice().to_vec(),
            meaning_numbering: MeaningNumbering::default(),
            meaning_separator: MeaningSeparator::default(),
            custom_meaning_separator: " | ".to_string(),
            color_meaning_numbers: true,
            meaning_number_color: DEFAULT_MEANING_NUMBER_COLOR.to_string(),
            emphasise_main_meaning: false,
            main_meaning_emphasis_tag: "small".to_string(),
            hanzi_masking: true,
            hanzi_masking_character: DEFAULT_MASKING_CHARACTER.to_string(),
            detect_measure_words: true,
            fallback_on_translator: false,
        }
    }
}

impl Config {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Defaults, then the JSON file named by `PINYIN_CONFIG`, then the
    /// individual `PINYIN_*` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup("PINYIN_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };
        if let Some(dir) = lookup("PINYIN_DICT_DIR") {
            config.dict_dir = PathBuf::from(dir);
        }
        if let Some(language) = lookup("PINYIN_DICT_LANGUAGE").filter(|l| !l.trim().is_empty()) {
            config.dict_language = language.trim().to_ascii_lowercase();
        }
        if let Some(raw) = lookup("PINYIN_LOAD_MODE") {
            config.load_mode = parse_load_mode(&raw).ok_or(ConfigError::InvalidValue {
                var: "PINYIN_LOAD_MODE",
                value: raw,
            })?;
        }
        if let Some(raw) = lookup("PINYIN_PREFER") {
            config.prefer_simp_trad =
                parse_character_set(&raw).ok_or(ConfigError::InvalidValue {
                    var: "PINYIN_PREFER",
                    value: raw,
                })?;
        }
        Ok(config)
    }

    pub fn load_mode(&self) -> LoadMode {
        self.load_mode.into()
    }

    pub fn simp_trad(&self) -> SimpTrad {
        self.prefer_simp_trad.into()
    }

    pub fn should_tonify(&self) -> bool {
        self.tone_display == ToneDisplay::Tonified
    }

    pub fn tone_colors(&self) -> Result<ToneColors, ConfigError> {
        let colors: [String; 5] = self
            .tone_colors
            .clone()
            .try_into()
            .map_err(|colors: Vec<String>| ConfigError::InvalidToneColors(colors.len()))?;
        Ok(ToneColors::new(colors))
    }

    /// Marker placed before the `n`th meaning (1-based), possibly colored.
    pub fn meaning_number(&self, n: usize) -> String {
        let parens = || format!("({n})");
        let number = match self.meaning_numbering {
            MeaningNumbering::ArabicParens => parens(),
            MeaningNumbering::CircledChinese => circled(n, 0x3280, 10)
                .or_else(|| (n > 10).then(|| circled(n, 0x2460, 20)).flatten())
                .unwrap_or_else(parens),
            MeaningNumbering::CircledArabic => circled(n, 0x2460, 20).unwrap_or_else(parens),
            MeaningNumbering::None => String::new(),
        };
        if number.is_empty() {
            number
        } else {
            self.colored(number)
        }
    }

    /// Join rendered meanings with numbering, separator and emphasis applied.
    pub fn format_meanings(&self, meanings: &[String]) -> String {
        match meanings {
            [] => String::new(),
            [only] => only.clone(),
            [main, rest @ ..] if self.emphasise_main_meaning => {
                let tag = self.main_meaning_emphasis_tag.trim();
                let rest = self.number_meanings(rest, 2);
                let separator = self.separator();
                match tag.strip_suffix('/') {
                    Some(name) => format!("{main}{separator}<{} />{rest}", name.trim()),
                    None => format!("{main}{separator}<{tag}>{rest}</{tag}>"),
                }
            }
            _ => self.number_meanings(meanings, 1),
        }
    }

    pub fn format_hanzi_masking_character(&self) -> String {
        self.colored(self.hanzi_masking_character.clone())
    }

    fn number_meanings(&self, meanings: &[String], first: usize) -> String {
        if let [only] = meanings {
            return only.clone();
        }
        meanings
            .iter()
            .enumerate()
            .map(|(i, meaning)| {
                let number = self.meaning_number(first + i);
                if number.is_empty() {
                    meaning.clone()
                } else {
                    format!("{number} {meaning}")
                }
            })
            .collect::<Vec<_>>()
            .join(self.separator())
    }

    fn separator(&self) -> &str {
        match self.meaning_separator {
            MeaningSeparator::Lines => "<br />",
            MeaningSeparator::Commas => ", ",
            MeaningSeparator::Custom => self.custom_meaning_separator.as_str(),
        }
    }

    fn colored(&self, s: String) -> String {
        if self.color_meaning_numbers {
            format!(
                r#"<span style="color:{}">{s}</span>"#,
                self.meaning_number_color
            )
        } else {
            s
        }
    }
}

/// `n`th character of a run of `count` circled numbers starting at `base`.
fn circled(n: usize, base: u32, count: usize) -> Option<String> {
    if n == 0 || n > count {
        return None;
    }
    let offset = u32::try_from(n - 1).ok()?;
    char::from_u32(base + offset).map(String::from)
}

fn parse_load_mode(raw: &str) -> Option<DictLoadMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mmap" => Some(DictLoadMode::Mmap),
        "owned" => Some(DictLoadMode::Owned),
        _ => None,
    }
}

fn parse_character_set(raw: &str) -> Option<CharacterSet> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "simp" | "simplified" => Some(CharacterSet::Simp),
        "trad" | "traditional" => Some(CharacterSet::Trad),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn plain(numbering: MeaningNumbering, separator: MeaningSeparator) -> Config {
        Config {
            meaning_numbering: numbering,
            meaning_separator: separator,
            color_meaning_numbers: false,
            emphasise_main_meaning: false,
            ..Config::default()
        }
    }

    fn numbers(config: &Config) -> Vec<String> {
        [2, 10, 21].map(|n| config.meaning_number(n)).to_vec()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn meaning_numbers_per_style() {
        use MeaningNumbering::*;
        let sep = MeaningSeparator::Commas;
        assert_eq!(numbers(&plain(ArabicParens, sep)), ["(2)", "(10)", "(21)"]);
        assert_eq!(numbers(&plain(CircledChinese, sep)), ["㊁", "㊉", "(21)"]);
        assert_eq!(numbers(&plain(CircledArabic, sep)), ["②", "⑩", "(21)"]);
        assert_eq!(numbers(&plain(None, sep)), ["", "", ""]);

        let colored = Config {
            color_meaning_numbers: true,
            meaning_number_color: "#aabbcc".to_string(),
            ..plain(ArabicParens, sep)
        };
        assert_eq!(
            numbers(&colored),
            [
                r#"<span style="color:#aabbcc">(2)</span>"#,
                r#"<span style="color:#aabbcc">(10)</span>"#,
                r#"<span style="color:#aabbcc">(21)</span>"#,
            ]
        );
    }

    #[test]
    fn format_meanings_options() {
        use MeaningNumbering::*;
        use MeaningSeparator::*;
        let ab = strings(&["a", "b"]);
        assert_eq!(plain(ArabicParens, Lines).format_meanings(&ab), "(1) a<br />(2) b");
        assert_eq!(plain(CircledChinese, Commas).format_meanings(&ab), "㊀ a, ㊁ b");

        let custom = |numbering, separator: &str| Config {
            custom_meaning_separator: separator.to_string(),
            ..plain(numbering, Custom)
        };
        assert_eq!(custom(CircledArabic, " | ").format_meanings(&ab), "① a | ② b");
        assert_eq!(custom(None, " ^_^ ").format_meanings(&ab), "a ^_^ b");

        let colored = Config {
            color_meaning_numbers: true,
            meaning_number_color: "#aabbcc".to_string(),
            ..plain(ArabicParens, Lines)
        };
        assert_eq!(
            colored.format_meanings(&ab),
            r#"<span style="color:#aabbcc">(1)</span> a<br /><span style="color:#aabbcc">(2)</span> b"#
        );
    }

    #[test]
    fn single_meaning_is_unnumbered() {
        let config = plain(MeaningNumbering::ArabicParens, MeaningSeparator::Lines);
        assert_eq!(config.format_meanings(&strings(&["a"])), "a");
        assert_eq!(config.format_meanings(&[]), "");
    }

    #[test]
    fn numbering_falls_back_to_parens_past_twenty() {
        let config = plain(MeaningNumbering::CircledChinese, MeaningSeparator::Commas);
        let meanings: Vec<String> = (1..=21).map(|n| n.to_string()).collect();
        assert_eq!(
            config.format_meanings(&meanings),
            "㊀ 1, ㊁ 2, ㊂ 3, ㊃ 4, ㊄ 5, ㊅ 6, ㊆ 7, ㊇ 8, ㊈ 9, ㊉ 10, ⑪ 11, ⑫ 12, ⑬ 13, ⑭ 14, ⑮ 15, ⑯ 16, ⑰ 17, ⑱ 18, ⑲ 19, ⑳ 20, (21) 21"
        );
    }

    #[test]
    fn emphasised_main_meaning() {
        let emphasis = |config: Config, tag: &str| Config {
            emphasise_main_meaning: true,
            main_meaning_emphasis_tag: tag.to_string(),
            ..config
        };

        let commas = emphasis(
            plain(MeaningNumbering::CircledChinese, MeaningSeparator::Commas),
            "br/",
        );
        assert_eq!(commas.format_meanings(&strings(&["a", "b", "c"])), "a, <br />㊁ b, ㊂ c");
        assert_eq!(commas.format_meanings(&strings(&["a", "b"])), "a, <br />b");
        assert_eq!(commas.format_meanings(&strings(&["a"])), "a");

        let small = emphasis(
            Config {
                custom_meaning_separator: " ^_^ ".to_string(),
                ..plain(MeaningNumbering::None, MeaningSeparator::Custom)
            },
            "small",
        );
        assert_eq!(
            small.format_meanings(&strings(&["a", "b", "c", "d"])),
            "a ^_^ <small>b ^_^ c ^_^ d</small>"
        );

        let lines = emphasis(
            Config {
                color_meaning_numbers: true,
                meaning_number_color: "#aabbcc".to_string(),
                ..plain(MeaningNumbering::ArabicParens, MeaningSeparator::Lines)
            },
            "mehhh/",
        );
        assert_eq!(
            lines.format_meanings(&strings(&["a", "b", "c"])),
            r#"a<br /><mehhh /><span style="color:#aabbcc">(2)</span> b<br /><span style="color:#aabbcc">(3)</span> c"#
        );
    }

    #[test]
    fn hanzi_masking_character() {
        let config = Config {
            hanzi_masking_character: "MASKED".to_string(),
            color_meaning_numbers: true,
            meaning_number_color: "#abcdef".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.format_hanzi_masking_character(),
            r#"<span style="color:#abcdef">MASKED</span>"#
        );
        let uncolored = Config {
            color_meaning_numbers: false,
            ..config
        };
        assert_eq!(uncolored.format_hanzi_masking_character(), "MASKED");
    }

    #[test]
    fn tone_display() {
        let tonified = Config::from_json(r#"{"tone_display": "tonified"}"#).unwrap();
        assert!(tonified.should_tonify());
        let numeric = Config::from_json(r#"{"tone_display": "numeric"}"#).unwrap();
        assert!(!numeric.should_tonify());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            Config::from_json(r#"{"dict_language": "fr", "meaning_numbering": "circledArabic"}"#)
                .unwrap();
        assert_eq!(config.dict_language, "fr");
        assert_eq!(config.meaning_numbering, MeaningNumbering::CircledArabic);
        assert_eq!(config.tone_colors, Config::default().tone_colors);
        assert_eq!(config.prefer_simp_trad, CharacterSet::Simp);
        assert!(matches!(
            Config::from_json(r#"{"tone_display": "sideways"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config {
            dict_language: "de".to_string(),
            prefer_simp_trad: CharacterSet::Trad,
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn tone_palette_must_have_five_colors() {
        let config = Config {
            tone_colors: vec!["#000000".to_string()],
            ..Config::default()
        };
        assert!(matches!(
            config.tone_colors(),
            Err(ConfigError::InvalidToneColors(1))
        ));
        assert_eq!(Config::default().tone_colors().unwrap(), ToneColors::default());
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PINYIN_DICT_DIR", "/srv/dicts"),
            ("PINYIN_DICT_LANGUAGE", " DE "),
            ("PINYIN_LOAD_MODE", "Owned"),
            ("PINYIN_PREFER", "trad"),
        ]);
        let config = Config::from_vars(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.dict_dir, PathBuf::from("/srv/dicts"));
        assert_eq!(config.dict_language, "de");
        assert_eq!(config.load_mode(), LoadMode::Owned);
        assert_eq!(config.simp_trad(), SimpTrad::Trad);

        let defaults = Config::from_vars(|_| None).unwrap();
        assert_eq!(defaults, Config::default());
        assert_eq!(defaults.load_mode(), LoadMode::Mmap);
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let err = Config::from_vars(|k| (k == "PINYIN_LOAD_MODE").then(|| "paged".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: "PINYIN_LOAD_MODE", .. }
        ));
        let err = Config::from_vars(|k| (k == "PINYIN_PREFER").then(|| "both".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "PINYIN_PREFER", .. }));
    }

    #[test]
    fn config_file_is_read_before_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pinyin.json");
        fs::write(&path, r#"{"dict_language": "fr", "tone_sandhi": false}"#).unwrap();
        let path_str = path.to_string_lossy().into_owned();
        let config = Config::from_vars(|k| match k {
            "PINYIN_CONFIG" => Some(path_str.clone()),
            "PINYIN_PREFER" => Some("trad".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.dict_language, "fr");
        assert!(!config.tone_sandhi);
        assert_eq!(config.prefer_simp_trad, CharacterSet::Trad);

        let missing = Config::from_vars(|k| {
            (k == "PINYIN_CONFIG").then(|| "/nonexistent/pinyin.json".to_string())
        });
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
