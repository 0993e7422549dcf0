use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use pinyin_db::{
    Dictionary, Lexicon, LexiconRegistry, LoadMode, SimpTrad, combine_meanings_mws,
};
use pinyin_types::{Token, flatten};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn dictionary(language: &str) -> Dictionary {
    let lexicon = Lexicon::load(fixture_dir(), language, LoadMode::Owned).expect("load fixtures");
    Dictionary::new(Arc::new(lexicon))
}

fn reading(dict: &Dictionary, text: &str) -> String {
    flatten(&dict.reading(text))
}

#[test]
fn loads_both_modes_identically() {
    for mode in [LoadMode::Mmap, LoadMode::Owned] {
        let lexicon = Lexicon::load(fixture_dir(), "en", mode).expect("load fixtures");
        assert_eq!(lexicon.language(), "en");
        assert!(lexicon.has_meanings());
        assert!(lexicon.lookup_exact("书").is_some());
        assert!(lexicon.lookup_exact("書").is_some());
        // duplicate 好 and the digit-keyed entry are not indexed twice
        assert_eq!(lexicon.lookup_exact("好").unwrap().definition, "/good/well/");
        assert!(lexicon.lookup_exact("2019冠状病毒病").is_none());
    }
}

#[test]
fn reads_sentences_in_simplified_traditional_and_western_punctuation() {
    let dict = dictionary("en");
    let expected = "ni3 hao3, wo3 xi3 huan xue2 xi2 Han4 yu3. wo3 de Han4 yu3 shui3 ping2 hen3 di1.";
    assert_eq!(reading(&dict, "你好，我喜欢学习汉语。我的汉语水平很低。"), expected);
    assert_eq!(reading(&dict, "你好，我喜歡學習漢語。我的漢語水平很低。"), expected);
    assert_eq!(reading(&dict, "你好, 我喜欢学习汉语. 我的汉语水平很低."), expected);
}

#[test]
fn punctuation_and_empty_input() {
    let dict = dictionary("en");
    assert_eq!(reading(&dict, "(你)好!"), "(ni3)hao3!");
    assert_eq!(reading(&dict, "你 (pr.)"), "ni3 (pr.)");
    assert_eq!(reading(&dict, ""), "");
    assert!(dict.reading("").is_empty());
}

#[test]
fn erhua_joins_the_previous_syllable() {
    let dict = dictionary("en");
    assert_eq!(reading(&dict, "两头儿"), "liang3 tou2r");
    assert_eq!(reading(&dict, "一塊兒"), "yi1 kuai4r");
    assert_eq!(reading(&dict, "哪儿"), "na3r");
}

#[test]
fn names_keep_their_middle_dot() {
    let dict = dictionary("en");
    assert_eq!(reading(&dict, "珍・奥斯汀"), "Zhen1 · Ao4 si1 ting1");
}

#[test]
fn unihan_covers_single_characters() {
    let dict = dictionary("en");
    assert_eq!(reading(&dict, "諓"), "jian4");
    // no data anywhere: kept as text
    assert_eq!(reading(&dict, "㐀"), "㐀");
}

#[test]
fn other_languages_fall_back_to_english_readings() {
    let fr = dictionary("fr");
    assert_eq!(reading(&fr, "数量积"), "shu4 liang4 ji1");
    assert!(fr.meanings("数量积", SimpTrad::Simp).is_none());
    let found = fr.meanings("评论", SimpTrad::Simp).expect("french meaning");
    assert_eq!(flatten(&found.meanings[0]), "commentaire (n.v.) (n)");

    let unknown = dictionary("foobar");
    assert!(!unknown.lexicon().has_meanings());
    assert_eq!(reading(&unknown, "个"), "ge4");
    assert!(unknown.meanings("个", SimpTrad::Simp).is_none());
}

#[test]
fn primary_readings_win_over_the_cross_reference() {
    let de = dictionary("de");
    assert_eq!(reading(&de, "生日"), "sheng1 ri4");
    let found = de.meanings("請", SimpTrad::Trad).expect("german meaning");
    let senses: Vec<String> = found.meanings.iter().map(|m| flatten(m)).collect();
    assert_eq!(senses, vec!["Bitte ! (u.E.) (Int)", "bitten, einladen (u.E.) (V)"]);
}

#[test]
fn meanings_with_measure_words() {
    let dict = dictionary("en");
    for (prefer, book) in [(SimpTrad::Simp, "书经"), (SimpTrad::Trad, "書經")] {
        let found = dict.meanings("书", prefer).expect("书 has meanings");
        let senses: Vec<String> = found.meanings.iter().map(|m| flatten(m)).collect();
        assert_eq!(
            senses,
            vec![
                "book".to_string(),
                "letter".to_string(),
                format!("see also {book} Book of History"),
            ]
        );
        let mws: Vec<(String, String)> = found
            .measure_words
            .iter()
            .map(|mw| (flatten(&mw.characters), flatten(&mw.pinyin)))
            .collect();
        let ce = if prefer == SimpTrad::Simp { "册" } else { "冊" };
        assert_eq!(
            mws,
            vec![
                ("本".to_string(), "ben3".to_string()),
                (ce.to_string(), "ce4".to_string()),
                ("部".to_string(), "bu4".to_string()),
            ]
        );
    }

    let combined = combine_meanings_mws(dict.meanings("书", SimpTrad::Simp).unwrap());
    assert_eq!(flatten(combined.last().unwrap()), "MW: 本 - ben3, 册 - ce4, 部 - bu4");
}

#[test]
fn embedded_references_get_tones() {
    let dict = dictionary("en");
    let found = dict.meanings("书", SimpTrad::Simp).unwrap();
    let see_also = &found.meanings[2];
    assert!(
        see_also
            .iter()
            .flatten()
            .any(|t| matches!(t, Token::TonedCharacter(c) if c.character == "书"))
    );
}

#[test]
fn meanings_ignore_surrounding_punctuation_only() {
    let dict = dictionary("en");
    assert!(dict.meanings("你好!!!", SimpTrad::Simp).is_some());
    assert!(dict.meanings("  你好  ", SimpTrad::Simp).is_some());
    assert!(dict.meanings("English", SimpTrad::Simp).is_none());
    assert!(dict.meanings("一杯啤酒", SimpTrad::Simp).is_none());
    assert!(dict.meanings("", SimpTrad::Simp).is_none());
}

#[test]
fn toned_characters_preserve_the_text() {
    let dict = dictionary("en");
    let words = dict.tonedchars("\t一个");
    assert_eq!(flatten(&words), "\t一个");
    assert!(words.iter().flatten().any(|t| t.toneinfo().is_some()));

    let words = dict.tonedchars("1994");
    assert_eq!(flatten(&words), "1994");
    assert!(words.iter().flatten().all(|t| t.toneinfo().is_none()));
}

#[test]
fn missing_directory_is_an_empty_lexicon() {
    let lexicon = Lexicon::load("/nonexistent/pinyin-dicts", "en", LoadMode::Mmap)
        .expect("missing files are not errors");
    assert!(!lexicon.has_meanings());
    let dict = Dictionary::new(Arc::new(lexicon));
    assert_eq!(reading(&dict, "你好 ni3"), "你好 ni3");
}

#[test]
fn malformed_lines_are_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut bytes = "你 你 [ni3] /you/\r\nbroken line\r\n好 好 hao3 /good/\r\n"
        .as_bytes()
        .to_vec();
    bytes.extend_from_slice(b"\xff\xfe \xff\xfe [ni3] /not utf-8/\r\n");
    fs::write(dir.path().join("cedict_ts.u8"), bytes).expect("write lexicon");
    let lexicon = Lexicon::load(dir.path(), "en", LoadMode::Mmap).expect("load");
    assert_eq!(lexicon.entry_count(), 1);
    assert_eq!(lexicon.lookup_exact("你").unwrap().definition, "/you/");
    assert!(lexicon.lookup_exact("好").is_none());
}

#[test]
fn registry_loads_each_language_once_across_threads() {
    let registry = Arc::new(LexiconRegistry::new(fixture_dir(), LoadMode::Mmap));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let language = if i % 2 == 0 { "en" } else { "de" };
                registry.lexicon(language)
            })
        })
        .collect();
    let lexicons: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, lexicon) in lexicons.iter().enumerate() {
        let first = &lexicons[i % 2];
        assert!(Arc::ptr_eq(lexicon, first));
    }
    assert_eq!(registry.languages(), vec!["de".to_string(), "en".to_string()]);
    assert_eq!(
        flatten(&registry.dictionary("en").reading("你好")),
        "ni3 hao3"
    );
}
