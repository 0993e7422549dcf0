use std::collections::HashSet;

use pinyin_types::{Pinyin, Text, Token, TokenVisitor, TonedCharacter, Word, is_han};

struct Masker<'a> {
    targets: HashSet<char>,
    mask: &'a str,
}

impl Masker<'_> {
    /// Replace each maximal run of target characters with one mask.
    fn mask_str(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut in_run = false;
        for c in s.chars() {
            if self.targets.contains(&c) {
                if !in_run {
                    out.push_str(self.mask);
                }
                in_run = true;
            } else {
                out.push(c);
                in_run = false;
            }
        }
        out
    }
}

impl TokenVisitor for Masker<'_> {
    type Output = Option<Token>;

    fn visit_text(&mut self, text: &Text) -> Option<Token> {
        Text::with_attributes(self.mask_str(text.as_str()), text.attributes().clone())
            .ok()
            .map(Token::Text)
    }

    fn visit_pinyin(&mut self, pinyin: &Pinyin) -> Option<Token> {
        Some(Token::Pinyin(pinyin.clone()))
    }

    fn visit_toned_character(&mut self, character: &TonedCharacter) -> Option<Token> {
        let masked = !character.character.is_empty()
            && character.character.chars().all(|c| self.targets.contains(&c));
        if !masked {
            return Some(Token::TonedCharacter(character.clone()));
        }
        Text::new(self.mask).ok().map(Token::Text)
    }
}

/// Hide the Han characters of `hanzi` wherever they occur in `words`.
///
/// Used to blank out the headword in example sentences and meanings. Western
/// forms such as `1000AD` contain no Han characters and are never masked.
pub fn mask_hanzi(hanzi: &str, mask: &str, words: &[Word]) -> Vec<Word> {
    let targets: HashSet<char> = hanzi.chars().filter(|c| is_han(*c)).collect();
    if targets.is_empty() {
        return words.to_vec();
    }
    let mut masker = Masker { targets, mask };
    words
        .iter()
        .filter_map(|w| w.concat_map(&mut masker))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ch, py, text, word};

    #[test]
    fn masks_text() {
        let words = [
            word(vec![text("World")]),
            word(vec![text("H爱!")]),
            word(vec![text(" "), text("J爱")]),
        ];
        assert_eq!(
            mask_hanzi("爱", "mask", &words),
            vec![
                word(vec![text("World")]),
                word(vec![text("Hmask!")]),
                word(vec![text(" "), text("Jmask")]),
            ]
        );
    }

    #[test]
    fn masks_toned_characters_but_not_pinyin() {
        let words = [
            word(vec![py("hen", 3)]),
            word(vec![ch("狠", 3)]),
            word(vec![ch("mhh", 2)]),
        ];
        assert_eq!(
            mask_hanzi("狠", "chicken", &words),
            vec![
                word(vec![py("hen", 3)]),
                word(vec![text("chicken")]),
                word(vec![ch("mhh", 2)]),
            ]
        );
    }

    #[test]
    fn multi_character_runs_become_one_mask() {
        let words = [
            word(vec![ch("没", 2)]),
            word(vec![ch("有", 3)]),
            word(vec![text("没有 le he said 有 to me! 没有!")]),
        ];
        assert_eq!(
            mask_hanzi("没有", "XXX", &words),
            vec![
                word(vec![text("XXX")]),
                word(vec![text("XXX")]),
                word(vec![text("XXX le he said XXX to me! XXX!")]),
            ]
        );
    }

    #[test]
    fn western_forms_are_not_masked() {
        let words = [word(vec![text("In 1000AD...")])];
        assert_eq!(mask_hanzi("1000AD", "XXX", &words), words.to_vec());
    }
}
