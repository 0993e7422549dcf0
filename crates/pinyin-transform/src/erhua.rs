use pinyin_types::{Pinyin, Text, Token, TokenVisitor, TonedCharacter, Word};

struct DropErhua;

impl TokenVisitor for DropErhua {
    type Output = Option<Token>;

    fn visit_text(&mut self, text: &Text) -> Option<Token> {
        Some(Token::Text(text.clone()))
    }

    fn visit_pinyin(&mut self, pinyin: &Pinyin) -> Option<Token> {
        (!pinyin.is_er()).then(|| Token::Pinyin(pinyin.clone()))
    }

    fn visit_toned_character(&mut self, character: &TonedCharacter) -> Option<Token> {
        (!character.is_er()).then(|| Token::TonedCharacter(character.clone()))
    }
}

/// Remove erhua suffixes (`r5`, neutral 儿/兒); words left empty disappear.
pub fn trim_erhua(words: &[Word]) -> Vec<Word> {
    words
        .iter()
        .filter_map(|w| w.concat_map(&mut DropErhua))
        .collect()
}
