use pinyin_types::{
    COLOR_ATTRIBUTE, Pinyin, Text, Token, TokenVisitor, Tone, ToneKind, TonedCharacter, Word,
};

/// Five-entry palette, indexed by tone (neutral last).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToneColors([String; 5]);

impl ToneColors {
    pub fn new(colors: [String; 5]) -> Self {
        Self(colors)
    }

    pub fn color(&self, tone: Tone) -> &str {
        &self.0[tone.index()]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for ToneColors {
    fn default() -> Self {
        Self(["#ff0000", "#ffaa00", "#00aa00", "#0000ff", "#545454"].map(String::from))
    }
}

struct Colorizer<'a> {
    colors: &'a ToneColors,
}

impl Colorizer<'_> {
    fn paint(&self, token: Token, tone: Tone) -> Token {
        token.with_attribute(COLOR_ATTRIBUTE, self.colors.color(tone))
    }
}

impl TokenVisitor for Colorizer<'_> {
    type Output = Token;

    fn visit_text(&mut self, text: &Text) -> Token {
        Token::Text(text.clone())
    }

    fn visit_pinyin(&mut self, pinyin: &Pinyin) -> Token {
        self.paint(
            Token::Pinyin(pinyin.clone()),
            pinyin.toneinfo.tone(ToneKind::Spoken),
        )
    }

    fn visit_toned_character(&mut self, character: &TonedCharacter) -> Token {
        self.paint(
            Token::TonedCharacter(character.clone()),
            character.toneinfo.tone(ToneKind::Spoken),
        )
    }
}

/// Attach the spoken tone's color to every syllable and toned character.
pub fn colorize(colors: &ToneColors, words: &[Word]) -> Vec<Word> {
    let mut colorizer = Colorizer { colors };
    words.iter().map(|w| w.map(&mut colorizer)).collect()
}
