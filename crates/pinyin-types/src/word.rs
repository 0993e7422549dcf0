use crate::{COLOR_ATTRIBUTE, ModelError, Text, ToneKind, Token, TokenVisitor, TonedCharacter};

/// Non-empty ordered run of tokens forming one semantic unit.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Word {
    tokens: Vec<Token>,
}

impl Word {
    pub fn new(tokens: Vec<Token>) -> Result<Self, ModelError> {
        if tokens.is_empty() {
            return Err(ModelError::EmptyWord);
        }
        Ok(Self { tokens })
    }

    pub fn single(token: impl Into<Token>) -> Self {
        Self {
            tokens: vec![token.into()],
        }
    }

    /// Build a word from optional tokens, skipping the absent ones.
    pub fn from_optional<I>(tokens: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = Option<Token>>,
    {
        Self::new(tokens.into_iter().flatten().collect())
    }

    /// Join reading syllables with single spaces, gluing erhua onto its predecessor.
    ///
    /// `[hen3, ma5, r5]` becomes `hen3 mar`.
    pub fn spaced_from_unspaced<I>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut spaced = Vec::new();
        for token in tokens {
            if !spaced.is_empty() && !token.is_er() {
                spaced.push(Token::Text(Text::space()));
            }
            spaced.push(token);
        }
        Self::new(spaced).ok()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn first(&self) -> &Token {
        &self.tokens[0]
    }

    pub fn last(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    pub fn push(&mut self, token: impl Into<Token>) {
        self.tokens.push(token.into());
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Visit every token in order, collecting the visitor's results.
    pub fn accept<V: TokenVisitor + ?Sized>(&self, visitor: &mut V) -> Vec<V::Output> {
        self.tokens.iter().map(|t| t.accept(visitor)).collect()
    }

    /// Rewrite each token one-for-one.
    pub fn map<V>(&self, visitor: &mut V) -> Word
    where
        V: TokenVisitor<Output = Token> + ?Sized,
    {
        Word {
            tokens: self.accept(visitor),
        }
    }

    /// Rewrite each token into zero or more tokens; `None` when nothing is left.
    pub fn concat_map<V, I>(&self, visitor: &mut V) -> Option<Word>
    where
        V: TokenVisitor<Output = I> + ?Sized,
        I: IntoIterator<Item = Token>,
    {
        let tokens: Vec<Token> = self
            .tokens
            .iter()
            .flat_map(|t| t.accept(visitor))
            .collect();
        Word::new(tokens).ok()
    }
}

impl<'a> IntoIterator for &'a Word {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl IntoIterator for Word {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

/// How [`flatten_with`] renders syllables.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Rendering {
    /// Diacritic tone marks instead of trailing digits.
    pub tonified: bool,
    /// Write `ma5` instead of `ma` for neutral-tone syllables (numeric only).
    pub show_neutral: bool,
}

/// Concatenate the display form of every token (written tones, neutral hidden).
pub fn flatten(words: &[Word]) -> String {
    flatten_with(words, Rendering::default())
}

/// Like [`flatten`], but syllables carry diacritic tone marks.
pub fn flatten_tonified(words: &[Word]) -> String {
    flatten_with(
        words,
        Rendering {
            tonified: true,
            ..Rendering::default()
        },
    )
}

/// Concatenate every token; a `color` attribute becomes an inline span.
pub fn flatten_with(words: &[Word], rendering: Rendering) -> String {
    let mut out = String::new();
    for token in words.iter().flat_map(Word::iter) {
        let rendered = match token {
            // erhua stays a bare `r` either way
            Token::Pinyin(pinyin)
                if rendering.show_neutral && !rendering.tonified && !pinyin.is_er() =>
            {
                pinyin.numeric_format(ToneKind::Written, false)
            }
            _ => token.render(rendering.tonified),
        };
        match token.attributes().get(COLOR_ATTRIBUTE) {
            Some(color) => {
                out.push_str(&format!(r#"<span style="color:{color}">{rendered}</span>"#));
            }
            None => out.push_str(&rendered),
        }
    }
    out
}

/// Whether a syllable appended after `words` should be preceded by a space.
pub fn needs_space_before_append(words: &[Word]) -> bool {
    let Some(last) = words.last().map(Word::last) else {
        return false;
    };
    match last {
        Token::Text(text) => match text.as_str().chars().last() {
            Some(c) if c.is_whitespace() => false,
            Some('(' | ')' | '"') => false,
            _ => true,
        },
        _ => true,
    }
}

/// Pair each character of `characters` with the reading token at the same position.
///
/// Syllables on non-ASCII characters become [`TonedCharacter`]s; everything
/// else (including digits) is plain text. A length mismatch yields the whole
/// string as one text token.
pub fn toned_characters_from_reading(characters: &str, reading: &[Token]) -> Vec<Token> {
    let chars: Vec<char> = characters.chars().collect();
    if chars.len() != reading.len() {
        return Text::new(characters)
            .map(|text| vec![Token::Text(text)])
            .unwrap_or_default();
    }
    chars
        .into_iter()
        .zip(reading)
        .map(|(c, token)| match token {
            Token::Pinyin(pinyin) if !c.is_ascii() => {
                Token::TonedCharacter(TonedCharacter::new(c, pinyin.toneinfo))
            }
            Token::TonedCharacter(character) if !c.is_ascii() => {
                Token::TonedCharacter(TonedCharacter::new(c, character.toneinfo))
            }
            _ => Token::Text(Text::from_char(c)),
        })
        .collect()
}
