use crate::tokenize::tokenize;

/// Rewrites numeric-tone syllables embedded in free text to diacritic form.
#[derive(Clone, Copy, Debug, Default)]
pub struct PinyinTonifier;

impl PinyinTonifier {
    pub fn new() -> Self {
        Self
    }

    /// `Han4zi4 bu4 mie4` becomes `Hànzì bù miè`; other text is left alone.
    pub fn tonify(&self, text: &str) -> String {
        tokenize(text, true)
            .iter()
            .map(|token| token.render(true))
            .collect()
    }
}
