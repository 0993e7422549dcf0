use pinyin_types::{Token, Tone, ToneKind, Word};

/// Third-tone sandhi on the spoken tone.
///
/// A tone group is a maximal run of spoken third tones, possibly spanning
/// several words, interrupted only by whitespace text. Every syllable of a
/// group except the last is spoken with the second tone, so `3 3 3` becomes
/// `2 2 3`. Any other token closes the group and is left alone.
pub fn tone_sandhi(words: &[Word]) -> Vec<Word> {
    let mut tokens: Vec<Vec<Token>> = words.iter().map(|w| w.tokens().to_vec()).collect();
    let mut group: Vec<(usize, usize)> = Vec::new();
    for (w, word) in words.iter().enumerate() {
        for (t, token) in word.iter().enumerate() {
            match token {
                Token::Text(text) if text.is_whitespace() => {}
                _ if token.toneinfo().map(|info| info.tone(ToneKind::Spoken))
                    == Some(Tone::Dipping) =>
                {
                    group.push((w, t))
                }
                _ => close_group(&mut tokens, &mut group),
            }
        }
    }
    close_group(&mut tokens, &mut group);

    tokens
        .into_iter()
        .filter_map(|tokens| Word::new(tokens).ok())
        .collect()
}

fn close_group(tokens: &mut [Vec<Token>], group: &mut Vec<(usize, usize)>) {
    if let Some((_, leading)) = group.split_last() {
        for &(w, t) in leading {
            let token = tokens[w][t].clone();
            tokens[w][t] = token.with_spoken_tone(Tone::Rising);
        }
    }
    group.clear();
}
