//! Parse, tonify and tokenize pinyin.
//!
//! - [`parse`] / [`parse_with`] turn one syllable (`nu:3`, `nv3`, `nǚ`) into a
//!   canonical [`Pinyin`](pinyin_types::Pinyin), rejecting numbers, English
//!   lookalikes (`USB`) and doubly marked syllables.
//! - [`tokenize`] splits mixed Chinese/Latin/markup text into tokens without
//!   ever failing; unparseable runs stay as text.
//! - [`PinyinTonifier`] rewrites `ni3 hao3` as `nǐ hǎo` inside free text.
//!
//! ```rust
//! use pinyin_parse::{PinyinTonifier, parse, tokenize};
//!
//! assert_eq!(parse("nv3").unwrap(), parse("nǚ").unwrap());
//! assert_eq!(tokenize("wan4r", false).len(), 2);
//! assert_eq!(PinyinTonifier::new().tonify("Zhong1guo2"), "Zhōngguó");
//! ```

mod parse;
mod syllables;
mod tokenize;
mod tonify;

pub use parse::{PinyinError, parse, parse_with};
pub use syllables::{is_syllable, legal_syllables};
pub use tokenize::{tokenize, tokenize_space_separated, tokenize_words};
pub use tonify::PinyinTonifier;
