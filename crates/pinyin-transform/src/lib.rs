//! Word-level transformations applied after a reading has been resolved.
//!
//! All functions here are pure: they take resolved [`Word`]s and return new
//! ones. Tone sandhi and coloring only ever touch the spoken tone and the
//! attribute bag; written tones stay as the dictionary gave them.
//!
//! ```rust
//! use pinyin_parse::tokenize_words;
//! use pinyin_transform::{ToneColors, colorize, tone_sandhi};
//! use pinyin_types::flatten;
//!
//! let words = tone_sandhi(&tokenize_words("ni3 hao3", true));
//! let colored = colorize(&ToneColors::default(), &words);
//! assert_eq!(
//!     flatten(&colored),
//!     r#"<span style="color:#ffaa00">ni3</span> <span style="color:#00aa00">hao3</span>"#
//! );
//! ```

pub mod audio;
mod colorize;
mod erhua;
mod mask;
mod sandhi;

pub use audio::{AudioReading, AudioReadings, MediaPack, RandomTieBreaker, TieBreaker};
pub use colorize::{ToneColors, colorize};
pub use erhua::trim_erhua;
pub use mask::mask_hanzi;
pub use sandhi::tone_sandhi;
