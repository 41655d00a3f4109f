//! Target-script detection.
//!
//! A candidate string is extracted only when it contains at least one
//! precomposed Hangul syllable.

use std::ops::RangeInclusive;

/// The Hangul Syllables block (`가` through `힣`).
pub const HANGUL_SYLLABLES: RangeInclusive<char> = '\u{AC00}'..='\u{D7A3}';

/// Returns true if `text` contains at least one character of the target script.
pub fn contains_target_script(text: &str) -> bool {
    text.chars().any(|c| HANGUL_SYLLABLES.contains(&c))
}
