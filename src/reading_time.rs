//! Reading-time estimate for a post body.
//!
//! Words are runs of ASCII word characters plus the accented Latin-1 letters
//! Á–Ú and á–ú, so Portuguese text such as "ação" counts as one word. Every
//! heading and every paragraph of every block is counted; the total is divided
//! by [`WORDS_PER_MINUTE`] and rounded up.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::ContentBlock;

pub const WORDS_PER_MINUTE: usize = 200;

static WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9A-Za-z_\x{C1}-\x{DA}\x{E1}-\x{FA}]+").expect("word pattern must compile")
});

/// Number of words in `text`.
pub fn count_words(text: &str) -> usize {
    WORD.find_iter(text).count()
}

/// Total words across all headings and paragraphs.
pub fn total_words(content: &[ContentBlock]) -> usize {
    content
        .iter()
        .map(|block| {
            count_words(&block.heading) + block.body.iter().map(|t| count_words(t)).sum::<usize>()
        })
        .sum()
}

/// Estimated reading time in whole minutes, rounded up. Empty content is 0.
pub fn reading_time_minutes(content: &[ContentBlock]) -> usize {
    total_words(content).div_ceil(WORDS_PER_MINUTE)
}
