//! Acronym synthesis
//!
//! Deterministically derives a short uppercase label from a phrase. The
//! attempt index picks one of three letter-selection strategies so repeated
//! attempts yield different shapes for the same phrase.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Words that never contribute letters unless nothing else survives
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "and", "or", "but", "nor", "of", "in", "on", "at", "to", "for",
        "with", "by", "from", "as", "is", "are", "was", "were", "be", "been", "it", "its",
        "this", "that", "these", "those", "into", "onto", "over", "under", "than", "then",
        "so", "if", "not", "no", "do", "does", "did",
    ]
    .into_iter()
    .collect()
});

/// Letter-selection strategy, chosen by `attempt % 3`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// First letter of every word
    Initials,
    /// First two letters of the first word, then initials
    LeadingPair,
    /// Initial of the first word, then first two letters of the rest
    TrailingPairs,
}

impl Strategy {
    pub fn for_attempt(attempt: usize) -> Self {
        match attempt % 3 {
            0 => Strategy::Initials,
            1 => Strategy::LeadingPair,
            _ => Strategy::TrailingPairs,
        }
    }
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Words of `phrase` that carry meaning: not stop words, longer than one char, not numeric
pub fn significant_words(phrase: &str) -> Vec<String> {
    phrase
        .to_lowercase()
        .split_whitespace()
        .filter(|w| !is_stop_word(w))
        .filter(|w| w.chars().count() > 1)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// Synthesize the candidate label for `phrase` on attempt `attempt`
pub fn synthesize(phrase: &str, attempt: usize) -> String {
    let words = significant_words(phrase);

    if words.is_empty() {
        // Fallback ignores the attempt index
        return phrase
            .to_lowercase()
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .collect::<String>()
            .to_uppercase();
    }

    let strategy = if words.len() == 1 {
        Strategy::Initials
    } else {
        Strategy::for_attempt(attempt)
    };

    let label: String = match strategy {
        Strategy::Initials => words.iter().map(|w| prefix(w, 1)).collect(),
        Strategy::LeadingPair => std::iter::once(prefix(&words[0], 2))
            .chain(words[1..].iter().map(|w| prefix(w, 1)))
            .collect(),
        Strategy::TrailingPairs => std::iter::once(prefix(&words[0], 1))
            .chain(words[1..].iter().map(|w| prefix(w, 2)))
            .collect(),
    };

    label.to_uppercase()
}

fn prefix(word: &str, n: usize) -> String {
    word.chars().take(n).collect()
}
