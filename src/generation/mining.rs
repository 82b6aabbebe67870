//! Repeated phrase mining
//!
//! Slides windows of 3 to 8 words over every captured entry and keeps the
//! phrases that show up in enough distinct entries. Ranking is by distinct
//! entry count, ties broken by first-seen order.

use crate::types::{CapturedEntry, EntryId};
use std::collections::{HashMap, HashSet};

/// Smallest window, in words
pub const MIN_WINDOW: usize = 3;
/// Largest window, in words
pub const MAX_WINDOW: usize = 8;
/// Joined phrases shorter than this (in chars) are treated as filler
pub const MIN_PHRASE_CHARS: usize = 10;

/// A repeated phrase and the entries it occurs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseCandidate {
    /// Lowercased, single-space joined phrase
    pub phrase: String,
    /// Distinct entries, in first-seen order
    pub entry_ids: Vec<EntryId>,
}

impl PhraseCandidate {
    pub fn entry_count(&self) -> usize {
        self.entry_ids.len()
    }
}

/// Phrase miner
#[derive(Debug, Clone)]
pub struct PhraseMiner {
    min_occurrences: usize,
    max_phrases: usize,
}

impl Default for PhraseMiner {
    fn default() -> Self {
        Self::new(2, 10)
    }
}

impl PhraseMiner {
    pub fn new(min_occurrences: usize, max_phrases: usize) -> Self {
        Self {
            min_occurrences,
            max_phrases,
        }
    }

    /// Lowercased words of `text` longer than one character
    pub fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .filter(|w| w.chars().count() > 1)
            .map(str::to_string)
            .collect()
    }

    /// Mine a batch, returning at most `max_phrases` ranked candidates
    pub fn mine(&self, entries: &[CapturedEntry]) -> Vec<PhraseCandidate> {
        let mut candidates: Vec<PhraseCandidate> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            let tokens = Self::tokenize(&entry.content);
            let mut seen_in_entry: HashSet<String> = HashSet::new();

            for window in MIN_WINDOW..=tokens.len().min(MAX_WINDOW) {
                for words in tokens.windows(window) {
                    let phrase = words.join(" ");
                    if phrase.chars().count() < MIN_PHRASE_CHARS {
                        continue;
                    }
                    if !seen_in_entry.insert(phrase.clone()) {
                        continue;
                    }

                    match index.get(&phrase) {
                        Some(&i) => candidates[i].entry_ids.push(entry.id),
                        None => {
                            index.insert(phrase.clone(), candidates.len());
                            candidates.push(PhraseCandidate {
                                phrase,
                                entry_ids: vec![entry.id],
                            });
                        }
                    }
                }
            }
        }

        let mut ranked: Vec<PhraseCandidate> = candidates
            .into_iter()
            .filter(|c| c.entry_count() >= self.min_occurrences)
            .collect();

        // Stable: equal counts keep first-seen order
        ranked.sort_by(|a, b| b.entry_count().cmp(&a.entry_count()));
        ranked.truncate(self.max_phrases);

        tracing::debug!(
            "Mined {} repeated phrases from {} entries",
            ranked.len(),
            entries.len()
        );

        ranked
    }
}
