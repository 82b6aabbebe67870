//! Similarity gate for synthesized labels
//!
//! Labels and phrases are reduced to a cheap, deterministic fingerprint and
//! compared by dot product. The fingerprint is not a semantic representation;
//! it sits behind [`Fingerprinter`] so a better measure can replace it without
//! touching the orchestrator.

use std::collections::HashMap;

/// Dimensions of the letter-frequency fingerprint (a-z)
pub const LETTER_DIMENSIONS: usize = 26;

/// Produces fixed-length fingerprints from text
pub trait Fingerprinter: Send + Sync {
    /// Fingerprint length; every vector returned has this many components
    fn dimensions(&self) -> usize;

    /// Unit-magnitude fingerprint of `text` (all zeros if nothing is countable)
    fn fingerprint(&self, text: &str) -> Vec<f32>;
}

/// Case-folded a-z letter counts, normalized to unit length
#[derive(Debug, Default, Clone, Copy)]
pub struct LetterFrequency;

impl Fingerprinter for LetterFrequency {
    fn dimensions(&self) -> usize {
        LETTER_DIMENSIONS
    }

    fn fingerprint(&self, text: &str) -> Vec<f32> {
        let mut counts = vec![0.0f32; LETTER_DIMENSIONS];
        for c in text.chars().flat_map(char::to_lowercase) {
            if c.is_ascii_lowercase() {
                counts[(c as u8 - b'a') as usize] += 1.0;
            }
        }
        normalize(&mut counts);
        counts
    }
}

/// Scale `v` to unit Euclidean length; zero vectors stay zero
pub fn normalize(v: &mut [f32]) {
    let magnitude = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        v.iter_mut().for_each(|x| *x /= magnitude);
    }
}

/// Dot-product similarity of two fingerprints
///
/// # Panics
///
/// Panics if the fingerprints have different dimensions.
pub fn similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(
        a.len(),
        b.len(),
        "fingerprint dimension mismatch: {} vs {}",
        a.len(),
        b.len()
    );
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scale every component up (good) or down (bad) by `rate`, then re-normalize
pub fn adjust(signal: &mut [f32], good: bool, rate: f32) {
    let factor = if good { 1.0 + rate } else { 1.0 - rate };
    signal.iter_mut().for_each(|x| *x *= factor);
    normalize(signal);
}

/// Fingerprint cache plus the rejection threshold
///
/// Owned by one orchestrator; never shared outside the generation pipeline.
pub struct SimilarityGate {
    fingerprinter: Box<dyn Fingerprinter>,
    cache: HashMap<String, Vec<f32>>,
    threshold: f32,
    learning_rate: f32,
}

impl SimilarityGate {
    pub fn new(threshold: f32, learning_rate: f32) -> Self {
        Self::with_fingerprinter(Box::new(LetterFrequency), threshold, learning_rate)
    }

    pub fn with_fingerprinter(
        fingerprinter: Box<dyn Fingerprinter>,
        threshold: f32,
        learning_rate: f32,
    ) -> Self {
        Self {
            fingerprinter,
            cache: HashMap::new(),
            threshold,
            learning_rate,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Fingerprint without caching
    pub fn compute(&self, text: &str) -> Vec<f32> {
        self.fingerprinter.fingerprint(text)
    }

    /// Cached fingerprint, computed and cached on first use
    pub fn signal(&mut self, text: &str) -> &[f32] {
        if !self.cache.contains_key(text) {
            let fingerprint = self.fingerprinter.fingerprint(text);
            self.cache.insert(text.to_string(), fingerprint);
        }
        &self.cache[text]
    }

    /// Cache the fingerprint of an accepted label
    pub fn remember(&mut self, label: &str) {
        let fingerprint = self.fingerprinter.fingerprint(label);
        self.cache.insert(label.to_string(), fingerprint);
    }

    pub fn cached(&self, text: &str) -> Option<&[f32]> {
        self.cache.get(text).map(Vec::as_slice)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// First existing label whose similarity to `candidate` exceeds the threshold
    pub fn too_similar(&mut self, candidate: &str, existing: &[String]) -> Option<(String, f32)> {
        let fingerprint = self.compute(candidate);

        for label in existing {
            let score = similarity(&fingerprint, self.signal(label));
            if score > self.threshold {
                return Some((label.clone(), score));
            }
        }

        None
    }

    /// Apply accept/reject feedback to a label's cached fingerprint
    ///
    /// Returns `false` when the label has no cached fingerprint.
    pub fn feedback(&mut self, label: &str, good: bool) -> bool {
        let rate = self.learning_rate;
        match self.cache.get_mut(label) {
            Some(signal) => {
                adjust(signal, good, rate);
                true
            }
            None => false,
        }
    }
}
