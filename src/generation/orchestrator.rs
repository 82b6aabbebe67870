// Generation Orchestrator
//
// Turns captured entries into new acronyms:
// 1. Load the next batch of unprocessed entries (creation order)
// 2. Mine repeated phrases
// 3. Skip phrases the store already expands to; synthesize a label for the
//    rest, rejecting exact duplicates and labels too similar to existing ones
//    or to labels chosen earlier by this orchestrator
// 4. Write accepted labels to the store
// 5. Mark every entry in the batch processed
//
// At most one pass runs at a time per orchestrator; the fingerprint caches
// live behind the same lock.

use super::mining::{PhraseCandidate, PhraseMiner};
use super::similarity::{Fingerprinter, SimilarityGate};
use super::synthesis::synthesize;
use crate::config::GenerationConfig;
use crate::error::ShorthandError;
use crate::storage::AcronymStore;
use crate::types::{CapturedEntry, EntryId, NewAcronym};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Store error: {0}")]
    Store(#[from] ShorthandError),

    #[error("Store does not support prompt capture")]
    Unsupported,

    #[error("Generation worker is already running")]
    AlreadyRunning,

    #[error("Abandoned {entries} entries after {failures} consecutive failed passes")]
    Abandoned { entries: usize, failures: u32 },
}

/// Report generated after a generation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Captured entries marked processed
    pub entries_processed: usize,

    /// Ranked phrases forwarded to synthesis
    pub phrases_mined: usize,

    /// Labels written to the store
    pub acronyms_created: Vec<String>,

    /// Labels dropped for length or because the store already had them
    pub labels_discarded: usize,

    /// Phrases skipped because a record already expands to them
    pub phrases_known: usize,

    /// Store writes that failed
    pub errors: usize,

    /// Duration of the pass
    #[serde(with = "serde_duration_millis")]
    pub duration: Duration,

    /// Another pass was in flight; nothing was done
    pub skipped: bool,
}

impl GenerationReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }

    /// Fold a follow-up pass into this report
    pub fn merge(&mut self, other: GenerationReport) {
        self.entries_processed += other.entries_processed;
        self.phrases_mined += other.phrases_mined;
        self.acronyms_created.extend(other.acronyms_created);
        self.labels_discarded += other.labels_discarded;
        self.phrases_known += other.phrases_known;
        self.errors += other.errors;
        self.duration += other.duration;
        self.skipped = self.skipped && other.skipped;
    }
}

// Custom serde module for Duration (serialize/deserialize as milliseconds)
mod serde_duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// How a label was chosen for a phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelChoice {
    /// Produced by synthesis attempt `attempt`
    Accepted { label: String, attempt: usize },
    /// Every attempt collided; attempt-0 label plus a numeric suffix
    Fallback { label: String },
}

impl LabelChoice {
    pub fn label(&self) -> &str {
        match self {
            LabelChoice::Accepted { label, .. } | LabelChoice::Fallback { label } => label,
        }
    }
}

/// State that must never be touched by two passes at once
struct GenerationState {
    gate: SimilarityGate,
    rng: StdRng,
    consecutive_failures: u32,
    /// Every label chosen so far, whether or not the store kept it
    accepted: Vec<String>,
}

impl GenerationState {
    /// Pick a label for `phrase` that is neither an existing label nor too similar to one
    ///
    /// Labels chosen earlier count as existing even if they never reached the store.
    fn choose_label(&mut self, phrase: &str, existing: &[String], max_attempts: usize) -> LabelChoice {
        self.gate.signal(phrase);

        let mut known: Vec<String> = existing.to_vec();
        for label in &self.accepted {
            if !existing.contains(label) {
                known.push(label.clone());
            }
        }
        let choice = self.pick(phrase, &known, max_attempts);

        self.accepted.push(choice.label().to_string());
        choice
    }

    fn pick(&mut self, phrase: &str, existing: &[String], max_attempts: usize) -> LabelChoice {
        let taken: HashSet<&str> = existing.iter().map(String::as_str).collect();

        for attempt in 0..max_attempts {
            let candidate = synthesize(phrase, attempt);

            if taken.contains(candidate.as_str()) {
                tracing::debug!("Attempt {}: '{}' already exists", attempt, candidate);
                continue;
            }

            if let Some((other, score)) = self.gate.too_similar(&candidate, existing) {
                tracing::debug!(
                    "Attempt {}: '{}' too similar to '{}' ({:.3})",
                    attempt,
                    candidate,
                    other,
                    score
                );
                continue;
            }

            self.gate.remember(&candidate);
            return LabelChoice::Accepted {
                label: candidate,
                attempt,
            };
        }

        let label = format!("{}{}", synthesize(phrase, 0), self.rng.gen_range(100..1000));
        self.gate.remember(&label);
        LabelChoice::Fallback { label }
    }
}

/// Drives mining, synthesis, and store writes for captured entries
pub struct GenerationOrchestrator {
    store: Arc<dyn AcronymStore>,
    config: GenerationConfig,
    miner: PhraseMiner,
    state: Mutex<GenerationState>,
}

impl GenerationOrchestrator {
    pub fn new(store: Arc<dyn AcronymStore>, config: GenerationConfig) -> Self {
        let gate = SimilarityGate::new(config.similarity_threshold, config.learning_rate);
        Self::build(store, config, gate, StdRng::from_entropy())
    }

    /// Deterministic fallback suffixes, for tests and replays
    pub fn with_seed(store: Arc<dyn AcronymStore>, config: GenerationConfig, seed: u64) -> Self {
        let gate = SimilarityGate::new(config.similarity_threshold, config.learning_rate);
        Self::build(store, config, gate, StdRng::seed_from_u64(seed))
    }

    /// Replace the letter-frequency fingerprint with another measure
    pub fn with_fingerprinter(
        store: Arc<dyn AcronymStore>,
        config: GenerationConfig,
        fingerprinter: Box<dyn Fingerprinter>,
    ) -> Self {
        let gate = SimilarityGate::with_fingerprinter(
            fingerprinter,
            config.similarity_threshold,
            config.learning_rate,
        );
        Self::build(store, config, gate, StdRng::from_entropy())
    }

    fn build(
        store: Arc<dyn AcronymStore>,
        config: GenerationConfig,
        gate: SimilarityGate,
        rng: StdRng,
    ) -> Self {
        let miner = PhraseMiner::new(config.min_occurrences, config.max_phrases);
        Self {
            store,
            config,
            miner,
            state: Mutex::new(GenerationState {
                gate,
                rng,
                consecutive_failures: 0,
                accepted: Vec::new(),
            }),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Process the next batch of unprocessed entries
    ///
    /// Returns a skipped report if another pass is already running.
    pub async fn process_pending(&self) -> Result<GenerationReport, GenerationError> {
        if !self.store.capabilities().prompt_capture {
            return Err(GenerationError::Unsupported);
        }

        let Ok(mut state) = self.state.try_lock() else {
            tracing::debug!("Generation pass already in flight, skipping");
            return Ok(GenerationReport::skipped());
        };

        let start = Instant::now();

        let entries = match self.store.list_unprocessed(self.config.batch_size).await {
            Ok(entries) => entries,
            Err(e) => return Err(self.record_failure(&mut state, &[], e).await),
        };

        if entries.is_empty() {
            state.consecutive_failures = 0;
            return Ok(GenerationReport {
                duration: start.elapsed(),
                ..Default::default()
            });
        }

        match self.run_batch(&mut state, &entries).await {
            Ok(mut report) => {
                state.consecutive_failures = 0;
                report.duration = start.elapsed();
                tracing::info!(
                    "Generation pass complete: {} entries, {} phrases, {} acronyms in {:?}",
                    report.entries_processed,
                    report.phrases_mined,
                    report.acronyms_created.len(),
                    report.duration
                );
                Ok(report)
            }
            Err(e) => Err(self.record_failure(&mut state, &entries, e).await),
        }
    }

    /// Apply accept/reject feedback to a synthesized label
    ///
    /// Returns `false` if the label has no cached fingerprint.
    pub async fn feedback(&self, label: &str, good: bool) -> bool {
        let mut state = self.state.lock().await;
        let applied = state.gate.feedback(label, good);
        if applied {
            tracing::debug!("Applied {} feedback to '{}'", if good { "positive" } else { "negative" }, label);
        }
        applied
    }

    /// Choose a label for `phrase` against the store's current labels
    pub async fn choose_label(&self, phrase: &str) -> Result<LabelChoice, GenerationError> {
        let existing = self.existing_labels().await?;
        let mut state = self.state.lock().await;
        Ok(state.choose_label(phrase, &existing, self.config.max_attempts))
    }

    /// Labels chosen by this orchestrator so far, in order
    pub async fn session_labels(&self) -> Vec<String> {
        self.state.lock().await.accepted.clone()
    }

    /// Whether the similarity cache holds a fingerprint for `text`
    pub async fn has_signal(&self, text: &str) -> bool {
        self.state.lock().await.gate.cached(text).is_some()
    }

    async fn existing_labels(&self) -> Result<Vec<String>, ShorthandError> {
        Ok(self
            .store
            .list_all()
            .await?
            .into_iter()
            .map(|r| r.acronym)
            .collect())
    }

    async fn run_batch(
        &self,
        state: &mut GenerationState,
        entries: &[CapturedEntry],
    ) -> Result<GenerationReport, ShorthandError> {
        let candidates = self.miner.mine(entries);
        let mut report = GenerationReport {
            phrases_mined: candidates.len(),
            ..Default::default()
        };

        for candidate in &candidates {
            self.generate_for(state, candidate, &mut report).await?;
        }

        for entry in entries {
            self.store.mark_processed(entry.id).await?;
            report.entries_processed += 1;
        }

        Ok(report)
    }

    async fn generate_for(
        &self,
        state: &mut GenerationState,
        candidate: &PhraseCandidate,
        report: &mut GenerationReport,
    ) -> Result<(), ShorthandError> {
        let records = self.store.list_all().await?;
        if records
            .iter()
            .any(|r| r.expansion.eq_ignore_ascii_case(&candidate.phrase))
        {
            tracing::debug!("Phrase '{}' already has an acronym, skipping", candidate.phrase);
            report.phrases_known += 1;
            return Ok(());
        }

        let existing: Vec<String> = records.into_iter().map(|r| r.acronym).collect();
        let choice = state.choose_label(&candidate.phrase, &existing, self.config.max_attempts);
        let label = choice.label().to_string();

        let len = label.chars().count();
        if len < self.config.min_label_len || len > self.config.max_label_len {
            tracing::debug!("Discarding label '{}' for '{}': length {}", label, candidate.phrase, len);
            report.labels_discarded += 1;
            return Ok(());
        }

        // Any hit, label or expansion, means the label is already in use
        let hits = self.store.search(&label).await?;
        if !hits.is_empty() {
            tracing::debug!("Label '{}' matches {} stored records, skipping", label, hits.len());
            report.labels_discarded += 1;
            return Ok(());
        }

        let new = NewAcronym::generated(&label, &candidate.phrase, candidate.entry_count());
        match self.store.create(new).await {
            Ok(record) => {
                tracing::info!("Generated acronym {} -> {}", record.acronym, record.expansion);
                report.acronyms_created.push(record.acronym);
            }
            Err(ShorthandError::AlreadyExists(label)) => {
                tracing::debug!("Label '{}' already exists, skipping", label);
                report.labels_discarded += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to store acronym '{}': {}", label, e);
                report.errors += 1;
            }
        }

        Ok(())
    }

    /// Count a failed pass; abandon the batch once the failure cap is reached
    async fn record_failure(
        &self,
        state: &mut GenerationState,
        entries: &[CapturedEntry],
        error: ShorthandError,
    ) -> GenerationError {
        state.consecutive_failures += 1;
        tracing::error!(
            "Generation pass failed ({} consecutive): {}",
            state.consecutive_failures,
            error
        );

        if state.consecutive_failures < self.config.max_consecutive_failures || entries.is_empty() {
            return GenerationError::Store(error);
        }

        let failures = state.consecutive_failures;
        state.consecutive_failures = 0;

        let ids: Vec<EntryId> = entries.iter().map(|e| e.id).collect();
        for id in &ids {
            if let Err(e) = self.store.mark_processed(*id).await {
                tracing::error!("Failed to abandon {}: {}", id, e);
            }
        }

        tracing::error!(
            "Abandoned {} entries after {} consecutive failed passes",
            ids.len(),
            failures
        );

        GenerationError::Abandoned {
            entries: ids.len(),
            failures,
        }
    }
}
