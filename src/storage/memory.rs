//! In-memory acronym store
//!
//! Reference implementation of [`AcronymStore`] with both capabilities.
//! State lives behind a tokio `RwLock` so the store can be shared across the
//! editor and the background generation worker.

use super::{AcronymStore, StoreCapabilities};
use crate::error::{Result, ShorthandError};
use crate::types::{AcronymId, AcronymRecord, CapturedEntry, EntryId, NewAcronym};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct StoreState {
    records: Vec<AcronymRecord>,
    entries: Vec<CapturedEntry>,
    next_entry_id: u64,
}

/// Acronym store held entirely in process memory
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records (e.g. loaded from JSON)
    pub fn with_records(records: Vec<AcronymRecord>) -> Self {
        Self {
            state: RwLock::new(StoreState {
                records,
                ..Default::default()
            }),
        }
    }

    /// Copy of every captured entry, processed or not
    pub async fn entries(&self) -> Vec<CapturedEntry> {
        self.state.read().await.entries.clone()
    }

    /// Look up a record by exact label
    pub async fn get_by_acronym(&self, acronym: &str) -> Option<AcronymRecord> {
        self.state
            .read()
            .await
            .records
            .iter()
            .find(|r| r.acronym == acronym)
            .cloned()
    }
}

#[async_trait]
impl AcronymStore for InMemoryStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::full()
    }

    async fn search(&self, query: &str) -> Result<Vec<AcronymRecord>> {
        let query = query.to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.state.read().await;
        let mut matches: Vec<AcronymRecord> = state
            .records
            .iter()
            .filter(|r| r.enabled)
            .filter(|r| {
                r.acronym.to_lowercase().contains(&query)
                    || r.expansion.to_lowercase().contains(&query)
            })
            .cloned()
            .collect();

        // Stable sort keeps insertion order among equal usage counts
        matches.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));

        Ok(matches)
    }

    async fn list_all(&self) -> Result<Vec<AcronymRecord>> {
        Ok(self.state.read().await.records.clone())
    }

    async fn create(&self, acronym: NewAcronym) -> Result<AcronymRecord> {
        let mut state = self.state.write().await;

        if state.records.iter().any(|r| r.acronym == acronym.acronym) {
            return Err(ShorthandError::AlreadyExists(acronym.acronym));
        }

        let record = AcronymRecord::from_new(acronym);
        debug!("Created acronym {} -> {}", record.acronym, record.expansion);
        state.records.push(record.clone());

        Ok(record)
    }

    async fn increment_usage(&self, id: AcronymId) -> Result<()> {
        let mut state = self.state.write().await;
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ShorthandError::NotFound(id.to_string()))?;

        record.usage_count += 1;
        record.updated_at = Utc::now();

        Ok(())
    }

    async fn create_entry(&self, content: &str) -> Result<CapturedEntry> {
        let mut state = self.state.write().await;
        state.next_entry_id += 1;

        let entry = CapturedEntry {
            id: EntryId(state.next_entry_id),
            content: content.to_string(),
            processed: false,
            created_at: Utc::now(),
        };
        state.entries.push(entry.clone());

        Ok(entry)
    }

    async fn list_unprocessed(&self, limit: usize) -> Result<Vec<CapturedEntry>> {
        Ok(self
            .state
            .read()
            .await
            .entries
            .iter()
            .filter(|e| !e.processed)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_processed(&self, id: EntryId) -> Result<()> {
        let mut state = self.state.write().await;
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ShorthandError::NotFound(id.to_string()))?;

        entry.processed = true;
        Ok(())
    }
}
