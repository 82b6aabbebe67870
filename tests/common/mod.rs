//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::mock;
use shorthand_core::{
    editor::ManualClock, AcronymEditor, AcronymId, AcronymRecord, AcronymStore, BufferId,
    CapturedEntry, EditorEvent, EntryId, InMemoryStore, NewAcronym, Result, ShorthandConfig,
    StoreCapabilities,
};
use std::sync::Arc;

mock! {
    /// Store double for driving collaborator failures
    pub Store {}

    #[async_trait]
    impl AcronymStore for Store {
        fn capabilities(&self) -> StoreCapabilities;
        async fn search(&self, query: &str) -> Result<Vec<AcronymRecord>>;
        async fn list_all(&self) -> Result<Vec<AcronymRecord>>;
        async fn create(&self, acronym: NewAcronym) -> Result<AcronymRecord>;
        async fn increment_usage(&self, id: AcronymId) -> Result<()>;
        async fn create_entry(&self, content: &str) -> Result<CapturedEntry>;
        async fn list_unprocessed(&self, limit: usize) -> Result<Vec<CapturedEntry>>;
        async fn mark_processed(&self, id: EntryId) -> Result<()>;
    }
}

/// Record with a preset usage count
pub fn record(acronym: &str, expansion: &str, usage_count: u64) -> AcronymRecord {
    let mut record = AcronymRecord::from_new(NewAcronym::new(acronym, expansion));
    record.usage_count = usage_count;
    record
}

/// Captured entry with a fixed id
pub fn entry(id: u64, content: &str) -> CapturedEntry {
    CapturedEntry {
        id: EntryId(id),
        content: content.to_string(),
        processed: false,
        created_at: Utc::now(),
    }
}

/// In-memory store holding `(acronym, expansion)` pairs
pub async fn seeded_store(acronyms: &[(&str, &str)]) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    for (acronym, expansion) in acronyms {
        store
            .create(NewAcronym::new(*acronym, *expansion))
            .await
            .expect("Failed to seed store");
    }
    store
}

/// Manual clock starting at a fixed instant
pub fn manual_clock() -> Arc<ManualClock> {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    Arc::new(ManualClock::new(start))
}

/// Editor over `store` with a manual clock
pub fn editor(store: Arc<dyn AcronymStore>, clock: Arc<ManualClock>) -> AcronymEditor {
    AcronymEditor::new(ShorthandConfig::default(), store).with_clock(clock)
}

/// Type `text` one character at a time
pub async fn type_text(editor: &mut AcronymEditor, id: BufferId, text: &str) {
    for ch in text.chars() {
        editor
            .handle_event(id, EditorEvent::Insert(ch.to_string()))
            .await
            .expect("Insert failed");
    }
}
