//! Storage layer for the Shorthand acronym engine
//!
//! Durable storage is an external collaborator. This module defines the
//! contract the engine consumes plus an in-memory implementation used by the
//! CLI and the test suites.

pub mod memory;

use crate::error::{Result, ShorthandError};
use crate::types::{AcronymId, AcronymRecord, CapturedEntry, EntryId, NewAcronym};
use async_trait::async_trait;

pub use memory::InMemoryStore;

/// Optional capabilities a store declares up front
///
/// The engine branches on these flags instead of probing for behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCapabilities {
    /// Store can persist captured entries and track their processed flag
    pub prompt_capture: bool,
}

impl StoreCapabilities {
    /// Lookup and acronym writes only
    pub const fn lookup_only() -> Self {
        Self {
            prompt_capture: false,
        }
    }

    /// Lookup plus captured entry persistence
    pub const fn full() -> Self {
        Self {
            prompt_capture: true,
        }
    }
}

/// Acronym lookup/store collaborator
#[async_trait]
pub trait AcronymStore: Send + Sync {
    /// Capabilities this store supports
    fn capabilities(&self) -> StoreCapabilities;

    /// Substring-or-prefix search over labels and expansions
    ///
    /// Results are ordered by usage count, descending.
    async fn search(&self, query: &str) -> Result<Vec<AcronymRecord>>;

    /// Every record in the store
    async fn list_all(&self) -> Result<Vec<AcronymRecord>>;

    /// Create a record; the label must not already exist
    async fn create(&self, acronym: NewAcronym) -> Result<AcronymRecord>;

    /// Increment the usage counter of a record
    async fn increment_usage(&self, id: AcronymId) -> Result<()>;

    /// Persist a captured entry
    async fn create_entry(&self, _content: &str) -> Result<CapturedEntry> {
        Err(unsupported("prompt_capture"))
    }

    /// Unprocessed captured entries in creation order
    async fn list_unprocessed(&self, _limit: usize) -> Result<Vec<CapturedEntry>> {
        Err(unsupported("prompt_capture"))
    }

    /// Flag a captured entry as processed
    async fn mark_processed(&self, _id: EntryId) -> Result<()> {
        Err(unsupported("prompt_capture"))
    }
}

fn unsupported(capability: &str) -> ShorthandError {
    ShorthandError::Unsupported(capability.to_string())
}
