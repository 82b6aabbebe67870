//! Shorthand - Acronym detection, expansion, and generation
//!
//! Recognizes short tokens typed into a live text buffer, offers ranked
//! expansions, and mines the user's own captured text for phrases that repeat
//! often enough to deserve an acronym.
//!
//! # Architecture
//!
//! - **Types**: Core data structures (AcronymRecord, CapturedEntry, etc.)
//! - **Storage**: The `AcronymStore` collaborator and an in-memory backend
//! - **Editor**: Trigger detection, suggestions, expansion, and prompt capture
//! - **Generation**: Phrase mining, label synthesis, and the similarity gate
//!
//! # Example
//!
//! ```ignore
//! use shorthand_core::{AcronymEditor, EditorEvent, InMemoryStore, Key, ShorthandConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> shorthand_core::Result<()> {
//!     let store = Arc::new(InMemoryStore::new());
//!     let mut editor = AcronymEditor::new(ShorthandConfig::default(), store);
//!
//!     let buffer = editor.attach("");
//!     editor.handle_event(buffer, EditorEvent::Insert("ml".into())).await?;
//!     editor.handle_event(buffer, EditorEvent::Key(Key::Tab)).await?;
//!
//!     println!("{}", editor.get_value(buffer)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod generation;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use crate::config::{CaptureConfig, ConfigError, GenerationConfig, ShorthandConfig, SuggestionConfig};
pub use editor::{AcronymEditor, BufferId, EditorEvent, EventOutcome, Expansion, Key};
pub use error::{Result, ShorthandError};
pub use generation::{
    GenerationError, GenerationHandle, GenerationOrchestrator, GenerationReport, GenerationWorker,
};
pub use storage::{AcronymStore, InMemoryStore, StoreCapabilities};
pub use types::{AcronymId, AcronymRecord, CapturedEntry, EntryId, NewAcronym};
