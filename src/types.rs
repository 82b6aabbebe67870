//! Core data types for the Shorthand acronym engine
//!
//! Acronym records are owned by the store collaborator; the engine reads them
//! for suggestions and writes new ones from the generation pipeline. Captured
//! entries are the raw text spans mined for repeated phrases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Tag attached to every acronym produced by the generation pipeline
pub const AUTO_GENERATED_TAG: &str = "auto-generated";

/// Unique identifier for acronym records
///
/// Wraps a UUID to provide type safety and prevent mixing acronym IDs
/// with captured entry IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcronymId(pub Uuid);

impl AcronymId {
    /// Create a new random acronym ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an acronym ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for AcronymId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AcronymId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for captured entries
///
/// Sequential so that "unprocessed order" is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// A short label standing for a longer expansion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcronymRecord {
    pub id: AcronymId,

    /// Short label, unique across the store
    pub acronym: String,

    /// Text inserted in place of the trigger
    pub expansion: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Only ever incremented by a successful expansion
    #[serde(default)]
    pub usage_count: u64,

    #[serde(default)]
    pub tags: BTreeSet<String>,
}

fn default_enabled() -> bool {
    true
}

impl AcronymRecord {
    /// Build a fresh record from creation parameters
    pub fn from_new(new: NewAcronym) -> Self {
        let now = Utc::now();
        Self {
            id: AcronymId::new(),
            acronym: new.acronym,
            expansion: new.expansion,
            description: new.description,
            enabled: new.enabled,
            created_at: now,
            updated_at: now,
            usage_count: 0,
            tags: new.tags,
        }
    }

    /// Whether this record was produced by the generation pipeline
    pub fn is_auto_generated(&self) -> bool {
        self.tags.contains(AUTO_GENERATED_TAG)
    }
}

/// Parameters for creating a new acronym record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAcronym {
    pub acronym: String,
    pub expansion: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl NewAcronym {
    /// Manually defined acronym, enabled, no tags
    pub fn new(acronym: impl Into<String>, expansion: impl Into<String>) -> Self {
        Self {
            acronym: acronym.into(),
            expansion: expansion.into(),
            description: None,
            enabled: true,
            tags: BTreeSet::new(),
        }
    }

    /// Acronym synthesized from a mined phrase
    pub fn generated(acronym: impl Into<String>, phrase: impl Into<String>, entry_count: usize) -> Self {
        let mut tags = BTreeSet::new();
        tags.insert(AUTO_GENERATED_TAG.to_string());
        Self {
            acronym: acronym.into(),
            expansion: phrase.into(),
            description: Some(format!(
                "Auto-generated from {} captured entries",
                entry_count
            )),
            enabled: true,
            tags,
        }
    }
}

/// One span of user-authored text saved for later phrase mining
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedEntry {
    pub id: EntryId,
    pub content: String,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}
