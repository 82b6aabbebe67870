//! Expansion of a trigger into an acronym's full text

use super::{Span, TextBuffer};
use crate::error::Result;
use crate::types::{AcronymId, AcronymRecord};

/// Result of a successful expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub acronym_id: AcronymId,
    pub acronym: String,
    /// Span that was replaced (pre-expansion offsets)
    pub replaced: Span,
    /// Inserted text, including the trailing space
    pub inserted: String,
    /// Caret after the insertion
    pub caret: usize,
}

/// Replace exactly `span` with the record's expansion plus one space
///
/// Content outside `span` is left untouched.
pub fn expand(buffer: &mut TextBuffer, span: Span, record: &AcronymRecord) -> Result<Expansion> {
    let inserted = format!("{} ", record.expansion);
    let caret = buffer.replace(span, &inserted)?;

    Ok(Expansion {
        acronym_id: record.id,
        acronym: record.acronym.clone(),
        replaced: span,
        inserted,
        caret,
    })
}
