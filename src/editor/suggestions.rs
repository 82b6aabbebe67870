//! Suggestion list state
//!
//! Holds the ranked lookup results for the current trigger:
//! - Truncated to `max_suggestions`, lookup order preserved
//! - No item highlighted until the user navigates
//! - Up/down move the selection, clamped (never wraps)
//! - Responses to superseded requests are discarded

use super::Trigger;
use crate::config::SuggestionConfig;
use crate::types::AcronymRecord;

/// Identifies one lookup request; only the most recent one may apply results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Suggestion controller for one buffer
pub struct SuggestionController {
    /// Ranked candidates, at most `max_suggestions`
    items: Vec<AcronymRecord>,

    /// Highlighted index, `None` until navigation
    selected: Option<usize>,

    /// Whether the list is shown
    visible: bool,

    /// Trigger the current items were looked up for
    trigger: Option<Trigger>,

    /// Trigger of the in-flight request
    pending: Option<Trigger>,

    /// Latest issued request
    generation: u64,

    max_suggestions: usize,
    show: bool,
}

impl SuggestionController {
    pub fn new(config: &SuggestionConfig) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            visible: false,
            trigger: None,
            pending: None,
            generation: 0,
            max_suggestions: config.max_suggestions,
            show: config.enabled,
        }
    }

    /// Start a lookup for `trigger`, superseding any request in flight
    pub fn begin_request(&mut self, trigger: Trigger) -> RequestToken {
        self.generation += 1;
        self.pending = Some(trigger);
        RequestToken(self.generation)
    }

    /// Apply lookup results
    ///
    /// Returns `false` (and changes nothing) when `token` has been superseded.
    pub fn apply_results(&mut self, token: RequestToken, mut results: Vec<AcronymRecord>) -> bool {
        if token.0 != self.generation {
            tracing::debug!(
                "Discarding stale suggestions (request {} superseded by {})",
                token.0,
                self.generation
            );
            return false;
        }

        let Some(trigger) = self.pending.take() else {
            return false;
        };

        if results.is_empty() {
            self.reset();
            return true;
        }

        results.truncate(self.max_suggestions);
        self.items = results;
        self.trigger = Some(trigger);
        self.selected = None;
        self.visible = self.show;
        true
    }

    /// Hide and clear the list; in-flight requests become stale
    pub fn clear(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.reset();
    }

    fn reset(&mut self) {
        self.items.clear();
        self.trigger = None;
        self.selected = None;
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn items(&self) -> &[AcronymRecord] {
        &self.items
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Record under the highlight
    pub fn selected(&self) -> Option<&AcronymRecord> {
        self.selected.and_then(|i| self.items.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&AcronymRecord> {
        self.items.get(index)
    }

    pub fn trigger(&self) -> Option<&Trigger> {
        self.trigger.as_ref()
    }

    /// Move selection down (arrow-down)
    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }

        let last = self.items.len() - 1;
        self.selected = Some(match self.selected {
            None => 0,
            Some(i) => (i + 1).min(last),
        });
    }

    /// Move selection up (arrow-up)
    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }

        self.selected = Some(match self.selected {
            None => 0,
            Some(i) => i.saturating_sub(1),
        });
    }

    /// Highlight `index` directly (pointer hover/click)
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }
}
