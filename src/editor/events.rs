//! Event types for attached buffers

use super::Expansion;

/// Keys the editor integration reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Completion key: expands the first suggestion
    Tab,
    /// Accept key: expands the selected suggestion
    Enter,
    Up,
    Down,
    /// Dismiss suggestions
    Escape,
}

/// Editor events (user actions)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Insert text at the caret
    Insert(String),
    /// Delete the character before the caret
    Backspace,
    /// Move the caret to a char offset
    MoveCaret(usize),
    /// Navigation/accept key
    Key(Key),
    /// Pointer selection of a visible suggestion
    Click(usize),
    /// Buffer lost focus
    Blur,
}

/// What the editor did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not consumed; the host should apply its default behaviour
    Ignored,
    /// Consumed without expanding
    Handled,
    /// Consumed and a suggestion was expanded
    Expanded(Expansion),
}

impl EventOutcome {
    /// Whether the host should suppress its default handling
    pub fn is_consumed(&self) -> bool {
        !matches!(self, EventOutcome::Ignored)
    }
}
