//! Text buffer with rope data structure
//!
//! Efficient text storage and manipulation using ropey. Positions are
//! character offsets into the buffer; the caret sits between characters.

use super::Span;
use crate::error::{Result, ShorthandError};
use ropey::Rope;

/// Buffer identifier
pub type BufferId = usize;

/// Caret-addressable text buffer
pub struct TextBuffer {
    /// Buffer ID
    pub id: BufferId,

    /// Text content (rope for efficient editing)
    content: Rope,

    /// Caret position (char offset, `0..=len_chars`)
    caret: usize,
}

impl TextBuffer {
    /// Create new text buffer with the caret at the end of `text`
    pub fn new(id: BufferId, text: &str) -> Self {
        let content = Rope::from_str(text);
        let caret = content.len_chars();
        Self { id, content, caret }
    }

    /// Get text content as string
    pub fn text(&self) -> String {
        self.content.to_string()
    }

    /// Underlying rope
    pub fn rope(&self) -> &Rope {
        &self.content
    }

    /// Number of characters in the buffer
    pub fn len_chars(&self) -> usize {
        self.content.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.content.len_chars() == 0
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Move the caret, clamped to the buffer length
    pub fn set_caret(&mut self, caret: usize) {
        self.caret = caret.min(self.content.len_chars());
    }

    /// Replace the whole content; caret moves to the end
    pub fn set_text(&mut self, text: &str) {
        self.content = Rope::from_str(text);
        self.caret = self.content.len_chars();
    }

    /// Insert text at the caret and advance past it
    pub fn insert(&mut self, text: &str) {
        self.content.insert(self.caret, text);
        self.caret += text.chars().count();
    }

    /// Delete the character before the caret (Backspace)
    pub fn delete_backward(&mut self) -> Option<char> {
        if self.caret == 0 {
            return None;
        }

        let ch = self.content.char(self.caret - 1);
        self.content.remove(self.caret - 1..self.caret);
        self.caret -= 1;
        Some(ch)
    }

    /// Replace `span` with `text`, placing the caret right after the insertion
    pub fn replace(&mut self, span: Span, text: &str) -> Result<usize> {
        if span.start > span.end || span.end > self.content.len_chars() {
            return Err(ShorthandError::InvalidOperation(format!(
                "span {}..{} outside buffer of {} chars",
                span.start,
                span.end,
                self.content.len_chars()
            )));
        }

        self.content.remove(span.start..span.end);
        self.content.insert(span.start, text);
        self.caret = span.start + text.chars().count();

        Ok(self.caret)
    }

    /// Text inside `span`
    pub fn slice(&self, span: Span) -> Option<String> {
        if span.start > span.end || span.end > self.content.len_chars() {
            return None;
        }
        Some(self.content.slice(span.start..span.end).to_string())
    }
}
