//! Trigger detection
//!
//! A trigger is the run of word characters (alphanumeric or `_`) that ends
//! exactly at the caret. Whitespace or punctuation right before the caret
//! means there is no trigger.

use ropey::Rope;

/// Half-open character range `[start, end)` in a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Candidate acronym token left of the caret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Literal token text
    pub text: String,
    /// Where the token sits, so it can be replaced without re-scanning
    pub span: Span,
}

/// Word characters for trigger purposes
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Detect the trigger ending at `caret` (a char offset) in `text`
pub fn detect(text: &str, caret: usize) -> Option<Trigger> {
    if caret == 0 {
        return None;
    }

    let before: Vec<char> = text.chars().take(caret).collect();
    if before.len() < caret {
        // Caret past the end of the text
        return None;
    }

    from_reversed(before.into_iter().rev(), caret)
}

/// Detect the trigger ending at `caret` in a rope without copying the buffer
pub fn detect_in_rope(rope: &Rope, caret: usize) -> Option<Trigger> {
    if caret == 0 || caret > rope.len_chars() {
        return None;
    }

    from_reversed(rope.chars_at(caret).reversed(), caret)
}

fn from_reversed(chars: impl Iterator<Item = char>, caret: usize) -> Option<Trigger> {
    let mut run: Vec<char> = chars.take_while(|c| is_word_char(*c)).collect();
    if run.is_empty() {
        return None;
    }

    run.reverse();
    let len = run.len();

    Some(Trigger {
        text: run.into_iter().collect(),
        span: Span {
            start: caret - len,
            end: caret,
        },
    })
}
