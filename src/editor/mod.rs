//! Editor integration
//!
//! Attaches to text buffers and turns edit events into trigger detection,
//! suggestion lookups, expansions, and prompt captures.
//!
//! # Invariants
//!
//! - Every attached buffer owns exactly one suggestion controller
//! - One capture detector (and debounce timestamp) serves all buffers
//! - Store failures are logged and never alter buffer content
//! - Store writes (usage, captures) never block an edit event
//! - Expansion only touches the recorded trigger span

mod buffer;
mod capture;
mod events;
mod expansion;
mod suggestions;
pub mod trigger;

pub use buffer::{BufferId, TextBuffer};
pub use capture::{debounce_elapsed, CaptureOutcome, Clock, ManualClock, PromptCapture, SystemClock};
pub use events::{EditorEvent, EventOutcome, Key};
pub use expansion::{expand, Expansion};
pub use suggestions::{RequestToken, SuggestionController};
pub use trigger::{Span, Trigger};

use crate::config::ShorthandConfig;
use crate::error::{Result, ShorthandError};
use crate::generation::GenerationHandle;
use crate::storage::AcronymStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// State for one attached buffer
struct EditorSession {
    buffer: TextBuffer,
    suggestions: SuggestionController,
}

/// Acronym-aware editor managing attached buffers
///
/// Every buffer has its own suggestion state. Prompt capture is shared: one
/// debounce timestamp covers all attached buffers. Usage increments and
/// captured entries are written on spawned tasks, so a slow store never
/// delays an edit; [`AcronymEditor::flush`] waits for them.
pub struct AcronymEditor {
    config: ShorthandConfig,
    store: Arc<dyn AcronymStore>,
    generation: Option<GenerationHandle>,
    capture: PromptCapture,
    sessions: HashMap<BufferId, EditorSession>,
    background: Vec<JoinHandle<()>>,
    next_buffer_id: BufferId,
}

impl AcronymEditor {
    /// Create new editor backed by `store`
    pub fn new(config: ShorthandConfig, store: Arc<dyn AcronymStore>) -> Self {
        let capture = PromptCapture::new(config.capture.clone(), Arc::new(SystemClock));
        Self {
            config,
            store,
            generation: None,
            capture,
            sessions: HashMap::new(),
            background: Vec::new(),
            next_buffer_id: 0,
        }
    }

    /// Forward captures to a running generation worker
    pub fn with_generation(mut self, handle: GenerationHandle) -> Self {
        self.generation = Some(handle);
        self
    }

    /// Use `clock` for capture debouncing
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.capture = PromptCapture::new(self.config.capture.clone(), clock);
        self
    }

    /// Attach a buffer and start handling its edits
    pub fn attach(&mut self, initial: &str) -> BufferId {
        let id = self.next_buffer_id;
        self.next_buffer_id += 1;

        let session = EditorSession {
            buffer: TextBuffer::new(id, initial),
            suggestions: SuggestionController::new(&self.config.suggestions),
        };
        self.sessions.insert(id, session);
        debug!("Attached buffer {}", id);

        id
    }

    /// Detach a buffer, releasing its state; returns the final text
    pub fn detach(&mut self, id: BufferId) -> Result<String> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(ShorthandError::NotAttached(id))?;
        debug!("Detached buffer {}", id);
        Ok(session.buffer.text())
    }

    /// Detach every buffer
    pub fn detach_all(&mut self) {
        self.sessions.clear();
    }

    pub fn is_attached(&self, id: BufferId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Current buffer text
    pub fn get_value(&self, id: BufferId) -> Result<String> {
        Ok(self.session(id)?.buffer.text())
    }

    /// Programmatic update: replaces the text, caret to end, suggestions cleared
    pub fn set_value(&mut self, id: BufferId, text: &str) -> Result<()> {
        let session = self.session_mut(id)?;
        session.buffer.set_text(text);
        session.suggestions.clear();
        Ok(())
    }

    pub fn caret(&self, id: BufferId) -> Result<usize> {
        Ok(self.session(id)?.buffer.caret())
    }

    /// Suggestion state of a buffer
    pub fn suggestions(&self, id: BufferId) -> Result<&SuggestionController> {
        Ok(&self.session(id)?.suggestions)
    }

    /// Time of the last successful prompt capture, across all buffers
    pub fn last_capture(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.capture.last_capture()
    }

    /// Background store writes not yet known to have finished
    pub fn pending_writes(&mut self) -> usize {
        self.background.retain(|task| !task.is_finished());
        self.background.len()
    }

    /// Wait for every background store write started so far
    pub async fn flush(&mut self) {
        for task in std::mem::take(&mut self.background) {
            if let Err(e) = task.await {
                warn!("Background store write did not complete: {}", e);
            }
        }
    }

    /// Handle one edit event
    pub async fn handle_event(&mut self, id: BufferId, event: EditorEvent) -> Result<EventOutcome> {
        let store = Arc::clone(&self.store);
        let auto_expand = self.config.suggestions.auto_expand;
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(ShorthandError::NotAttached(id))?;

        let outcome = match event {
            EditorEvent::Insert(text) => {
                session.buffer.insert(&text);

                if let Some(typed) = text.chars().last() {
                    let snapshot = session.buffer.text();
                    let outcome = self.capture.on_keystroke(
                        typed,
                        &snapshot,
                        Arc::clone(&store),
                        self.generation.clone(),
                    );
                    if let CaptureOutcome::Dispatched(task) = outcome {
                        self.background.push(task);
                    }
                }

                refresh_suggestions(session, store.as_ref()).await;
                EventOutcome::Handled
            }
            EditorEvent::Backspace => {
                session.buffer.delete_backward();
                refresh_suggestions(session, store.as_ref()).await;
                EventOutcome::Handled
            }
            EditorEvent::MoveCaret(caret) => {
                session.buffer.set_caret(caret);
                session.suggestions.clear();
                EventOutcome::Handled
            }
            EditorEvent::Key(Key::Tab) => {
                if auto_expand && session.suggestions.has_items() {
                    EventOutcome::Expanded(expand_index(session, 0)?)
                } else {
                    EventOutcome::Ignored
                }
            }
            EditorEvent::Key(Key::Enter) => match session.suggestions.selected_index() {
                Some(index) if session.suggestions.is_visible() => {
                    EventOutcome::Expanded(expand_index(session, index)?)
                }
                _ => EventOutcome::Ignored,
            },
            EditorEvent::Key(Key::Down) if session.suggestions.is_visible() => {
                session.suggestions.select_next();
                EventOutcome::Handled
            }
            EditorEvent::Key(Key::Up) if session.suggestions.is_visible() => {
                session.suggestions.select_previous();
                EventOutcome::Handled
            }
            EditorEvent::Key(Key::Escape) if session.suggestions.is_visible() => {
                session.suggestions.clear();
                EventOutcome::Handled
            }
            EditorEvent::Key(_) => EventOutcome::Ignored,
            EditorEvent::Click(index) => {
                if session.suggestions.is_visible() && session.suggestions.select(index) {
                    EventOutcome::Expanded(expand_index(session, index)?)
                } else {
                    EventOutcome::Ignored
                }
            }
            EditorEvent::Blur => {
                session.suggestions.clear();
                EventOutcome::Handled
            }
        };

        if let EventOutcome::Expanded(expansion) = &outcome {
            self.record_usage(expansion);
        }

        Ok(outcome)
    }

    /// Expand the highlighted suggestion
    ///
    /// Fails with [`ShorthandError::NoSelection`] when nothing is highlighted.
    pub async fn expand_selected(&mut self, id: BufferId) -> Result<Expansion> {
        let session = self.session_mut(id)?;
        let index = session
            .suggestions
            .selected_index()
            .ok_or(ShorthandError::NoSelection)?;

        let expansion = expand_index(session, index)?;
        self.record_usage(&expansion);
        Ok(expansion)
    }

    /// Bump the usage counter of an expanded record without waiting for the store
    fn record_usage(&mut self, expansion: &Expansion) {
        let store = Arc::clone(&self.store);
        let id = expansion.acronym_id;
        let acronym = expansion.acronym.clone();

        self.background.retain(|task| !task.is_finished());
        self.background.push(tokio::spawn(async move {
            if let Err(e) = store.increment_usage(id).await {
                warn!("Failed to record usage for {}: {}", acronym, e);
            }
        }));
    }

    fn session(&self, id: BufferId) -> Result<&EditorSession> {
        self.sessions.get(&id).ok_or(ShorthandError::NotAttached(id))
    }

    fn session_mut(&mut self, id: BufferId) -> Result<&mut EditorSession> {
        self.sessions
            .get_mut(&id)
            .ok_or(ShorthandError::NotAttached(id))
    }
}

/// Re-run trigger detection and lookup after an edit
async fn refresh_suggestions(session: &mut EditorSession, store: &dyn AcronymStore) {
    let Some(trigger) = trigger::detect_in_rope(session.buffer.rope(), session.buffer.caret())
    else {
        session.suggestions.clear();
        return;
    };

    let query = trigger.text.clone();
    let token = session.suggestions.begin_request(trigger);

    match store.search(&query).await {
        Ok(results) => {
            session.suggestions.apply_results(token, results);
        }
        Err(e) => {
            warn!("Acronym lookup for '{}' failed: {}", query, e);
            session.suggestions.clear();
        }
    }
}

/// Expand suggestion `index` over the recorded trigger span
fn expand_index(session: &mut EditorSession, index: usize) -> Result<Expansion> {
    let record = session
        .suggestions
        .get(index)
        .cloned()
        .ok_or_else(|| ShorthandError::InvalidOperation(format!("no suggestion at index {}", index)))?;
    let span = session
        .suggestions
        .trigger()
        .map(|t| t.span)
        .ok_or_else(|| ShorthandError::InvalidOperation("no active trigger".to_string()))?;

    let expansion = expand(&mut session.buffer, span, &record)?;
    session.suggestions.clear();

    debug!("Expanded {} -> {}", record.acronym, record.expansion);
    Ok(expansion)
}
