//! Prompt capture with debouncing
//!
//! Watches typed characters for sentence/paragraph terminators and hands the
//! trimmed buffer to the store as a captured entry, at most once per debounce
//! interval. Skipped captures are not queued. The store write runs on a
//! spawned task; failures are logged there and never reach the editing flow.

use crate::config::CaptureConfig;
use crate::generation::GenerationHandle;
use crate::storage::AcronymStore;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Source of "now" for debounce decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whether enough time has passed since the last successful capture
///
/// The elapsed time must strictly exceed `interval`.
pub fn debounce_elapsed(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: Duration) -> bool {
    match last {
        None => true,
        Some(last) => match (now - last).to_std() {
            Ok(elapsed) => elapsed > interval,
            // Clock went backwards
            Err(_) => false,
        },
    }
}

/// What a keystroke did to the capture pipeline
#[derive(Debug)]
pub enum CaptureOutcome {
    /// Capture disabled or store lacks the capability
    Disabled,
    /// Typed character is not a terminator
    NotBoundary,
    /// Buffer is blank after trimming
    Empty,
    /// Within the debounce interval; dropped
    Debounced,
    /// Previous write has not finished; dropped
    InFlight,
    /// Store write running in the background
    Dispatched(JoinHandle<()>),
}

impl CaptureOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, CaptureOutcome::Dispatched(_))
    }
}

#[derive(Debug, Default)]
struct CaptureState {
    last_capture: Option<DateTime<Utc>>,
    in_flight: bool,
}

/// Capture detector shared by every buffer of an editor
///
/// One last-capture timestamp covers all buffers, so the debounce interval
/// bounds the capture rate of the whole editor.
pub struct PromptCapture {
    config: CaptureConfig,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<CaptureState>>,
}

impl PromptCapture {
    pub fn new(config: CaptureConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Arc::new(Mutex::new(CaptureState::default())),
        }
    }

    /// Time of the last successful capture
    pub fn last_capture(&self) -> Option<DateTime<Utc>> {
        lock(&self.state).last_capture
    }

    /// Inspect the most recently typed character and capture if warranted
    ///
    /// Never waits on the store: the write and the generation request run on
    /// a spawned task. Must be called from within a tokio runtime.
    pub fn on_keystroke(
        &self,
        typed: char,
        buffer_text: &str,
        store: Arc<dyn AcronymStore>,
        generation: Option<GenerationHandle>,
    ) -> CaptureOutcome {
        if !self.config.enabled || !store.capabilities().prompt_capture {
            return CaptureOutcome::Disabled;
        }

        if !self.config.terminators.contains(&typed) {
            return CaptureOutcome::NotBoundary;
        }

        let trimmed = buffer_text.trim();
        if trimmed.is_empty() {
            return CaptureOutcome::Empty;
        }

        let now = self.clock.now();
        {
            let mut state = lock(&self.state);
            if state.in_flight {
                debug!("Capture skipped: previous capture still being written");
                return CaptureOutcome::InFlight;
            }
            if !debounce_elapsed(state.last_capture, now, self.config.debounce) {
                debug!("Capture skipped: within debounce interval");
                return CaptureOutcome::Debounced;
            }
            state.in_flight = true;
        }

        let content = trimmed.to_string();
        let state = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            let result = store.create_entry(&content).await;

            {
                let mut state = lock(&state);
                state.in_flight = false;
                if result.is_ok() {
                    state.last_capture = Some(now);
                }
            }

            match result {
                Ok(entry) => {
                    debug!("Captured {} ({} chars)", entry.id, content.chars().count());

                    if let Some(handle) = generation {
                        if !handle.request() {
                            warn!("Generation worker is not running; captured entry left pending");
                        }
                    }
                }
                Err(e) => warn!("Failed to capture prompt: {}", e),
            }
        });

        CaptureOutcome::Dispatched(task)
    }
}

fn lock(state: &Mutex<CaptureState>) -> std::sync::MutexGuard<'_, CaptureState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
