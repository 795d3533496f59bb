//! Debounced "live interception" of in-progress product copy.
//!
//! Every input change bumps a generation counter. A debounce timer carries the
//! generation it was scheduled under and its response is applied only if that
//! generation is still the latest one when the response arrives, so the most
//! recent *input* wins regardless of response arrival order.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shared::protocol::LiveWarning;
use tokio::sync::{oneshot, watch};
use tracing::{debug, trace};

use crate::AnalysisApi;

pub const LIVE_DEBOUNCE: Duration = Duration::from_millis(700);
pub const LIVE_MIN_CHARS: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct LiveSettings {
    pub debounce: Duration,
    pub min_chars: usize,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            debounce: LIVE_DEBOUNCE,
            min_chars: LIVE_MIN_CHARS,
        }
    }
}

#[derive(Default)]
struct LiveState {
    generation: u64,
    /// Dropping this sender cancels the timer that holds the receiver.
    pending_timer: Option<oneshot::Sender<()>>,
}

fn lock(state: &Mutex<LiveState>) -> MutexGuard<'_, LiveState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct LiveInterceptionController {
    api: Arc<dyn AnalysisApi>,
    settings: LiveSettings,
    state: Arc<Mutex<LiveState>>,
    warnings: Arc<watch::Sender<Vec<LiveWarning>>>,
    /// True while a timer or request for the latest generation is outstanding.
    /// Only written with `state` locked.
    pending: Arc<watch::Sender<bool>>,
}

impl LiveInterceptionController {
    pub fn new(api: Arc<dyn AnalysisApi>, settings: LiveSettings) -> Self {
        let (warnings, _) = watch::channel(Vec::new());
        let (pending, _) = watch::channel(false);
        Self {
            api,
            settings,
            state: Arc::new(Mutex::new(LiveState::default())),
            warnings: Arc::new(warnings),
            pending: Arc::new(pending),
        }
    }

    pub fn warnings(&self) -> Vec<LiveWarning> {
        self.warnings.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<LiveWarning>> {
        self.warnings.subscribe()
    }

    /// Whether the latest input still has a check waiting to fire or a
    /// response yet to land.
    pub fn is_pending(&self) -> bool {
        *self.pending.borrow()
    }

    /// Resolves once the latest input's check has landed, failed, or been
    /// superseded by an input that needs no check.
    pub async fn settled(&self) {
        let mut pending = self.pending.subscribe();
        let _ = pending.wait_for(|busy| !*busy).await;
    }

    /// Re-evaluates the current (description, title) pair. Must be called
    /// from within a tokio runtime.
    pub fn on_input(&self, description: &str, title: &str) {
        let description = description.trim();
        let title = title.trim();

        let mut state = lock(&self.state);
        state.generation += 1;
        let token = state.generation;
        state.pending_timer = None;

        if description.chars().count() + title.chars().count() < self.settings.min_chars {
            self.warnings.send_if_modified(|warnings| {
                let changed = !warnings.is_empty();
                warnings.clear();
                changed
            });
            self.pending.send_if_modified(|busy| std::mem::replace(busy, false));
            return;
        }

        let (cancel_tx, cancel_rx) = oneshot::channel();
        state.pending_timer = Some(cancel_tx);
        self.pending.send_if_modified(|busy| !std::mem::replace(busy, true));
        drop(state);

        let text = [description, title]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        tokio::spawn(fire_after_quiet_period(
            Arc::clone(&self.api),
            Arc::clone(&self.state),
            Arc::clone(&self.warnings),
            Arc::clone(&self.pending),
            self.settings.debounce,
            token,
            text,
            cancel_rx,
        ));
    }

    /// Cancels any pending timer and marks in-flight requests stale.
    pub fn shutdown(&self) {
        let mut state = lock(&self.state);
        state.generation += 1;
        state.pending_timer = None;
        self.pending.send_if_modified(|busy| std::mem::replace(busy, false));
    }
}

impl Drop for LiveInterceptionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn fire_after_quiet_period(
    api: Arc<dyn AnalysisApi>,
    state: Arc<Mutex<LiveState>>,
    warnings: Arc<watch::Sender<Vec<LiveWarning>>>,
    pending: Arc<watch::Sender<bool>>,
    debounce: Duration,
    token: u64,
    text: String,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    tokio::select! {
        _ = tokio::time::sleep(debounce) => {}
        _ = &mut cancel_rx => {
            trace!(token, "live debounce timer cancelled");
            return;
        }
    }

    {
        let mut state = lock(&state);
        if state.generation != token {
            return;
        }
        state.pending_timer = None;
    }

    let outcome = api.analyze_live(&text).await;

    let state = lock(&state);
    if state.generation != token {
        debug!(
            token,
            latest = state.generation,
            "discarding superseded live interception result"
        );
        return;
    }

    match outcome {
        Ok(analysis) => {
            trace!(token, count = analysis.warnings.len(), "live warnings updated");
            warnings.send_replace(analysis.warnings);
        }
        Err(err) => {
            debug!(token, error = %err, "live interception request failed; keeping previous warnings");
        }
    }
    pending.send_if_modified(|busy| std::mem::replace(busy, false));
}

#[cfg(test)]
#[path = "tests/live_tests.rs"]
mod tests;
