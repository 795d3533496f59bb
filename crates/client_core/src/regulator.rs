//! Regulator dashboard poller.
//!
//! Each tick fetches stats, alerts and the audit log concurrently and commits
//! them together. A tick where any of the three fails changes nothing.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use shared::protocol::{Alert, PlatformStats, SubmissionRecord};
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info};

use crate::{AnalysisApi, TransportError};

pub const POLL_INTERVAL: Duration = Duration::from_millis(10_000);
/// Lower bound applied to the configured interval; tokio rejects a zero period.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    /// True until the first tick commits; never set again afterwards.
    pub loading: bool,
    pub stats: PlatformStats,
    pub alerts: Vec<Alert>,
    pub submissions: Vec<SubmissionRecord>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            loading: true,
            stats: PlatformStats::default(),
            alerts: Vec::new(),
            submissions: Vec::new(),
            refreshed_at: None,
        }
    }
}

struct DashboardSnapshot {
    stats: PlatformStats,
    alerts: Vec<Alert>,
    submissions: Vec<SubmissionRecord>,
}

struct PollHandle {
    stop: oneshot::Sender<()>,
    stopped: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

pub struct RegulatorPoller {
    api: Arc<dyn AnalysisApi>,
    settings: PollSettings,
    state: Arc<watch::Sender<DashboardState>>,
    /// Held for the whole of a tick so two ticks never interleave.
    tick_gate: Arc<tokio::sync::Mutex<()>>,
    running: Mutex<Option<PollHandle>>,
}

impl RegulatorPoller {
    pub fn new(api: Arc<dyn AnalysisApi>, settings: PollSettings) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            api,
            settings,
            state: Arc::new(state),
            tick_gate: Arc::new(tokio::sync::Mutex::new(())),
            running: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Starts polling with one immediate tick. Calling it while already
    /// running is a no-op.
    pub fn start(&self) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
        {
            return;
        }

        let (stop, stop_rx) = oneshot::channel();
        let stopped = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.api),
            Arc::clone(&self.state),
            Arc::clone(&self.tick_gate),
            self.settings.interval,
            stop_rx,
            Arc::clone(&stopped),
        ));
        info!(interval_ms = self.settings.interval.as_millis() as u64, "regulator polling started");
        *running = Some(PollHandle {
            stop,
            stopped,
            task,
        });
    }

    /// Cancels the poll timer. A tick already in flight finishes its requests
    /// but its result is discarded.
    pub fn stop(&self) {
        let handle = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stopped.store(true, Ordering::Release);
            let _ = handle.stop.send(());
            debug!("regulator polling stopped");
        }
    }

    /// Runs one tick outside the timer, serialized with timer ticks.
    pub async fn refresh(&self) -> Result<(), TransportError> {
        let _tick = self.tick_gate.lock().await;
        let snapshot = fetch_snapshot(self.api.as_ref()).await?;
        commit(&self.state, snapshot);
        Ok(())
    }
}

impl Drop for RegulatorPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    api: Arc<dyn AnalysisApi>,
    state: Arc<watch::Sender<DashboardState>>,
    tick_gate: Arc<tokio::sync::Mutex<()>>,
    interval: Duration,
    mut stop_rx: oneshot::Receiver<()>,
    stopped: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(interval.max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut stop_rx => break,
        }

        let _tick = tick_gate.lock().await;
        let outcome = fetch_snapshot(api.as_ref()).await;
        if stopped.load(Ordering::Acquire) {
            debug!("dashboard closed during tick; discarding result");
            break;
        }

        match outcome {
            Ok(snapshot) => commit(&state, snapshot),
            Err(err) => debug!(error = %err, "regulator tick failed; keeping previous dashboard"),
        }
    }
}

async fn fetch_snapshot(api: &dyn AnalysisApi) -> Result<DashboardSnapshot, TransportError> {
    let (stats, alerts, submissions) =
        futures::future::join3(api.platform_stats(), api.early_alerts(), api.audit_log()).await;
    Ok(DashboardSnapshot {
        stats: stats?,
        alerts: alerts?,
        submissions: submissions?,
    })
}

fn commit(state: &watch::Sender<DashboardState>, snapshot: DashboardSnapshot) {
    state.send_modify(|dashboard| {
        dashboard.loading = false;
        dashboard.stats = snapshot.stats;
        dashboard.alerts = snapshot.alerts;
        dashboard.submissions = snapshot.submissions;
        dashboard.refreshed_at = Some(Utc::now());
    });
}

#[cfg(test)]
#[path = "tests/regulator_tests.rs"]
mod tests;
