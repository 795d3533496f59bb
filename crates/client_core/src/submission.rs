//! Submission lifecycle: `Idle -> Validating -> Submitting -> {Succeeded, Failed}`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{domain::ProductSubmission, error::ValidationError, protocol::AnalysisResult};
use thiserror::Error;
use tracing::{info, warn};

use crate::{AnalysisApi, TransportError};

pub const BACKEND_UNREACHABLE_MESSAGE: &str =
    "Could not reach the analysis service. Make sure the backend is running and try again.";
pub const SUBMISSION_IN_FLIGHT_MESSAGE: &str = "A submission is already being analyzed.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed {
        message: String,
    },
}

impl SubmissionPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionPhase::Validating | SubmissionPhase::Submitting)
    }
}

#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    #[error("a submission is already in flight")]
    InFlight,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("analysis request failed: {0}")]
    Backend(#[from] TransportError),
}

impl SubmissionError {
    /// Text shown to the user. Backend failures collapse to one generic
    /// message whatever the underlying transport error was.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::InFlight => SUBMISSION_IN_FLIGHT_MESSAGE.to_string(),
            SubmissionError::Validation(err) => err.to_string(),
            SubmissionError::Backend(_) => BACKEND_UNREACHABLE_MESSAGE.to_string(),
        }
    }
}

pub struct SubmissionController {
    api: Arc<dyn AnalysisApi>,
    phase: Mutex<SubmissionPhase>,
}

impl SubmissionController {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self {
            api,
            phase: Mutex::new(SubmissionPhase::Idle),
        }
    }

    fn phase_mut(&self) -> MutexGuard<'_, SubmissionPhase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase_mut().clone()
    }

    /// A form edit returns a finished controller to `Idle`.
    pub fn on_edit(&self) {
        let mut phase = self.phase_mut();
        if matches!(
            *phase,
            SubmissionPhase::Succeeded | SubmissionPhase::Failed { .. }
        ) {
            *phase = SubmissionPhase::Idle;
        }
    }

    /// Validates and submits `form`. A call made while another submission is
    /// in flight is rejected without touching the network.
    pub async fn submit(
        &self,
        form: &ProductSubmission,
    ) -> Result<AnalysisResult, SubmissionError> {
        {
            let mut phase = self.phase_mut();
            if phase.is_busy() {
                warn!("ignoring submit while a submission is in flight");
                return Err(SubmissionError::InFlight);
            }

            *phase = SubmissionPhase::Validating;
            if let Err(err) = form.validate() {
                *phase = SubmissionPhase::Failed {
                    message: err.to_string(),
                };
                return Err(err.into());
            }
            *phase = SubmissionPhase::Submitting;
        }

        let mut guard = InFlightGuard {
            phase: &self.phase,
            armed: true,
        };
        let outcome = self.api.analyze(form).await;
        guard.armed = false;

        let mut phase = self.phase_mut();
        match outcome {
            Ok(result) => {
                info!(company = %form.company_name, "analysis completed");
                *phase = SubmissionPhase::Succeeded;
                Ok(result)
            }
            Err(err) => {
                warn!(company = %form.company_name, error = %err, "analysis request failed");
                *phase = SubmissionPhase::Failed {
                    message: BACKEND_UNREACHABLE_MESSAGE.to_string(),
                };
                Err(err.into())
            }
        }
    }
}

/// Returns the controller to `Idle` if the submit future is dropped while the
/// request is outstanding.
struct InFlightGuard<'a> {
    phase: &'a Mutex<SubmissionPhase>,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
            if *phase == SubmissionPhase::Submitting {
                *phase = SubmissionPhase::Idle;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
