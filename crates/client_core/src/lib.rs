//! Client-side orchestration for the GreenWatch analysis service: transport,
//! live interception, submission lifecycle, result projection, regulator
//! polling and the application shell that ties them together.

use async_trait::async_trait;
use shared::{
    domain::ProductSubmission,
    protocol::{
        Alert, AnalysisResult, LiveAnalysis, PlatformStats, SellerProfile, SubmissionRecord,
    },
};

pub mod live;
pub mod projector;
pub mod regulator;
pub mod shell;
pub mod submission;
pub mod transport;

pub use live::{LiveInterceptionController, LiveSettings};
pub use projector::{project, RenderModel};
pub use regulator::{DashboardState, PollSettings, RegulatorPoller};
pub use shell::{AppShell, Tab};
pub use submission::{SubmissionController, SubmissionError, SubmissionPhase};
pub use transport::{TransportClient, TransportConfig, TransportError};

/// Operations the analysis service exposes. Controllers only see this trait,
/// which keeps them independent of the HTTP client.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn analyze(&self, submission: &ProductSubmission)
        -> Result<AnalysisResult, TransportError>;
    async fn analyze_live(&self, text: &str) -> Result<LiveAnalysis, TransportError>;
    async fn seller_profile(&self, company: &str) -> Result<SellerProfile, TransportError>;
    async fn platform_stats(&self) -> Result<PlatformStats, TransportError>;
    async fn early_alerts(&self) -> Result<Vec<Alert>, TransportError>;
    async fn audit_log(&self) -> Result<Vec<SubmissionRecord>, TransportError>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
