//! HTTP transport to the analysis service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::ProductSubmission,
    protocol::{
        Alert, AlertsResponse, AnalysisResult, LiveAnalysis, LiveAnalyzeRequest, PlatformStats,
        SellerProfile, SubmissionRecord, SubmissionsResponse,
    },
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::AnalysisApi;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("analysis service unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("analysis service returned HTTP {0}")]
    HttpStatus(u16),
    #[error("malformed response body: {0}")]
    InvalidBody(String),
    #[error("invalid service endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if let Some(status) = err.status() {
            TransportError::HttpStatus(status.as_u16())
        } else if err.is_decode() {
            TransportError::InvalidBody(err.to_string())
        } else {
            TransportError::NetworkUnreachable(err.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Request issuer bound to one base address. No retries happen here.
#[derive(Debug, Clone)]
pub struct TransportClient {
    http: Client,
    base_url: Url,
}

impl TransportClient {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| {
            TransportError::InvalidEndpoint(format!("{}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidEndpoint(config.base_url));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::NetworkUnreachable(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Each segment is percent-encoded on its own, so a `/` inside a segment
    /// never changes the route.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "issuing analysis service request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let value = request
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(value)
    }

    async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<T, TransportError> {
        let value = self.request(method, segments, body).await?;
        serde_json::from_value(value).map_err(|e| TransportError::InvalidBody(e.to_string()))
    }
}

fn to_body<T: serde::Serialize>(payload: &T) -> Result<Value, TransportError> {
    serde_json::to_value(payload).map_err(|e| TransportError::InvalidBody(e.to_string()))
}

#[async_trait]
impl AnalysisApi for TransportClient {
    async fn analyze(
        &self,
        submission: &ProductSubmission,
    ) -> Result<AnalysisResult, TransportError> {
        let body = to_body(submission)?;
        let raw = self.request(Method::POST, &["analyze"], Some(&body)).await?;
        Ok(AnalysisResult::new(raw))
    }

    async fn analyze_live(&self, text: &str) -> Result<LiveAnalysis, TransportError> {
        let body = to_body(&LiveAnalyzeRequest {
            text: text.to_string(),
        })?;
        self.request_as(Method::POST, &["analyze-live"], Some(&body))
            .await
    }

    async fn seller_profile(&self, company: &str) -> Result<SellerProfile, TransportError> {
        self.request_as(Method::GET, &["seller", company, "profile"], None)
            .await
    }

    async fn platform_stats(&self) -> Result<PlatformStats, TransportError> {
        self.request_as(Method::GET, &["regulator", "stats"], None)
            .await
    }

    async fn early_alerts(&self) -> Result<Vec<Alert>, TransportError> {
        let response: AlertsResponse = self
            .request_as(Method::GET, &["regulator", "alerts"], None)
            .await?;
        Ok(response.alerts)
    }

    async fn audit_log(&self) -> Result<Vec<SubmissionRecord>, TransportError> {
        let response: SubmissionsResponse = self
            .request_as(Method::GET, &["regulator", "submissions"], None)
            .await?;
        Ok(response.submissions)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
