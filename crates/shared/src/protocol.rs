use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{AlertLevel, Verdict};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveAnalyzeRequest {
    pub text: String,
}

/// Claim phrase flagged while the seller is still typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveWarning {
    #[serde(default)]
    pub phrase: String,
    #[serde(rename = "type", default)]
    pub claim_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveAnalysis {
    pub warnings: Vec<LiveWarning>,
    pub warning_count: usize,
    pub has_proof_markers: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringPattern {
    #[serde(default)]
    pub phrase: String,
    #[serde(default)]
    pub occurrences: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub alert_level: AlertLevel,
    #[serde(default)]
    pub greenwashed_count: u64,
    #[serde(default)]
    pub total_submissions: u64,
    #[serde(default)]
    pub avg_risk_score: f64,
    #[serde(default)]
    pub recurring_patterns: Vec<RecurringPattern>,
    #[serde(default)]
    pub recommended_action: String,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_seen: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
}

/// One row of the regulator audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub claim_count: u64,
    #[serde(default)]
    pub verdict: Verdict,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionsResponse {
    pub submissions: Vec<SubmissionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformStats {
    pub total_scanned: u64,
    pub greenwashed: u64,
    pub under_review: u64,
    pub verified: u64,
    pub high_risk_sellers: u64,
    pub avg_risk_score: f64,
}

/// Cumulative history of one seller, as returned by `/seller/{company}/profile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SellerProfile {
    pub company: String,
    pub total_submissions: u64,
    pub greenwashed_count: u64,
    pub review_count: u64,
    pub verified_count: u64,
    pub avg_risk_score: f64,
    pub alert_level: AlertLevel,
    pub recurring_phrases: BTreeMap<String, u64>,
    #[serde(
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_seen: Option<NaiveDateTime>,
    #[serde(
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_seen: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Parses the timestamp forms the service emits: naive ISO 8601 with or
/// without fractional seconds, a space separator, or RFC 3339 with an offset
/// (converted to UTC). Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    raw.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}

/// An unreadable timestamp becomes `None` rather than failing the whole row.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(parse_timestamp))
}

/// Raw `/analyze` response body.
///
/// The payload is loosely structured and every block is optional, so it is
/// kept as JSON and normalized by the projector when rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult {
    raw: serde_json::Value,
}

impl AnalysisResult {
    pub fn new(raw: serde_json::Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }
}
