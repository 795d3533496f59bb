//! Normalizes a raw `/analyze` payload into a fully defaulted render model.
//!
//! [`project`] is total and deterministic: any JSON value, including one with
//! missing blocks or fields of the wrong type, produces a complete model, and
//! the same payload always produces the same model.

use serde::Serialize;
use serde_json::Value;
use shared::{
    domain::{AiRiskTier, AlertLevel, CertStatus, Tone, Verdict, VisibilityAction},
    protocol::AnalysisResult,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductEcho {
    pub title: String,
    pub company: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictBanner {
    pub verdict: Verdict,
    pub label: &'static str,
    pub tone: Tone,
}

impl From<Verdict> for VerdictBanner {
    fn from(verdict: Verdict) -> Self {
        Self {
            verdict,
            label: verdict.label(),
            tone: verdict.tone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimView {
    pub phrase: String,
    pub claim_type: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedFlagView {
    pub pattern: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiRiskPanel {
    pub tier: AiRiskTier,
    pub tone: Tone,
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateView {
    pub cert: String,
    pub status: CertStatus,
    pub status_label: &'static str,
    pub tone: Tone,
    pub reason: String,
    pub certificate_number: Option<String>,
    pub expiry_warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingCertView {
    pub cert: String,
    pub reason: String,
}

/// Guidance for one non-verified certificate, flattened with the
/// certificate name and its status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemediationEntry {
    pub cert: String,
    pub issue: CertStatus,
    pub action: String,
    pub description: String,
    pub steps: Vec<String>,
    pub timeline: Option<String>,
    pub cost_tier: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreLine {
    pub source: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibilityPanel {
    pub action: VisibilityAction,
    pub tone: Tone,
    pub adjustment: String,
    pub description: String,
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SellerHistoryView {
    pub prior_submissions: u64,
    pub prior_greenwash_count: u64,
    pub alert_level: AlertLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub product: ProductEcho,
    pub verdict: VerdictBanner,
    pub risk_score: u8,
    pub claims: Vec<ClaimView>,
    pub claim_count: usize,
    pub has_proof_markers: bool,
    pub red_flags: Vec<RedFlagView>,
    pub ai_risk: Option<AiRiskPanel>,
    pub certificates: Vec<CertificateView>,
    pub overall_cert_status: Option<String>,
    pub missing_recommended: Vec<MissingCertView>,
    pub sdg_targets: Vec<String>,
    pub regulatory_urgency: Option<String>,
    pub remediation: Vec<RemediationEntry>,
    pub score_breakdown: Vec<ScoreLine>,
    pub visibility: Option<VisibilityPanel>,
    pub seller_history: SellerHistoryView,
}

pub fn project(result: &AnalysisResult) -> RenderModel {
    let raw = result.raw();
    let nlp = field(Some(raw), &["nlp_analysis"]);
    let certs = field(Some(raw), &["certificate_analysis"]);
    let risk = field(Some(raw), &["risk_assessment"]);

    let claims = list(nlp, &["claims_detected"])
        .iter()
        .map(|claim| ClaimView {
            phrase: text(Some(claim), &["phrase"]),
            claim_type: text(Some(claim), &["type"]),
            confidence: number(Some(claim), &["confidence"]).map(|c| c.clamp(0.0, 1.0)),
        })
        .collect::<Vec<_>>();

    let verification_results = list(certs, &["verification_results"]);

    RenderModel {
        product: ProductEcho {
            title: text(Some(raw), &["product", "title"]),
            company: text(Some(raw), &["product", "company"]),
            category: text(Some(raw), &["product", "category"]),
        },
        verdict: optional_text(risk, &["verdict"])
            .map(|wire| Verdict::from_wire(&wire))
            .unwrap_or_default()
            .into(),
        risk_score: risk_score(risk),
        claim_count: number(nlp, &["claim_count"])
            .filter(|count| *count >= 0.0)
            .map(|count| count as usize)
            .unwrap_or(claims.len()),
        claims,
        has_proof_markers: field(nlp, &["has_proof_markers"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
        red_flags: list(nlp, &["red_flags"])
            .iter()
            .map(|flag| RedFlagView {
                pattern: text(Some(flag), &["pattern"]),
                description: text(Some(flag), &["description"]),
            })
            .collect(),
        ai_risk: ai_risk_panel(field(nlp, &["ai_generated_risk"])),
        certificates: verification_results.iter().map(certificate_view).collect(),
        overall_cert_status: optional_text(certs, &["overall_cert_status"]),
        missing_recommended: list(certs, &["missing_recommended"])
            .iter()
            .map(|missing| MissingCertView {
                cert: text(Some(missing), &["cert"]),
                reason: text(Some(missing), &["reason"]),
            })
            .collect(),
        sdg_targets: sdg_targets(raw),
        regulatory_urgency: optional_text(Some(raw), &["sdg_report", "regulatory_urgency"]),
        remediation: verification_results
            .iter()
            .filter_map(remediation_entry)
            .collect(),
        score_breakdown: list(risk, &["score_breakdown"])
            .iter()
            .map(|line| ScoreLine {
                source: text(Some(line), &["source"]),
                points: number(Some(line), &["points"]).unwrap_or(0.0),
            })
            .collect(),
        visibility: visibility_panel(field(risk, &["visibility_impact"])),
        seller_history: SellerHistoryView {
            prior_submissions: count(Some(raw), &["seller_history", "prior_submissions"]),
            prior_greenwash_count: count(Some(raw), &["seller_history", "prior_greenwash_count"]),
            alert_level: optional_text(Some(raw), &["seller_history", "alert_level"])
                .map(|wire| AlertLevel::from_wire(&wire))
                .unwrap_or_default(),
        },
    }
}

fn risk_score(risk: Option<&Value>) -> u8 {
    number(risk, &["risk_score"])
        .map(|score| score.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}

fn certificate_view(entry: &Value) -> CertificateView {
    let status = cert_status(entry);
    CertificateView {
        cert: text(Some(entry), &["cert"]),
        status,
        status_label: status.label(),
        tone: status.tone(),
        reason: text(Some(entry), &["reason"]),
        certificate_number: optional_text(Some(entry), &["certificate_number"]),
        expiry_warning: optional_text(Some(entry), &["expiry_warning"]),
    }
}

fn cert_status(entry: &Value) -> CertStatus {
    optional_text(Some(entry), &["status"])
        .map(|wire| CertStatus::from_wire(&wire))
        .unwrap_or_default()
}

fn remediation_entry(entry: &Value) -> Option<RemediationEntry> {
    let status = cert_status(entry);
    if status == CertStatus::Verified {
        return None;
    }
    let remediation = field(Some(entry), &["remediation"]).filter(|value| value.is_object())?;
    Some(RemediationEntry {
        cert: text(Some(entry), &["cert"]),
        issue: status,
        action: text(Some(remediation), &["action"]),
        description: text(Some(remediation), &["description"]),
        steps: list(Some(remediation), &["steps"])
            .iter()
            .filter_map(|step| step.as_str().map(str::to_owned))
            .collect(),
        timeline: optional_text(Some(remediation), &["timeline"]),
        cost_tier: optional_text(Some(remediation), &["cost_tier"]),
        url: optional_text(Some(remediation), &["url"]),
    })
}

/// Prefers the risk assessment's targets and falls back to the SDG report.
fn sdg_targets(raw: &Value) -> Vec<String> {
    let primary = list(Some(raw), &["risk_assessment", "sdg_targets_affected"]);
    let source = if primary.is_empty() {
        list(Some(raw), &["sdg_report", "targets_affected"])
    } else {
        primary
    };
    source.iter().filter_map(sdg_code).collect()
}

fn sdg_code(target: &Value) -> Option<String> {
    match target {
        Value::String(code) => Some(code.clone()),
        Value::Number(code) => Some(code.to_string()),
        Value::Object(_) => optional_text(Some(target), &["target"]),
        _ => None,
    }
}

fn ai_risk_panel(ai: Option<&Value>) -> Option<AiRiskPanel> {
    let tier = AiRiskTier::from_wire(&optional_text(ai, &["risk"])?);
    if tier == AiRiskTier::Low {
        return None;
    }
    Some(AiRiskPanel {
        tier,
        tone: tier.tone(),
        indicators: list(ai, &["indicators"])
            .iter()
            .filter_map(|indicator| indicator.as_str().map(str::to_owned))
            .collect(),
    })
}

fn visibility_panel(impact: Option<&Value>) -> Option<VisibilityPanel> {
    let impact = impact.filter(|value| value.is_object())?;
    let action = optional_text(Some(impact), &["action"])
        .map(|wire| VisibilityAction::from_wire(&wire))
        .unwrap_or_default();
    Some(VisibilityPanel {
        action,
        tone: action.tone(),
        adjustment: text(Some(impact), &["adjustment"]),
        description: text(Some(impact), &["description"]),
        badge: optional_text(Some(impact), &["badge"]),
    })
}

fn field<'a>(value: Option<&'a Value>, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value?, |current, key| current.get(*key))
        .filter(|found| !found.is_null())
}

fn optional_text(value: Option<&Value>, path: &[&str]) -> Option<String> {
    field(value, path)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn text(value: Option<&Value>, path: &[&str]) -> String {
    optional_text(value, path).unwrap_or_default()
}

fn number(value: Option<&Value>, path: &[&str]) -> Option<f64> {
    field(value, path)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

fn count(value: Option<&Value>, path: &[&str]) -> u64 {
    number(value, path)
        .filter(|n| *n > 0.0)
        .map(|n| n as u64)
        .unwrap_or(0)
}

fn list<'a>(value: Option<&'a Value>, path: &[&str]) -> &'a [Value] {
    field(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
#[path = "tests/projector_tests.rs"]
mod tests;
