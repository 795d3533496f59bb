use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::json;
use shared::{
    domain::ProductSubmission,
    protocol::{
        Alert, AnalysisResult, LiveAnalysis, LiveWarning, PlatformStats, SellerProfile,
        SubmissionRecord,
    },
};

use crate::{AnalysisApi, TransportError};

type Reply<T> = Result<T, TransportError>;

/// Returns the front reply, keeping the last one for every later call.
fn next_reply<T: Clone>(queue: &Mutex<VecDeque<Reply<T>>>) -> Reply<T> {
    let mut queue = queue.lock().expect("reply queue");
    if queue.len() > 1 {
        queue.pop_front().expect("non-empty queue")
    } else {
        queue
            .front()
            .cloned()
            .unwrap_or_else(|| Err(TransportError::NetworkUnreachable("unscripted".into())))
    }
}

#[derive(Default)]
pub(crate) struct ScriptedApi {
    live_replies: Mutex<HashMap<String, (Duration, Reply<LiveAnalysis>)>>,
    live_calls: Mutex<Vec<String>>,
    analyze_reply: Mutex<Option<(Duration, Reply<AnalysisResult>)>>,
    analyze_calls: Mutex<Vec<ProductSubmission>>,
    stats_replies: Mutex<VecDeque<Reply<PlatformStats>>>,
    alerts_replies: Mutex<VecDeque<Reply<Vec<Alert>>>>,
    audit_replies: Mutex<VecDeque<Reply<Vec<SubmissionRecord>>>>,
    regulator_delay: Mutex<Duration>,
    stats_calls: AtomicUsize,
    stats_in_flight: AtomicUsize,
    max_stats_in_flight: AtomicUsize,
}

impl ScriptedApi {
    pub(crate) fn script_live(&self, text: &str, delay: Duration, reply: Reply<LiveAnalysis>) {
        self.live_replies
            .lock()
            .expect("live replies")
            .insert(text.to_string(), (delay, reply));
    }

    pub(crate) fn live_calls(&self) -> Vec<String> {
        self.live_calls.lock().expect("live calls").clone()
    }

    pub(crate) fn script_analyze(&self, delay: Duration, reply: Reply<AnalysisResult>) {
        *self.analyze_reply.lock().expect("analyze reply") = Some((delay, reply));
    }

    pub(crate) fn analyze_calls(&self) -> usize {
        self.analyze_calls.lock().expect("analyze calls").len()
    }

    pub(crate) fn push_stats(&self, reply: Reply<PlatformStats>) {
        self.stats_replies.lock().expect("stats").push_back(reply);
    }

    pub(crate) fn push_alerts(&self, reply: Reply<Vec<Alert>>) {
        self.alerts_replies.lock().expect("alerts").push_back(reply);
    }

    pub(crate) fn push_audit(&self, reply: Reply<Vec<SubmissionRecord>>) {
        self.audit_replies.lock().expect("audit").push_back(reply);
    }

    pub(crate) fn set_regulator_delay(&self, delay: Duration) {
        *self.regulator_delay.lock().expect("delay") = delay;
    }

    pub(crate) fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_stats_in_flight(&self) -> usize {
        self.max_stats_in_flight.load(Ordering::SeqCst)
    }

    async fn regulator_pause(&self) {
        let delay = *self.regulator_delay.lock().expect("delay");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AnalysisApi for ScriptedApi {
    async fn analyze(
        &self,
        submission: &ProductSubmission,
    ) -> Result<AnalysisResult, TransportError> {
        self.analyze_calls
            .lock()
            .expect("analyze calls")
            .push(submission.clone());
        let scripted = self.analyze_reply.lock().expect("analyze reply").clone();
        let (delay, reply) = scripted.unwrap_or_else(|| {
            (
                Duration::ZERO,
                Err(TransportError::NetworkUnreachable("unscripted".into())),
            )
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    async fn analyze_live(&self, text: &str) -> Result<LiveAnalysis, TransportError> {
        self.live_calls
            .lock()
            .expect("live calls")
            .push(text.to_string());
        let scripted = self
            .live_replies
            .lock()
            .expect("live replies")
            .get(text)
            .cloned();
        let (delay, reply) = scripted.unwrap_or((Duration::ZERO, Ok(LiveAnalysis::default())));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    async fn seller_profile(&self, company: &str) -> Result<SellerProfile, TransportError> {
        Ok(SellerProfile {
            company: company.to_string(),
            ..SellerProfile::default()
        })
    }

    async fn platform_stats(&self) -> Result<PlatformStats, TransportError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.stats_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_stats_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        self.regulator_pause().await;
        self.stats_in_flight.fetch_sub(1, Ordering::SeqCst);
        next_reply(&self.stats_replies)
    }

    async fn early_alerts(&self) -> Result<Vec<Alert>, TransportError> {
        self.regulator_pause().await;
        next_reply(&self.alerts_replies)
    }

    async fn audit_log(&self) -> Result<Vec<SubmissionRecord>, TransportError> {
        self.regulator_pause().await;
        next_reply(&self.audit_replies)
    }
}

pub(crate) fn warning(phrase: &str, claim_type: &str) -> LiveWarning {
    LiveWarning {
        phrase: phrase.to_string(),
        claim_type: claim_type.to_string(),
        warning: None,
    }
}

pub(crate) fn live_reply(warnings: Vec<LiveWarning>) -> LiveAnalysis {
    LiveAnalysis {
        warning_count: warnings.len(),
        warnings,
        has_proof_markers: false,
    }
}

pub(crate) fn sample_result() -> AnalysisResult {
    AnalysisResult::new(json!({
        "product": {"title": "Bamboo Desk", "company": "GreenWood Ltd", "category": "furniture"},
        "risk_assessment": {"risk_score": 64, "verdict": "GREENWASHED"}
    }))
}

pub(crate) fn submission() -> ProductSubmission {
    ProductSubmission {
        company_name: "GreenWood Ltd".to_string(),
        product_title: "Bamboo Desk".to_string(),
        product_description: "100% eco-friendly and sustainably sourced".to_string(),
        product_category: shared::domain::Category::Furniture,
        claimed_certifications: vec!["FSC".to_string()],
    }
}
