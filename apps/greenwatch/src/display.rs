//! Plain-text rendering for terminal output.

use client_core::{DashboardState, RenderModel};
use shared::{
    domain::Tone,
    protocol::{LiveWarning, SellerProfile},
};

fn marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Affirmative => "[ok]",
        Tone::Cautionary => "[!]",
        Tone::Negative => "[x]",
        Tone::Neutral => "[-]",
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

pub fn render_report(model: &RenderModel) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "{} ({}, {})",
        model.product.title, model.product.company, model.product.category
    ));
    lines.push(format!(
        "Verdict: {} {}    Risk score: {}/100",
        marker(model.verdict.tone),
        model.verdict.label,
        model.risk_score
    ));

    if let Some(visibility) = &model.visibility {
        let mut line = format!(
            "Visibility: {} {} {}",
            marker(visibility.tone),
            visibility.action,
            visibility.adjustment
        );
        if let Some(badge) = &visibility.badge {
            line.push_str(&format!(" [{badge}]"));
        }
        lines.push(line);
        if !visibility.description.is_empty() {
            lines.push(format!("  {}", visibility.description));
        }
    }

    lines.push(format!(
        "Claims ({}){}:",
        model.claim_count,
        if model.has_proof_markers {
            ", proof markers present"
        } else {
            ""
        }
    ));
    for claim in &model.claims {
        let confidence = claim
            .confidence
            .map(|c| format!(" {:.0}%", c * 100.0))
            .unwrap_or_default();
        lines.push(format!(
            "  - \"{}\" [{}]{}",
            claim.phrase, claim.claim_type, confidence
        ));
    }

    if !model.red_flags.is_empty() {
        lines.push("Red flags:".to_string());
        for flag in &model.red_flags {
            lines.push(format!("  - \"{}\": {}", flag.pattern, flag.description));
        }
    }

    if let Some(ai_risk) = &model.ai_risk {
        lines.push(format!(
            "AI-generated content risk: {} {}",
            marker(ai_risk.tone),
            ai_risk.tier
        ));
        for indicator in &ai_risk.indicators {
            lines.push(format!("  - {indicator}"));
        }
    }

    if !model.certificates.is_empty() || model.overall_cert_status.is_some() {
        lines.push(format!(
            "Certificates{}:",
            model
                .overall_cert_status
                .as_deref()
                .map(|status| format!(" ({status})"))
                .unwrap_or_default()
        ));
        for cert in &model.certificates {
            let mut line = format!(
                "  {} {}: {}",
                marker(cert.tone),
                cert.cert,
                cert.status_label
            );
            if let Some(number) = &cert.certificate_number {
                line.push_str(&format!(" ({number})"));
            }
            if !cert.reason.is_empty() {
                line.push_str(&format!(". {}", cert.reason));
            }
            lines.push(line);
            if let Some(warning) = &cert.expiry_warning {
                lines.push(format!("      {warning}"));
            }
        }
    }

    if !model.missing_recommended.is_empty() {
        lines.push("Missing recommended certifications:".to_string());
        for missing in &model.missing_recommended {
            lines.push(format!("  - {}: {}", missing.cert, missing.reason));
        }
    }

    let urgency = model
        .regulatory_urgency
        .as_deref()
        .map(|u| format!(" (urgency: {u})"))
        .unwrap_or_default();
    lines.push(format!(
        "SDG targets affected: {}{}",
        join_or_none(&model.sdg_targets),
        urgency
    ));

    if !model.score_breakdown.is_empty() {
        lines.push("Score breakdown:".to_string());
        for line in &model.score_breakdown {
            lines.push(format!("  {:>+6.1}  {}", line.points, line.source));
        }
    }

    if !model.remediation.is_empty() {
        lines.push("Remediation:".to_string());
        for entry in &model.remediation {
            lines.push(format!("  {} ({}): {}", entry.cert, entry.issue, entry.action));
            if !entry.description.is_empty() {
                lines.push(format!("    {}", entry.description));
            }
            for (idx, step) in entry.steps.iter().enumerate() {
                lines.push(format!("    {}. {step}", idx + 1));
            }
            let details: Vec<String> = [
                entry.timeline.as_ref().map(|t| format!("timeline {t}")),
                entry.cost_tier.as_ref().map(|c| format!("cost {c}")),
                entry.url.clone(),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !details.is_empty() {
                lines.push(format!("    {}", details.join(" | ")));
            }
        }
    }

    let history = &model.seller_history;
    lines.push(format!(
        "Seller history: {} {} prior greenwashed of {} submissions",
        marker(history.alert_level.tone()),
        history.prior_greenwash_count,
        history.prior_submissions
    ));

    lines.join("\n")
}

pub fn render_warnings(warnings: &[LiveWarning]) -> String {
    if warnings.is_empty() {
        return "No claim warnings.".to_string();
    }
    let mut lines = vec![format!("{} claim warning(s):", warnings.len())];
    for warning in warnings {
        let mut line = format!("  [!] \"{}\" ({})", warning.phrase, warning.claim_type);
        if let Some(text) = &warning.warning {
            line.push_str(&format!(": {text}"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn render_dashboard(dashboard: &DashboardState) -> String {
    if dashboard.loading {
        return "Loading regulator dashboard...".to_string();
    }

    let stats = &dashboard.stats;
    let mut lines = Vec::new();
    if let Some(at) = dashboard.refreshed_at {
        lines.push(format!("Refreshed {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    lines.push(format!(
        "Scanned {} | greenwashed {} | under review {} | verified {} | high-risk sellers {} | avg risk {:.1}",
        stats.total_scanned,
        stats.greenwashed,
        stats.under_review,
        stats.verified,
        stats.high_risk_sellers,
        stats.avg_risk_score
    ));

    lines.push(format!("Early alerts ({}):", dashboard.alerts.len()));
    for alert in &dashboard.alerts {
        lines.push(format!(
            "  {} {} {}: {} of {} greenwashed, avg risk {:.1}",
            marker(alert.alert_level.tone()),
            alert.alert_level,
            alert.company,
            alert.greenwashed_count,
            alert.total_submissions,
            alert.avg_risk_score
        ));
        if !alert.recurring_patterns.is_empty() {
            let patterns: Vec<String> = alert
                .recurring_patterns
                .iter()
                .map(|p| format!("{} x{}", p.phrase, p.occurrences))
                .collect();
            lines.push(format!("    patterns: {}", patterns.join(", ")));
        }
        if !alert.recommended_action.is_empty() {
            lines.push(format!("    action: {}", alert.recommended_action));
        }
    }

    lines.push(format!("Audit log ({}):", dashboard.submissions.len()));
    for record in &dashboard.submissions {
        let when = record
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "  {when}  {} {:<16} {} / {} (risk {:.0}, {} claims)",
            marker(record.verdict.tone()),
            record.verdict.label(),
            record.product,
            record.company,
            record.risk_score,
            record.claim_count
        ));
    }

    lines.join("\n")
}

pub fn render_seller(profile: &SellerProfile) -> String {
    if let Some(message) = &profile.message {
        if profile.total_submissions == 0 {
            return format!("{}: {message}", profile.company);
        }
    }

    let mut lines = vec![
        format!(
            "{} {} ({})",
            marker(profile.alert_level.tone()),
            profile.company,
            profile.alert_level
        ),
        format!(
            "Submissions {} | greenwashed {} | review {} | verified {} | avg risk {:.1}",
            profile.total_submissions,
            profile.greenwashed_count,
            profile.review_count,
            profile.verified_count,
            profile.avg_risk_score
        ),
    ];
    if let (Some(first), Some(last)) = (profile.first_seen, profile.last_seen) {
        lines.push(format!(
            "Active {} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        ));
    }
    if !profile.recurring_phrases.is_empty() {
        lines.push("Recurring phrases:".to_string());
        for (phrase, count) in &profile.recurring_phrases {
            lines.push(format!("  {phrase} x{count}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::project;
    use serde_json::json;
    use shared::protocol::AnalysisResult;

    #[test]
    fn report_lists_verdict_and_remediation() {
        let model = project(&AnalysisResult::new(json!({
            "product": {"title": "Bamboo Desk", "company": "GreenWood Ltd", "category": "furniture"},
            "risk_assessment": {"risk_score": 64, "verdict": "GREENWASHED"},
            "certificate_analysis": {
                "verification_results": [
                    {"cert": "FSC", "status": "EXPIRED", "remediation": {"action": "Renew", "steps": ["Book audit"]}}
                ]
            }
        })));

        let text = render_report(&model);

        assert!(text.starts_with("Bamboo Desk (GreenWood Ltd, furniture)"));
        assert!(text.contains("[x] Greenwashed"));
        assert!(text.contains("64/100"));
        assert!(text.contains("FSC (EXPIRED): Renew"));
        assert!(text.contains("1. Book audit"));
        assert!(text.contains("SDG targets affected: none"));
    }

    #[test]
    fn loading_dashboard_renders_placeholder() {
        assert_eq!(
            render_dashboard(&DashboardState::default()),
            "Loading regulator dashboard..."
        );
    }

    #[test]
    fn empty_warning_list_renders_clear_message() {
        assert_eq!(render_warnings(&[]), "No claim warnings.");
        let text = render_warnings(&[LiveWarning {
            phrase: "eco-friendly".into(),
            claim_type: "vague".into(),
            warning: Some("Vague claim".into()),
        }]);
        assert!(text.contains("\"eco-friendly\" (vague): Vague claim"));
    }
}
