use crate::{
    domain::{
        AlertLevel, Category, CertStatus, ProductSubmission, RequiredField, Tone, Verdict,
        VisibilityAction,
    },
    protocol::{
        parse_timestamp, AlertsResponse, LiveAnalysis, PlatformStats, SellerProfile,
        SubmissionsResponse,
    },
};

fn complete_submission() -> ProductSubmission {
    ProductSubmission {
        company_name: "GreenWood Ltd".to_string(),
        product_title: "Bamboo Desk".to_string(),
        product_description: "Sustainably sourced bamboo".to_string(),
        product_category: Category::Furniture,
        claimed_certifications: vec!["FSC".to_string()],
    }
}

#[test]
fn unknown_wire_values_fall_back_to_default_variant() {
    assert_eq!(Verdict::from_wire("MAYBE"), Verdict::ReviewRequired);
    assert_eq!(CertStatus::from_wire(""), CertStatus::NotFound);
    assert_eq!(VisibilityAction::from_wire("PROMOTE"), VisibilityAction::Hold);
    assert_eq!(AlertLevel::from_wire("CRITICAL"), AlertLevel::Low);
    assert_eq!(Verdict::from_wire(" greenwashed "), Verdict::Greenwashed);
}

#[test]
fn status_deserialization_is_lenient() {
    let verdict: Verdict = serde_json::from_str("\"SOMETHING_NEW\"").expect("verdict");
    assert_eq!(verdict, Verdict::ReviewRequired);
    let verdict: Verdict = serde_json::from_str("null").expect("null verdict");
    assert_eq!(verdict, Verdict::ReviewRequired);
}

#[test]
fn tone_tables_cover_every_variant() {
    assert_eq!(Verdict::Verified.tone(), Tone::Affirmative);
    assert_eq!(Verdict::Greenwashed.tone(), Tone::Negative);
    assert_eq!(CertStatus::ScopeMismatch.tone(), Tone::Cautionary);
    assert_eq!(VisibilityAction::Boost.tone(), Tone::Affirmative);
    assert_eq!(VisibilityAction::Demote.tone(), Tone::Negative);
    assert_eq!(VisibilityAction::Hold.tone(), Tone::Cautionary);
    for status in CertStatus::ALL {
        assert!(!status.label().is_empty());
    }
}

#[test]
fn category_parses_cli_spellings() {
    assert_eq!("personal-care".parse::<Category>(), Ok(Category::PersonalCare));
    assert_eq!("Wildlife_Products".parse::<Category>(), Ok(Category::WildlifeProducts));
    assert!("spaceships".parse::<Category>().is_err());
    assert_eq!(Category::default(), Category::Timber);
}

#[test]
fn submission_serializes_to_analyze_body() {
    let body = serde_json::to_value(complete_submission()).expect("json");
    assert_eq!(body["company_name"], "GreenWood Ltd");
    assert_eq!(body["product_category"], "furniture");
    assert_eq!(body["claimed_certifications"][0], "FSC");
}

#[test]
fn validation_names_every_blank_field() {
    let mut submission = complete_submission();
    submission.company_name.clear();
    submission.product_description = "   ".to_string();

    let err = submission.validate().expect_err("must fail");
    assert!(err.is_missing(RequiredField::CompanyName));
    assert!(err.is_missing(RequiredField::ProductDescription));
    assert!(!err.is_missing(RequiredField::ProductTitle));
    let message = err.to_string();
    assert!(message.contains("Company name"), "{message}");
    assert!(message.contains("Product description"), "{message}");
}

#[test]
fn validation_ignores_category_and_certifications() {
    let mut submission = complete_submission();
    submission.claimed_certifications.clear();
    submission.product_category = Category::default();
    assert!(submission.validate().is_ok());
}

#[test]
fn regulator_payloads_default_missing_fields() {
    let stats: PlatformStats = serde_json::from_str(r#"{"total_scanned": 5}"#).expect("stats");
    assert_eq!(stats.total_scanned, 5);
    assert_eq!(stats.greenwashed, 0);
    assert_eq!(stats.avg_risk_score, 0.0);

    let alerts: AlertsResponse = serde_json::from_str(
        r#"{"alerts":[{"company":"Acme","alert_level":"HIGH","recurring_patterns":[{"phrase":"eco","occurrences":3}],"last_seen":"2026-10-16T09:30:00.123456"}]}"#,
    )
    .expect("alerts");
    assert_eq!(alerts.alerts[0].alert_level, AlertLevel::High);
    assert_eq!(alerts.alerts[0].recurring_patterns[0].occurrences, 3);
    assert!(alerts.alerts[0].last_seen.is_some());

    let submissions: SubmissionsResponse = serde_json::from_str(
        r#"{"submissions":[{"product":"Desk","company":"Acme","risk_score":72,"claim_count":4,"verdict":"GREENWASHED","timestamp":"2026-10-16T09:30:00"}]}"#,
    )
    .expect("submissions");
    assert_eq!(submissions.submissions[0].verdict, Verdict::Greenwashed);
    assert_eq!(submissions.submissions[0].risk_score, 72.0);
}

#[test]
fn seller_profile_accepts_unknown_seller_shape() {
    let profile: SellerProfile = serde_json::from_str(
        r#"{"company":"Nobody","total_submissions":0,"alert_level":"LOW","message":"No prior submission history found"}"#,
    )
    .expect("profile");
    assert_eq!(profile.total_submissions, 0);
    assert!(profile.recurring_phrases.is_empty());
    assert_eq!(profile.message.as_deref(), Some("No prior submission history found"));
}

#[test]
fn live_analysis_reads_type_tag() {
    let live: LiveAnalysis = serde_json::from_str(
        r#"{"warnings":[{"phrase":"eco-friendly","type":"vague","warning":"Vague claim"}],"warning_count":1}"#,
    )
    .expect("live");
    assert_eq!(live.warnings[0].claim_type, "vague");
    assert!(!live.has_proof_markers);
}

#[test]
fn odd_timestamps_do_not_reject_regulator_rows() {
    let submissions: SubmissionsResponse = serde_json::from_str(
        r#"{"submissions":[
            {"product":"Desk","verdict":"VERIFIED","timestamp":"2026-10-16T09:30:00+02:00"},
            {"product":"Chair","verdict":"VERIFIED","timestamp":"last tuesday"},
            {"product":"Shelf","verdict":"VERIFIED","timestamp":1760606400},
            {"product":"Lamp","verdict":"VERIFIED","timestamp":null}
        ]}"#,
    )
    .expect("submissions");
    let rows = &submissions.submissions;
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].timestamp, parse_timestamp("2026-10-16T07:30:00"));
    assert!(rows[1].timestamp.is_none());
    assert!(rows[2].timestamp.is_none());
    assert!(rows[3].timestamp.is_none());

    let alerts: AlertsResponse = serde_json::from_str(
        r#"{"alerts":[{"company":"Acme","last_seen":"2026-10-16Z"}]}"#,
    )
    .expect("alerts");
    assert_eq!(alerts.alerts[0].company, "Acme");
    assert!(alerts.alerts[0].last_seen.is_none());

    let profile: SellerProfile = serde_json::from_str(
        r#"{"company":"Acme","first_seen":"2026-10-01 08:00:00.5","last_seen":"garbage"}"#,
    )
    .expect("profile");
    assert!(profile.first_seen.is_some());
    assert!(profile.last_seen.is_none());
}

#[test]
fn timestamp_parser_accepts_service_formats() {
    let expected = parse_timestamp("2026-10-16T09:30:00").expect("naive iso");
    assert_eq!(parse_timestamp("2026-10-16 09:30:00"), Some(expected));
    assert_eq!(parse_timestamp("2026-10-16T09:30:00Z"), Some(expected));
    assert!(parse_timestamp("2026-10-16T09:30:00.123456").is_some());
    assert!(parse_timestamp("").is_none());
}
