//! Integration tests for estimator-core
//!
//! These tests exercise the full request → validate → estimate → export
//! workflow for both estimation modes.

use chrono::NaiveDate;
use estimator_core::{
    estimate, estimate_freeform, freeform_hints, parse_request, structured_hints, AIClient,
    EstimateRequest, EstimateSource, ExportFormat, Invoice, InvoiceOptions, MockBackend,
    ProjectType, RequestError,
};

fn invoice_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

// =============================================================================
// Structured Mode
// =============================================================================

#[test]
fn test_structured_request_to_invoice() {
    let body = br#"{
        "mode": "structured",
        "projectType": "web-app",
        "pages": 8,
        "complexity": "medium",
        "auth": true,
        "adminPanel": true,
        "aiFeatures": "advanced",
        "timeline": "rushed",
        "notes": "Booking platform"
    }"#;

    let input = match parse_request(body).expect("valid request") {
        EstimateRequest::Structured(input) => input,
        other => panic!("expected structured request, got {:?}", other),
    };
    assert!(structured_hints(&input).is_empty());

    let result = estimate(&input);
    assert_eq!(result.base(), 7256);
    assert_eq!((result.min, result.max), (6385, 8127));
    assert_eq!(result.hours, 85);
    assert_eq!(result.timeline_weeks, 5);

    let mut opts = InvoiceOptions::new(invoice_date());
    opts.source = Some(EstimateSource::Rule);
    opts.notes = Some(input.notes.clone());
    let text = Invoice::build(&result, &opts).render();

    assert!(text.starts_with("Project Estimate Invoice\n"));
    assert!(text.contains("Mode: rule"));
    assert!(text.contains("Notes: Booking platform"));
    assert!(text.contains("USD 6,385 - 8,127"));
    assert!(text.contains("Estimated Hours: 85  | Timeline: ~5 weeks"));
}

#[test]
fn test_structured_request_rejections() {
    let oversized = vec![b' '; 16 * 1024 + 1];
    assert!(matches!(
        parse_request(&oversized),
        Err(RequestError::PayloadTooLarge { .. })
    ));

    assert_eq!(parse_request(b"{not json"), Err(RequestError::InvalidJson));

    let body = br#"{"mode":"structured","projectType":"web-app","pages":0,
        "complexity":"extreme","auth":true,"adminPanel":false,
        "aiFeatures":"none","timeline":"normal"}"#;
    match parse_request(body) {
        Err(RequestError::Validation(issues)) => {
            let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
            assert!(paths.contains(&"pages"));
            assert!(paths.contains(&"complexity"));
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_csv_export_sums_to_base() {
    let body = br#"{"mode":"structured","projectType":"mobile","pages":6,
        "complexity":"high","auth":true,"adminPanel":false,
        "aiFeatures":"basic","timeline":"flexible"}"#;
    let EstimateRequest::Structured(input) = parse_request(body).unwrap() else {
        panic!("expected structured request");
    };
    let result = estimate(&input);

    let csv = ExportFormat::Csv
        .render(&result, &InvoiceOptions::new(invoice_date()))
        .unwrap();
    let total: i64 = csv
        .lines()
        .skip(1)
        .map(|line| line.rsplit(',').next().unwrap().parse::<i64>().unwrap())
        .sum();
    assert_eq!(total, result.base());
}

// =============================================================================
// Free-form Mode
// =============================================================================

#[tokio::test]
async fn test_freeform_request_with_mock_backend() {
    let description = "I need a web platform for booking massage appointments with user \
                       login, admin dashboard, 6-8 pages, maybe basic AI suggestions. Need it ASAP.";
    let body = serde_json::json!({ "mode": "freeform", "description": description }).to_string();

    let EstimateRequest::Freeform { description } = parse_request(body.as_bytes()).unwrap() else {
        panic!("expected free-form request");
    };
    assert!(freeform_hints(&description).is_empty());

    let client = AIClient::mock();
    let (input, result) = estimate_freeform(&client, &description).await.unwrap();
    assert_eq!(input.project_type, ProjectType::WebApp);
    assert_eq!(input.pages, 8);
    assert!(input.auth && input.admin_panel);
    assert_eq!(result, estimate(&input));

    let mut opts = InvoiceOptions::new(invoice_date());
    opts.source = Some(EstimateSource::AiRule);
    opts.summary = Some(description.clone());
    let json = ExportFormat::Json.render(&result, &opts).unwrap();
    assert!(json.contains("\"source\": \"ai+rule\""));
}

#[tokio::test]
async fn test_freeform_untrusted_output_is_normalized() {
    let client = AIClient::Mock(MockBackend::with_raw_response(
        r#"Here you go: {"projectType":"mobile","pages":"lots","auth":"yes","adminPanel":0,"notes":42}"#,
    ));
    let (input, result) = estimate_freeform(&client, "A mobile app for dog walkers")
        .await
        .unwrap();

    assert_eq!(input.project_type, ProjectType::Mobile);
    assert_eq!(input.pages, 3);
    assert!(input.auth);
    assert!(!input.admin_panel);
    assert_eq!(input.notes, "");
    assert!(result.min <= result.max);
}
