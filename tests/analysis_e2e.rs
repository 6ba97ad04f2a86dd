//! End-to-end tests for the analysis pipeline.
//!
//! Library-level properties run on inline documents; the service test serves
//! a page from a local mock server and goes through fetch, analysis, assembly
//! and storage.

use std::sync::Arc;
use std::time::Duration;

use seo_audit::config::AuditConfig;
use seo_audit::domain::{QuestionKind, Severity};
use seo_audit::repository::InMemoryAuditStore;
use seo_audit::service::{AuditService, HeuristicSemanticEstimator, HttpFetcher};
use seo_audit::{analyze, analyze_competitive, analyze_geographic, analyze_voice_search, AppError};

const URL: &str = "https://example.com/";

fn words(count: usize) -> String {
    (0..count).map(|_| "content").collect::<Vec<_>>().join(" ")
}

/// No title, no description, everything else in place, 500 visible words.
fn missing_title_page() -> String {
    format!(
        r#"<html lang="en"><head>
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="canonical" href="https://example.com/">
  <meta property="og:title" content="t">
  <meta property="og:type" content="website">
  <meta property="og:url" content="https://example.com/">
  <script type="application/ld+json">{{"@type":"WebPage"}}</script>
</head><body>
  <h1>Heading</h1>
  <h2>Section</h2>
  <img src="a.png" alt="a">
  <p>{}</p>
  <a href="/1">one</a><a href="/2">two</a><a href="/3">three</a><a href="/4">four</a><a href="/5">five</a>
</body></html>"#,
        words(493)
    )
}

fn page_with_title(title: &str) -> String {
    missing_title_page().replacen("<head>", &format!("<head><title>{}</title>", title), 1)
}

#[test]
fn test_missing_title_and_description_scores_70() {
    let result = analyze(&missing_title_page(), URL).unwrap();

    let types: Vec<_> = result.issues().iter().map(|i| i.kind.as_str()).collect();
    assert_eq!(types, vec!["missing-title", "missing-meta-description"]);
    assert!(result.issues().iter().all(|i| i.severity == Severity::High));
    assert_eq!(result.score(), 70);
}

#[test]
fn test_fifty_char_title_has_no_title_issue() {
    let title = "x".repeat(50);
    let result = analyze(&page_with_title(&title), URL).unwrap();
    assert!(!result.issues().iter().any(|i| i.kind.contains("title")));
}

#[test]
fn test_missing_title_reported_once() {
    let result = analyze("<html><body></body></html>", URL).unwrap();
    let titles: Vec<_> = result
        .issues()
        .iter()
        .filter(|i| i.kind == "missing-title")
        .collect();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].severity, Severity::High);
}

#[test]
fn test_score_stays_in_range_for_empty_and_garbage_input() {
    for html in ["", "<<<>>>", "<html><head><title></title></head></html>", "\u{0}\u{feff}"] {
        let result = analyze(html, URL).unwrap();
        assert!(result.score() <= 100);
    }
}

#[test]
fn test_analysis_is_deterministic() {
    let html = missing_title_page();
    let first = analyze(&html, URL).unwrap();
    let second = analyze(&html, URL).unwrap();

    assert_eq!(first.issues(), second.issues());
    assert_eq!(first.recommendations, second.recommendations);
    assert_eq!(first.score(), second.score());

    assert_eq!(
        analyze_geographic(&html, URL).unwrap(),
        analyze_geographic(&html, URL).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&analyze_competitive(&html, URL).unwrap()).unwrap(),
        serde_json::to_string(&analyze_competitive(&html, URL).unwrap()).unwrap()
    );
}

#[test]
fn test_hreflang_validity() {
    let html = r#"<html><head>
        <link rel="alternate" hreflang="en-US" href="https://example.com/en-us/">
        <link rel="alternate" hreflang="EN_US" href="https://example.com/en_us/">
        <link rel="alternate" hreflang="x-default" href="https://example.com/">
        <link rel="alternate" hreflang="en" href="https://example.com/en/">
        <link rel="alternate" hreflang="en" href="https://example.com/en2/">
    </head></html>"#;
    let geo = analyze_geographic(html, URL).unwrap();

    let validity: Vec<_> = geo
        .hreflang_tags
        .iter()
        .map(|t| (t.lang.as_str(), t.is_valid))
        .collect();
    assert_eq!(
        validity,
        vec![
            ("en-US", true),
            ("EN_US", false),
            ("x-default", true),
            ("en", true),
            ("en", true)
        ]
    );
    assert!(geo.hreflang_tags[1]
        .issues
        .as_ref()
        .unwrap()
        .iter()
        .any(|i| i.starts_with("Invalid hreflang format")));

    let duplicates: Vec<_> = geo
        .issues
        .iter()
        .filter(|i| i.kind == "duplicate-hreflang")
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].description.contains("en"));
}

#[test]
fn test_voice_question_classification() {
    let html = "<p>How do I reset my password? What is a recovery code?</p>";
    let voice = analyze_voice_search(html, URL).unwrap();
    let kinds: Vec<_> = voice.question_patterns.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![QuestionKind::What, QuestionKind::How]);
    assert!(voice.featured_snippet_score <= 100);
    assert!(voice.answer_readiness_score <= 100);
}

#[test]
fn test_competitive_thin_page_has_six_gaps() {
    let html = format!(
        r#"<html><head><script type="application/ld+json">{{"@type":"Article"}}</script></head>
        <body><p>{}</p><img src="a.png" alt="a"><a href="/a">a</a><a href="/b">b</a></body></html>"#,
        words(198)
    );
    let competitive = analyze_competitive(&html, URL).unwrap();
    assert_eq!(competitive.content_gaps.len(), 6);
    assert!(competitive.estimated);
}

#[test]
fn test_invalid_url() {
    let err = analyze("<html></html>", "::not a url::").unwrap_err();
    assert!(matches!(err, AppError::InvalidUrl(_)));
}

#[tokio::test]
async fn test_service_end_to_end_against_mock_server() {
    let mut server = mockito::Server::new_async().await;
    let body = missing_title_page();
    let mock = server
        .mock("GET", "/landing")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(body.clone())
        .expect(1)
        .create_async()
        .await;

    let config = AuditConfig::default().with_fetch_timeout(5);
    let service = AuditService::new(
        Arc::new(HttpFetcher::new(&config).unwrap()),
        Arc::new(HeuristicSemanticEstimator),
        Arc::new(InMemoryAuditStore::new()),
        Duration::from_secs(60),
    );

    let url = format!("{}/landing", server.url());
    let report = service.run_audit(&url, &["content".to_string()]).await.unwrap();

    assert_eq!(report.audit.score(), 70);
    assert_eq!(report.audit.metadata.status_code, 200);
    assert_eq!(report.audit.metadata.content_length, body.len());
    assert_eq!(report.on_page_seo.score, 70);

    // served from cache; the mock only allows one request
    let again = service.run_audit(&url, &["content".to_string()]).await.unwrap();
    assert_eq!(again.id, report.id);
    mock.assert_async().await;

    let stored = service.get_report(report.id.as_deref().unwrap()).await.unwrap();
    assert_eq!(stored.url, report.url);
}

#[tokio::test]
async fn test_service_reports_fetch_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/gone")
        .with_status(503)
        .create_async()
        .await;

    let service = AuditService::from_config(&AuditConfig::default()).unwrap();
    let err = service
        .run_audit(&format!("{}/gone", server.url()), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::HttpStatus(503)));
    assert!(err.is_fetch_failure());
}
