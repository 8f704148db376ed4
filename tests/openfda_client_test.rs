//! Integration tests for the OpenFDA fetch client
//!
//! These tests run the client against a local mock server and verify payload
//! parsing and error mapping.

use chrono::NaiveDate;
use mockito::Matcher;
use shortfall::adapters::openfda::{OpenFdaClient, ShortageFetcher};
use shortfall::config::{OpenFdaConfig, RetryConfig};
use shortfall::domain::{FetchError, ShortfallError};

fn client_for(server: &mockito::ServerGuard) -> OpenFdaClient {
    let config = OpenFdaConfig {
        base_url: format!("{}/drug/shortages.json", server.url()),
        retry: RetryConfig {
            max_retries: 1,
            initial_delay_ms: 1,
            max_delay_ms: 1,
            backoff_multiplier: 1.0,
        },
        ..Default::default()
    };
    OpenFdaClient::new(config).unwrap()
}

fn window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2025, 5, 17).unwrap(),
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
    )
}

#[tokio::test]
async fn test_fetch_parses_results() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/drug/shortages.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "search".into(),
                "update_date:[2025-05-17 TO 2025-06-01]".into(),
            ),
            Matcher::UrlEncoded("limit".into(), "100".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "results": [
                    {
                        "generic_name": "Amoxicillin",
                        "company_name": "Acme Pharma",
                        "presentation": "500mg capsule",
                        "update_type": "Revised",
                        "update_date": "2025-05-20",
                        "availability": "Product on backorder",
                        "related_info": "",
                        "therapeutic_category": ["Anti-Infective"],
                        "status": "Current",
                        "package_ndc": "0002-1433-80"
                    },
                    {
                        "generic_name": "Heparin",
                        "update_date": "2025-05-28",
                        "availability": "Available",
                        "therapeutic_category": ["Hematology"],
                        "package_ndc": "0009-0291-01"
                    }
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let (start, end) = window();
    let records = client.fetch(start, end, 100).await.unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].generic_name, "Amoxicillin");
    assert_eq!(records[0].therapeutic_category, "Anti-Infective");
    assert_eq!(
        records[0].update_date,
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    );
    assert_eq!(records[1].generic_name, "Heparin");
    assert!(records[1].resolved_note.is_none());
}

#[tokio::test]
async fn test_fetch_treats_not_found_as_empty() {
    // The endpoint answers 404 to a query that matches no reports
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/drug/shortages.json")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error": {"code": "NOT_FOUND", "message": "No matches found!"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let (start, end) = window();
    let records = client.fetch(start, end, 100).await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_fetch_maps_server_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/drug/shortages.json")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let client = client_for(&server);
    let (start, end) = window();
    let err = client.fetch(start, end, 100).await.unwrap_err();

    match err {
        ShortfallError::Fetch(FetchError::ServerError { status, .. }) => {
            assert_eq!(status, 503)
        }
        other => panic!("expected server error, got: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_maps_rate_limiting() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/drug/shortages.json")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body("rate limit exceeded")
        .create_async()
        .await;

    let client = client_for(&server);
    let (start, end) = window();
    let err = client.fetch(start, end, 100).await.unwrap_err();

    assert!(matches!(
        err,
        ShortfallError::Fetch(FetchError::RateLimitExceeded(_))
    ));
}

#[tokio::test]
async fn test_fetch_rejects_malformed_payload() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/drug/shortages.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json at all")
        .create_async()
        .await;

    let client = client_for(&server);
    let (start, end) = window();
    let err = client.fetch(start, end, 100).await.unwrap_err();

    assert!(matches!(err, ShortfallError::Parse(_)));
}

#[tokio::test]
async fn test_fetch_rejects_bad_record_dates() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/drug/shortages.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"results": [{"generic_name": "Heparin", "update_date": "sometime in May"}]}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let (start, end) = window();
    let err = client.fetch(start, end, 100).await.unwrap_err();

    assert!(matches!(err, ShortfallError::Parse(_)));
}
