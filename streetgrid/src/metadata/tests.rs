//! Tests for the metadata client

use super::*;
use crate::http::tests::MockAsyncHttpClient;
use crate::http::HttpError;

const TOKEN: &str = "MLY|test";

fn fields() -> Vec<String> {
    vec!["id".to_string(), "geometry".to_string()]
}

fn records_body(count: usize) -> String {
    let records: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"id":"{}","geometry":{{"type":"Point","coordinates":[2.3,48.8]}}}}"#,
                i
            )
        })
        .collect();
    format!(r#"{{"data":[{}]}}"#, records.join(","))
}

#[tokio::test]
async fn test_query_builds_encoded_url() {
    let mock = MockAsyncHttpClient::with_body(200, r#"{"data":[]}"#);
    let client = MetadataClient::with_base_url(mock.clone(), "https://api.test/images");

    client
        .query_metadata(2.25, 48.5, 2.5, 48.75, &fields(), TOKEN, 100)
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let url = &requests[0];
    assert!(url.starts_with("https://api.test/images?"));
    assert!(url.contains("bbox=2.25%2C48.5%2C2.5%2C48.75"));
    assert!(url.contains("limit=100"));
    assert!(url.contains("access_token=MLY%7Ctest"));
    assert!(url.contains("fields=id%2Cgeometry"));
}

#[tokio::test]
async fn test_query_returns_records() {
    let mock = MockAsyncHttpClient::with_body(200, &records_body(3));
    let client = MetadataClient::new(mock);

    let response = client
        .query_metadata(2.0, 48.0, 3.0, 49.0, &fields(), TOKEN, 10)
        .await
        .unwrap();

    assert_eq!(response.count(), 3);
    assert_eq!(response.limit, 10);
    assert!(!response.is_truncated());
    assert_eq!(response.data[1]["id"], "1");
}

#[tokio::test]
async fn test_full_page_is_flagged_truncated() {
    let mock = MockAsyncHttpClient::with_body(200, &records_body(5));
    let client = MetadataClient::new(mock);

    let response = client
        .query_metadata(2.0, 48.0, 3.0, 49.0, &fields(), TOKEN, 5)
        .await
        .unwrap();

    assert_eq!(response.count(), 5);
    assert!(response.is_truncated());
}

#[tokio::test]
async fn test_invalid_arguments_make_no_request() {
    let mock = MockAsyncHttpClient::with_body(200, r#"{"data":[]}"#);
    let client = MetadataClient::new(mock.clone());

    let cases: Vec<(f64, f64, f64, f64, Vec<String>, &str, u32)> = vec![
        (3.0, 48.0, 2.0, 49.0, fields(), TOKEN, 10),
        (2.0, 48.0, 2.0, 49.0, fields(), TOKEN, 10),
        (-181.0, 48.0, 2.0, 49.0, fields(), TOKEN, 10),
        (2.0, 48.0, 3.0, 95.0, fields(), TOKEN, 10),
        (f64::NAN, 48.0, 3.0, 49.0, fields(), TOKEN, 10),
        (2.0, 48.0, 3.0, 49.0, fields(), TOKEN, 0),
        (2.0, 48.0, 3.0, 49.0, fields(), "", 10),
        (2.0, 48.0, 3.0, 49.0, fields(), "   ", 10),
        (2.0, 48.0, 3.0, 49.0, vec![], TOKEN, 10),
        (2.0, 48.0, 3.0, 49.0, vec!["id".to_string()], TOKEN, 10),
    ];

    for (min_lon, min_lat, max_lon, max_lat, fields, token, limit) in cases {
        let result = client
            .query_metadata(min_lon, min_lat, max_lon, max_lat, &fields, token, limit)
            .await;
        assert!(
            matches!(result, Err(QueryError::InvalidArgument(_))),
            "expected InvalidArgument for ({}, {}, {}, {}, {:?}, {:?}, {}), got {:?}",
            min_lon,
            min_lat,
            max_lon,
            max_lat,
            fields,
            token,
            limit,
            result
        );
    }

    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_api_error_payload_is_surfaced() {
    let body = r#"{"error":{"message":"Invalid OAuth access token","type":"OAuthException","code":190}}"#;
    let client = MetadataClient::new(MockAsyncHttpClient::with_body(401, body));

    let result = client
        .query_metadata(2.0, 48.0, 3.0, 49.0, &fields(), TOKEN, 10)
        .await;

    assert_eq!(
        result,
        Err(QueryError::Api {
            message: "Invalid OAuth access token".to_string(),
            code: Some(190),
        })
    );
}

#[tokio::test]
async fn test_api_error_payload_with_success_status() {
    let body = r#"{"error":{"message":"Please reduce the amount of data"}}"#;
    let client = MetadataClient::new(MockAsyncHttpClient::with_body(200, body));

    let result = client
        .query_metadata(2.0, 48.0, 3.0, 49.0, &fields(), TOKEN, 10)
        .await;

    assert!(matches!(result, Err(QueryError::Api { code: None, .. })));
}

#[tokio::test]
async fn test_status_without_payload_is_network_error() {
    let client = MetadataClient::new(MockAsyncHttpClient::with_body(503, "Service Unavailable"));

    let result = client
        .query_metadata(2.0, 48.0, 3.0, 49.0, &fields(), TOKEN, 10)
        .await;

    assert_eq!(result, Err(QueryError::Network("HTTP status 503".to_string())));
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    let client = MetadataClient::new(MockAsyncHttpClient::failing("connection reset"));

    let result = client
        .query_metadata(2.0, 48.0, 3.0, 49.0, &fields(), TOKEN, 10)
        .await;

    assert_eq!(result, Err(QueryError::Network("connection reset".to_string())));
}

#[tokio::test]
async fn test_malformed_bodies() {
    for body in [
        "not json",
        r#"{"items":[]}"#,
        r#"{"data":{"id":"1"}}"#,
        r#"{"data":[1, 2]}"#,
    ] {
        let client = MetadataClient::new(MockAsyncHttpClient::with_body(200, body));
        let result = client
            .query_metadata(2.0, 48.0, 3.0, 49.0, &fields(), TOKEN, 10)
            .await;
        assert!(
            matches!(result, Err(QueryError::MalformedResponse(_))),
            "body {:?} gave {:?}",
            body,
            result
        );
    }
}

#[test]
fn test_http_error_conversion() {
    assert_eq!(
        QueryError::from(HttpError::Transport("timeout".to_string())),
        QueryError::Network("timeout".to_string())
    );
    assert!(QueryError::from(HttpError::InvalidUrl {
        url: "x".to_string(),
        reason: "relative".to_string()
    })
    .is_invalid_argument());
}

#[test]
fn test_default_fields_include_geometry() {
    assert_eq!(DEFAULT_FIELDS.len(), 21);
    assert!(default_fields().iter().any(|f| f == GEOMETRY_FIELD));
}

#[test]
fn test_response_serializes_to_api_shape() {
    let mut record = RawRecord::new();
    record.insert("id".to_string(), "42".into());
    let response = MetadataResponse::new(vec![record], 5000);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json, serde_json::json!({"data": [{"id": "42"}]}));
}

#[test]
fn test_empty_limit_is_never_truncated() {
    let response = MetadataResponse::new(vec![], 0);
    assert!(!response.is_truncated());
    assert!(response.is_empty());
}
