use super::*;
use crate::coord::TileCoord;
use crate::http::tests::MockAsyncHttpClient;
use crate::http::{HttpError, HttpResponse};
use crate::metadata::{MetadataClient, QueryError};
use geo::{LineString, Polygon};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

const TOKEN: &str = "MLY|test";

fn polygon(points: &[(f64, f64)]) -> Polygon<f64> {
    Polygon::new(LineString::from(points.to_vec()), vec![])
}

/// Square from (0, 0) to (size, size) in (lon, lat).
fn square(size: f64) -> Polygon<f64> {
    polygon(&[(0.0, 0.0), (size, 0.0), (size, size), (0.0, size), (0.0, 0.0)])
}

/// Extracts `(west, south, east, north)` from a request URL.
fn bbox_of(url: &str) -> (f64, f64, f64, f64) {
    let start = url.find("bbox=").unwrap() + "bbox=".len();
    let raw = url[start..].split('&').next().unwrap().replace("%2C", ",");
    let v: Vec<f64> = raw.split(',').map(|s| s.parse().unwrap()).collect();
    (v[0], v[1], v[2], v[3])
}

fn point_record(id: &str, lon: f64, lat: f64) -> Value {
    json!({
        "id": id,
        "geometry": {"type": "Point", "coordinates": [lon, lat]}
    })
}

fn data_response(records: Vec<Value>) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::new(200, json!({ "data": records }).to_string()))
}

/// Answers each tile with one record at its center, id'd by the center.
fn center_responder(url: &str) -> Result<HttpResponse, HttpError> {
    let (w, s, e, n) = bbox_of(url);
    let (lon, lat) = ((w + e) / 2.0, (s + n) / 2.0);
    data_response(vec![point_record(
        &format!("{:.5},{:.5}", lon, lat),
        lon,
        lat,
    )])
}

fn tiled_query(
    mock: &MockAsyncHttpClient,
    config: TiledQueryConfig,
) -> TiledQuery<MockAsyncHttpClient> {
    TiledQuery::new(MetadataClient::new(mock.clone()), config)
}

#[tokio::test]
async fn test_single_tile_region_issues_one_query() {
    // A 0.01° square at the origin fits in one zoom-14 tile
    let mock = MockAsyncHttpClient::with_responder(|_| {
        data_response(vec![
            point_record("inside", 0.005, 0.005),
            point_record("outside", 0.015, 0.015),
        ])
    });
    let query = tiled_query(&mock, TiledQueryConfig::default().with_zoom(14));

    let report = query.run(&square(0.01), TOKEN).await.unwrap();

    assert_eq!(mock.request_count(), 1);
    assert_eq!(report.tiles_total, 1);
    assert_eq!(report.tiles_queried, 1);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records.records()[0].id().as_deref(), Some("inside"));
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_same_square_at_zoom_18_queries_64_tiles() {
    let mock = MockAsyncHttpClient::with_responder(|_| data_response(vec![]));
    let query = tiled_query(&mock, TiledQueryConfig::default().with_zoom(18));

    let report = query.run(&square(0.01), TOKEN).await.unwrap();

    assert_eq!(mock.request_count(), 64);
    assert_eq!(report.tiles_total, 64);
    assert_eq!(report.tiles_skipped, 0);
    assert!(report.records.is_empty());
}

#[tokio::test]
async fn test_tiles_disjoint_from_triangle_are_not_queried() {
    // The bbox spans 2x2 zoom-14 tiles; the north-east one lies beyond the hypotenuse
    let triangle = polygon(&[(0.0, 0.0), (0.04, 0.0), (0.0, 0.04), (0.0, 0.0)]);
    let mock = MockAsyncHttpClient::with_responder(|_| data_response(vec![]));
    let query = tiled_query(&mock, TiledQueryConfig::default().with_zoom(14));

    let report = query.run(&triangle, TOKEN).await.unwrap();

    assert_eq!(report.tiles_total, 4);
    assert_eq!(report.tiles_skipped, 1);
    assert_eq!(report.tiles_queried, 3);
    for url in mock.requests() {
        let (w, s, _, _) = bbox_of(&url);
        assert!(w < 0.02 || s < 0.02, "north-east tile queried: {}", url);
    }
}

#[tokio::test]
async fn test_results_merge_in_tile_order() {
    let mock = MockAsyncHttpClient::with_responder(center_responder);
    let config = TiledQueryConfig::default()
        .with_zoom(14)
        .with_concurrency(4);
    let query = tiled_query(&mock, config);

    let report = query.run(&square(0.04), TOKEN).await.unwrap();

    let points: Vec<(f64, f64)> = report
        .records
        .iter()
        .map(|r| (r.lon(), r.lat()))
        .collect();
    assert_eq!(points.len(), 4);
    // Row-major: north row first, west to east within a row
    assert!(points[0].1 > points[2].1);
    assert!(points[0].0 < points[1].0);
    assert!(points[2].0 < points[3].0);
}

#[tokio::test]
async fn test_abort_policy_stops_on_first_failure() {
    let mock = MockAsyncHttpClient::with_responder(|url| {
        let (w, _, _, _) = bbox_of(url);
        if w > 0.01 {
            Err(HttpError::Transport("connection reset".to_string()))
        } else {
            center_responder(url)
        }
    });
    let query = tiled_query(&mock, TiledQueryConfig::default().with_zoom(14));

    let result = query.run(&square(0.04), TOKEN).await;

    match result {
        Err(OrchestratorError::Query { tile, source }) => {
            assert_eq!(tile.zoom, 14);
            assert!(matches!(source, QueryError::Network(_)));
        }
        other => panic!("expected query error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_skip_policy_reports_failed_tiles() {
    let mock = MockAsyncHttpClient::with_responder(|url| {
        let (w, _, _, _) = bbox_of(url);
        if w > 0.01 {
            Ok(HttpResponse::new(503, "unavailable"))
        } else {
            center_responder(url)
        }
    });
    let config = TiledQueryConfig::default()
        .with_zoom(14)
        .with_failure_policy(FailurePolicy::SkipAndReport);
    let query = tiled_query(&mock, config);

    let report = query.run(&square(0.04), TOKEN).await.unwrap();

    assert_eq!(report.tiles_queried, 4);
    assert_eq!(report.failed_tiles.len(), 2);
    assert_eq!(report.records.len(), 2);
    assert!(!report.is_complete());
    let failed_cols: Vec<u32> = report.failed_tiles.iter().map(|f| f.tile.col).collect();
    assert_eq!(failed_cols[0], failed_cols[1]);
}

#[tokio::test]
async fn test_invalid_arguments_abort_before_querying() {
    let mock = MockAsyncHttpClient::with_responder(center_responder);

    let query = tiled_query(&mock, TiledQueryConfig::default().with_zoom(14));
    let result = query.run(&square(0.01), "  ").await;
    assert!(matches!(result, Err(OrchestratorError::InvalidArgument(_))));

    let config = TiledQueryConfig::default()
        .with_zoom(14)
        .with_fields(vec!["id".to_string()]);
    let result = tiled_query(&mock, config).run(&square(0.01), TOKEN).await;
    assert!(matches!(result, Err(OrchestratorError::InvalidArgument(_))));

    let config = TiledQueryConfig::default().with_zoom(30);
    let result = tiled_query(&mock, config).run(&square(0.01), TOKEN).await;
    assert!(matches!(result, Err(OrchestratorError::InvalidArgument(_))));

    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_region_over_tile_ceiling_is_rejected_before_querying() {
    // Mainland France spans 88,753,032 tiles at zoom 18
    let france = polygon(&[
        (-4.8, 42.3),
        (8.2, 42.3),
        (8.2, 51.1),
        (-4.8, 51.1),
        (-4.8, 42.3),
    ]);
    let mock = MockAsyncHttpClient::with_responder(center_responder);
    let query = tiled_query(&mock, TiledQueryConfig::default().with_zoom(18));

    let result = query.run(&france, TOKEN).await;

    match result {
        Err(OrchestratorError::InvalidArgument(message)) => {
            assert!(message.contains("88753032"), "{}", message);
            assert!(message.contains("zoom 18"), "{}", message);
        }
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_tile_ceiling_is_inclusive() {
    let mock = MockAsyncHttpClient::with_responder(|_| data_response(vec![]));
    let config = TiledQueryConfig::default().with_zoom(18).with_max_tiles(64);
    let report = tiled_query(&mock, config)
        .run(&square(0.01), TOKEN)
        .await
        .unwrap();
    assert_eq!(report.tiles_total, 64);

    let config = TiledQueryConfig::default().with_zoom(18).with_max_tiles(63);
    let result = tiled_query(&mock, config).run(&square(0.01), TOKEN).await;
    assert!(matches!(result, Err(OrchestratorError::InvalidArgument(_))));
    assert_eq!(mock.request_count(), 64);
}

#[tokio::test]
async fn test_truncated_tiles_are_reported() {
    let mock = MockAsyncHttpClient::with_responder(|_| {
        data_response(vec![
            point_record("a", 0.002, 0.002),
            point_record("b", 0.004, 0.004),
        ])
    });
    let config = TiledQueryConfig::default().with_zoom(14).with_limit(2);
    let query = tiled_query(&mock, config);

    let report = query.run(&square(0.01), TOKEN).await.unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.truncated_tiles.len(), 1);
    assert!(!report.is_complete());
}

#[tokio::test]
async fn test_dedup_across_tiles() {
    let responder = |url: &str| {
        let (w, s, e, n) = bbox_of(url);
        let (lon, lat) = ((w + e) / 2.0, (s + n) / 2.0);
        data_response(vec![
            point_record("shared", lon, lat),
            point_record(&format!("{:.5},{:.5}", lon, lat), lon, lat),
        ])
    };

    let mock = MockAsyncHttpClient::with_responder(responder);
    let query = tiled_query(&mock, TiledQueryConfig::default().with_zoom(14));
    let report = query.run(&square(0.04), TOKEN).await.unwrap();
    assert_eq!(report.records.len(), 5);
    assert_eq!(report.duplicates_removed, 3);

    let mock = MockAsyncHttpClient::with_responder(responder);
    let config = TiledQueryConfig::default().with_zoom(14).with_dedup(false);
    let report = tiled_query(&mock, config)
        .run(&square(0.04), TOKEN)
        .await
        .unwrap();
    assert_eq!(report.records.len(), 8);
    assert_eq!(report.duplicates_removed, 0);
}

#[tokio::test]
async fn test_malformed_records_are_attributed_to_tile() {
    let mock = MockAsyncHttpClient::with_responder(|_| {
        data_response(vec![
            point_record("good", 0.005, 0.005),
            json!({"id": "bad", "geometry": {"type": "Point", "coordinates": []}}),
        ])
    });
    let query = tiled_query(&mock, TiledQueryConfig::default().with_zoom(14));

    let report = query.run(&square(0.01), TOKEN).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.malformed_records.len(), 1);
    let malformed = &report.malformed_records[0];
    assert_eq!(malformed.tile.zoom, 14);
    assert_eq!(malformed.record.id.as_deref(), Some("bad"));
}

#[tokio::test]
async fn test_list_valued_requested_field_is_stringified() {
    let mock = MockAsyncHttpClient::with_responder(|_| {
        data_response(vec![json!({
            "id": "1",
            "tags": ["a", "b"],
            "geometry": {"type": "Point", "coordinates": [0.005, 0.005]}
        })])
    });
    let config = TiledQueryConfig::default().with_zoom(14).with_fields(vec![
        "id".to_string(),
        "geometry".to_string(),
        "tags".to_string(),
    ]);
    let query = tiled_query(&mock, config);

    let report = query.run(&square(0.01), TOKEN).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(
        report.records.records()[0].get("tags"),
        Some(&json!("[\"a\",\"b\"]"))
    );
}

#[tokio::test]
async fn test_empty_region_queries_nothing() {
    let mock = MockAsyncHttpClient::with_responder(center_responder);
    let query = tiled_query(&mock, TiledQueryConfig::default());
    let empty = Polygon::new(LineString::new(vec![]), vec![]);

    let report = query.run(&empty, TOKEN).await.unwrap();

    assert_eq!(report, TiledQueryReport::default());
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_cancelled_run_returns_cancelled() {
    let mock = MockAsyncHttpClient::with_responder(center_responder);
    let query = tiled_query(&mock, TiledQueryConfig::default().with_zoom(14));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = query.run_with_cancel(&square(0.04), TOKEN, &cancel).await;

    assert!(matches!(result, Err(OrchestratorError::Cancelled)));
}

#[tokio::test]
async fn test_run_to_file_writes_geojson() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("out").join("images.geojson");
    let mock = MockAsyncHttpClient::with_responder(center_responder);
    let query = tiled_query(&mock, TiledQueryConfig::default().with_zoom(14));

    let report = query.run_to_file(&square(0.04), TOKEN, &path).await.unwrap();

    let written = crate::output::read_geojson(&path).unwrap();
    assert_eq!(written.len(), report.records.len());
    assert_eq!(written.len(), 4);
}

#[test]
fn test_report_completeness() {
    let mut report = TiledQueryReport::default();
    assert!(report.is_complete());

    report.truncated_tiles.push(TileCoord {
        row: 0,
        col: 0,
        zoom: 1,
    });
    assert!(!report.is_complete());
}
