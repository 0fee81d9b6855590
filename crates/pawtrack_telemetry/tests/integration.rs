use std::time::Duration;

use chrono::{TimeZone, Utc};
use pawtrack_telemetry::http_client::InfluxStoreClient;
use pawtrack_telemetry::{StoreError, TelemetryStore, TrackerId};
use secrecy::SecretString;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn series_body() -> serde_json::Value {
    serde_json::json!({
        "results": [{
            "statement_id": 0,
            "series": [{
                "name": "pet_activity",
                "columns": ["time", "step", "temp", "lat", "lng"],
                "values": [
                    ["2026-01-26T12:05:00Z", 2340, 38.6, 31.2311, 121.4750],
                    ["2026-01-26T12:00:00Z", 2290, 38.4, 31.2309, 121.4748]
                ]
            }]
        }]
    })
}

#[tokio::test]
async fn query_recent_sends_db_q_and_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("db", "pet_health"))
        .and(query_param(
            "q",
            "SELECT * FROM pet_activity WHERE tracker_id = '221' ORDER BY time DESC LIMIT 30",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body()))
        .mount(&server)
        .await;

    let client = InfluxStoreClient::new(
        &server.uri(),
        "pet_health",
        Some(SecretString::new("tok".into())),
    );
    let tracker = TrackerId::parse("221").expect("id");
    let series = client
        .query_recent(&tracker, 30)
        .await
        .expect("ok")
        .expect("series");
    assert_eq!(series.row_count(), 2);
    assert_eq!(series.columns[1], "step");

    let received = server.received_requests().await.unwrap();
    assert!(!received.is_empty());
    let auth = received[0].headers.get("authorization").cloned();
    let ok = auth
        .map(|v| v.to_str().map(|s| s == "Token tok").unwrap_or(false))
        .unwrap_or(false);
    assert!(ok);
}

#[tokio::test]
async fn query_recent_without_token_sends_no_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body()))
        .mount(&server)
        .await;

    let client = InfluxStoreClient::new(&server.uri(), "pet_health", None);
    let tracker = TrackerId::parse("221").expect("id");
    client.query_recent(&tracker, 30).await.expect("ok");

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn trailing_slash_base_url_still_hits_query_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body()))
        .mount(&server)
        .await;

    let base = format!("{}/", server.uri());
    let client = InfluxStoreClient::new(&base, "pet_health", None);
    let tracker = TrackerId::parse("105").expect("id");
    let series = client.query_recent(&tracker, 20).await.expect("ok");
    assert!(series.is_some());
}

#[tokio::test]
async fn no_series_reads_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"results":[{"statement_id":0}]})),
        )
        .mount(&server)
        .await;

    let client = InfluxStoreClient::new(&server.uri(), "pet_health", None);
    let tracker = TrackerId::parse("221").expect("id");
    let series = client.query_recent(&tracker, 30).await.expect("ok");
    assert!(series.is_none());
}

#[tokio::test]
async fn empty_series_reads_as_zero_rows() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "results": [{"series": [{"name": "pet_activity", "columns": ["time"], "values": []}]}]
    });
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = InfluxStoreClient::new(&server.uri(), "pet_health", None);
    let tracker = TrackerId::parse("221").expect("id");
    let series = client
        .query_recent(&tracker, 30)
        .await
        .expect("ok")
        .expect("series");
    assert!(series.is_empty());
}

#[tokio::test]
async fn non_success_status_maps_to_status_error_with_snippet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("store exploded"))
        .mount(&server)
        .await;

    let client = InfluxStoreClient::new(&server.uri(), "pet_health", None);
    let tracker = TrackerId::parse("221").expect("id");
    let err = client.query_recent(&tracker, 30).await.expect_err("err");
    match err {
        StoreError::Status { status, snippet } => {
            assert_eq!(status, 500);
            assert!(snippet.contains("store exploded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn html_body_maps_to_content_type_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<!DOCTYPE html><html><body>login</body></html>"),
        )
        .mount(&server)
        .await;

    let client = InfluxStoreClient::new(&server.uri(), "pet_health", None);
    let tracker = TrackerId::parse("221").expect("id");
    let err = client.query_recent(&tracker, 30).await.expect_err("err");
    assert!(matches!(err, StoreError::ContentType(_)));
}

#[tokio::test]
async fn statement_error_maps_to_schema_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"results":[{"error":"database not found: pet_health"}]}),
        ))
        .mount(&server)
        .await;

    let client = InfluxStoreClient::new(&server.uri(), "pet_health", None);
    let tracker = TrackerId::parse("221").expect("id");
    let err = client.query_recent(&tracker, 30).await.expect_err("err");
    assert!(matches!(err, StoreError::Schema(msg) if msg.contains("database not found")));
}

#[tokio::test]
async fn slow_store_trips_the_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(series_body())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = InfluxStoreClient::with_timeout(
        &server.uri(),
        "pet_health",
        None,
        Duration::from_millis(50),
    );
    let tracker = TrackerId::parse("221").expect("id");
    let err = client.query_recent(&tracker, 30).await.expect_err("err");
    assert!(err.is_timeout());
    assert!(err.is_transport());
}

#[tokio::test]
async fn query_window_sends_bounded_statement() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body()))
        .mount(&server)
        .await;

    let client = InfluxStoreClient::new(&server.uri(), "pet_health", None);
    let tracker = TrackerId::parse("302").expect("id");
    let start = Utc.with_ymd_and_hms(2026, 1, 19, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 26, 0, 0, 0).unwrap();
    client
        .query_window(&tracker, start, end)
        .await
        .expect("ok");

    let received = server.received_requests().await.unwrap();
    let q = received[0]
        .url
        .query_pairs()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.to_string())
        .unwrap_or_default();
    assert!(q.contains("tracker_id = '302'"));
    assert!(q.contains("time >= '2026-01-19T00:00:00Z'"));
    assert!(q.contains("time < '2026-01-26T00:00:00Z'"));
}
