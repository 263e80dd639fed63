use axum::http::Method;
use axum_test::TestResponse;
use hitcount::prelude::*;
use std::sync::Arc;

mod counter_app;
use counter_app::{app, sqlite_store, FailingStore};

#[derive(Deserialize)]
struct CountBody {
    count: i64,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

fn assert_cors(response: &TestResponse) {
    assert_eq!(response.header("Access-Control-Allow-Origin"), "*");
    assert_eq!(
        response.header("Access-Control-Allow-Headers"),
        "Content-Type"
    );
    assert_eq!(
        response.header("Access-Control-Allow-Methods"),
        "GET,OPTIONS"
    );
}

#[tokio::test]
async fn first_hit_creates_the_counter() -> AppResult<()> {
    let server = app(sqlite_store().await?).as_test_server().await;
    let response = server.get("/count").await;
    response.assert_status_ok();
    assert_cors(&response);
    assert_eq!(1, response.json::<CountBody>().count);
    assert_eq!(2, server.get("/count").await.json::<CountBody>().count);
    Ok(())
}

#[tokio::test]
async fn every_hit_increments_by_exactly_one() -> AppResult<()> {
    let server = app(sqlite_store().await?).as_test_server().await;
    for expected in 1..=10 {
        assert_eq!(expected, server.get("/count").await.json::<CountBody>().count);
    }
    Ok(())
}

#[tokio::test]
async fn preflight_carries_cors_headers() -> AppResult<()> {
    let server = app(sqlite_store().await?).as_test_server().await;
    let response = server.method(Method::OPTIONS, "/count").await;
    response.assert_status_ok();
    assert_cors(&response);
    Ok(())
}

#[tokio::test]
async fn store_failure_yields_json_500_with_cors() {
    let server = app(Arc::new(FailingStore)).as_test_server().await;
    let response = server.get("/count").await;
    response.assert_status_internal_server_error();
    assert_cors(&response);
    assert!(response.json::<ErrorBody>().error.contains("store unavailable"));
}

#[tokio::test]
async fn hit_persists_the_new_count() -> AppResult<()> {
    let store = sqlite_store().await?;
    let server = app(store.clone()).as_test_server().await;
    server.get("/count").await;
    server.get("/count").await;
    assert_eq!(Some(2), store.current("visitors").await?);
    Ok(())
}

#[tokio::test]
async fn apps_share_one_metrics_recorder() -> AppResult<()> {
    let first = app(sqlite_store().await?).as_test_server().await;
    let second = app(sqlite_store().await?).as_test_server().await;
    first.get("/count").await;
    second.get("/count").await;
    let metrics = second.get("/metrics/prometheus").await.text();
    assert!(metrics.contains("axum_http_requests"));
    Ok(())
}

#[tokio::test]
async fn liveness_and_metrics_respond() -> AppResult<()> {
    let server = app(sqlite_store().await?).as_test_server().await;
    assert_eq!("", server.get("/status/liveness").await.text());
    server.get("/count").await;
    let metrics = server.get("/metrics/prometheus").await.text();
    assert!(metrics.contains("axum_http_requests"));
    assert!(metrics.contains("visits_total"));
    Ok(())
}
