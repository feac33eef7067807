//! Integration tests for the HTTP surface.
//!
//! These drive the full router (CORS, tracing, metrics, static fallback)
//! against an in-memory SQLite store.
//!
//! This test requires the `sqlite` feature flag.

#![cfg(feature = "sqlite")]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use funding_hex::{TrackerService, inbound::HttpServer};
use funding_repo::SqliteRepo;
use funding_types::{FundingRate, FundingRepository};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Helper to build a tracker (never started) over a seeded store.
async fn create_service(rates: Vec<FundingRate>) -> Arc<TrackerService<SqliteRepo>> {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    repo.create_batch(rates).await.unwrap();
    Arc::new(TrackerService::new(repo, Vec::new(), Duration::from_secs(60)))
}

fn rate(exchange: &str, symbol: &str, rate: f64, minute: u32) -> FundingRate {
    let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, minute, 0).unwrap();
    FundingRate::new(exchange, symbol, rate, ts)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn assert_close(value: &serde_json::Value, expected: f64) {
    let actual = value.as_f64().unwrap();
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = HttpServer::new(create_service(Vec::new()).await).router();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_funding_rates_grouped_by_symbol_as_percent() {
    let service = create_service(vec![
        rate("pacifica", "BTC", 0.0001, 0),
        rate("lighter", "BTC", 0.0002, 0),
        rate("pacifica", "BTC", 0.0005, 5),
        rate("pacifica", "ETH", -0.0003, 1),
    ])
    .await;
    let app = HttpServer::new(service).router();

    let response = app.oneshot(get("/api/v1/funding-rates")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 2);
    assert_close(&json["data"]["BTC"]["exchanges"]["pacifica"], 0.05);
    assert_close(&json["data"]["BTC"]["exchanges"]["lighter"], 0.02);
    assert_close(&json["data"]["ETH"]["exchanges"]["pacifica"], -0.03);
    assert_eq!(
        json["data"]["BTC"]["updated_at"]["pacifica"],
        "2025-01-01T00:05:00Z"
    );
}

#[tokio::test]
async fn test_empty_store_returns_empty_data() {
    let app = HttpServer::new(create_service(Vec::new()).await).router();

    let response = app.oneshot(get("/api/v1/funding-rates")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 0);
    assert_eq!(json["data"], serde_json::json!({}));
}

#[tokio::test]
async fn test_query_filters_and_lenient_params() {
    let service = create_service(vec![
        rate("pacifica", "BTC", 0.0001, 0),
        rate("lighter", "BTC", 0.0002, 0),
        rate("lighter", "ETH", 0.0003, 0),
    ])
    .await;
    let app = HttpServer::new(service).router();

    let response = app
        .clone()
        .oneshot(get(
            "/api/v1/funding-rates?exchange=lighter&limit=abc&sort_by=bogus&sort_order=ASC",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 2);
    assert!(json["data"]["BTC"]["exchanges"].get("pacifica").is_none());

    let response = app
        .oneshot(get("/api/v1/funding-rates?symbol=BTC&sort_by=rate&limit=1"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_close(&json["data"]["BTC"]["exchanges"]["lighter"], 0.02);
}

#[tokio::test]
async fn test_store_failure_is_opaque_500() {
    let service = create_service(Vec::new()).await;
    service.repo().pool().close().await;
    let app = HttpServer::new(service).router();

    let response = app.oneshot(get("/api/v1/funding-rates")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "internal server error"})
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = HttpServer::new(create_service(Vec::new()).await).router();

    let response = app.oneshot(get("/api-docs/openapi.json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"].get("/api/v1/funding-rates").is_some());
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let app = HttpServer::new(create_service(Vec::new()).await).router();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/funding-rates")
        .header("Origin", "http://example.com")
        .header("Access-Control-Request-Method", "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_static_dir_falls_back_to_index() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>funding</h1>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();

    let app = HttpServer::new(create_service(Vec::new()).await)
        .with_static_dir(Some(dir.path().to_path_buf()))
        .router();

    let response = app.clone().oneshot(get("/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"console.log(1)");

    let response = app.clone().oneshot(get("/markets/BTC")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"<h1>funding</h1>");

    // API routes still win over the fallback.
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route_without_static_dir_is_404() {
    let app = HttpServer::new(create_service(Vec::new()).await).router();

    let response = app.oneshot(get("/nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
