//! API integration tests for the unprotected surface and auxiliary routes.
//!
//! Tests verify:
//! - Health check payload
//! - Test page rendering
//! - JSON fallback for unknown routes

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::test_utils::{basic_get, MockBehavior, TestApp};

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new(MockBehavior::WriteOutput).await;

    let response = app.router.clone().oneshot(basic_get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "OK");
    assert_eq!(json["message"], "PDF processing API is running");
    assert_eq!(app.executor.invocations(), 0);
}

#[tokio::test]
async fn test_test_page() {
    let app = TestApp::new(MockBehavior::WriteOutput).await;

    let response = app.router.clone().oneshot(basic_get("/test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("<form"));
    assert!(html.contains("/process-pdf"));
    assert!(html.contains("max 10 MB"));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new(MockBehavior::WriteOutput).await;

    let request = Request::builder()
        .uri("/does-not-exist")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Not found");
}
