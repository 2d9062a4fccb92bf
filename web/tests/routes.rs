//! Router tests driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use axum::body::{to_bytes, Body};
use axum::http::{header::LOCATION, Request, StatusCode};
use axum::Router;
use slug_registry::RedirectResolver;
use slug_registry_core::{ApiError, OwnerId};
use slug_registry_testing::{ApiOperation, InMemorySlugApi};
use slug_registry_web::{app, AppState};
use std::sync::Arc;
use tower::ServiceExt;

fn router(api: &InMemorySlugApi) -> Router {
    let resolver = RedirectResolver::new(Arc::new(api.clone()));
    app(AppState::new(Arc::new(resolver)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let response = router(&InMemorySlugApi::new())
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn known_slug_redirects_permanently() {
    let api = InMemorySlugApi::new();
    api.seed(&OwnerId::new("alice"), "apple-macbook-pro", "/products/apple-macbook-pro");

    let response = router(&api).oneshot(get("/apple-macbook-pro")).await.unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "/products/apple-macbook-pro"
    );
}

#[tokio::test]
async fn unknown_slug_is_404_json() {
    let response = router(&InMemorySlugApi::new())
        .oneshot(get("/does-not-exist"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(LOCATION).is_none());

    let body = json_body(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "No redirect found for 'does-not-exist'");
}

#[tokio::test]
async fn redirect_with_control_characters_is_404() {
    let api = InMemorySlugApi::new();
    api.seed(&OwnerId::new("alice"), "bad", "https://example.com/\r\nSet-Cookie: x=1");

    let response = router(&api).oneshot(get("/bad")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(LOCATION).is_none());
    assert!(response.headers().get("set-cookie").is_none());
    assert_eq!(json_body(response).await["message"], "No redirect found for 'bad'");
}

#[tokio::test]
async fn backend_failure_is_404_not_500() {
    let api = InMemorySlugApi::new();
    api.fail(ApiOperation::Resolve, ApiError::TransportFailure("connection refused".into()));

    let response = router(&api).oneshot(get("/anything")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn health_route_wins_over_slug_route() {
    let api = InMemorySlugApi::new();
    api.seed(&OwnerId::new("alice"), "health", "/elsewhere");

    let response = router(&api).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(api.call_count(ApiOperation::Resolve), 0);
}
