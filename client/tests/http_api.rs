//! Integration tests for `HttpSlugApi` against a mock backend.
//!
//! Verifies the request shapes (methods, paths, query parameters, bodies) and
//! the mapping of backend responses onto `ApiError`.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use serde_json::json;
use slug_registry_client::{ClientConfig, HttpSlugApi};
use slug_registry_core::{ApiError, NewSlug, OwnerId, SlugApi, SlugId, SlugRecord};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> HttpSlugApi {
    let config = ClientConfig::new(server.uri()).unwrap();
    HttpSlugApi::new(&config).unwrap()
}

#[tokio::test]
async fn list_sends_owner_as_userid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slugs"))
        .and(query_param("userid", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "slug": "docs", "redirect": "https://docs.rs", "uid": "alice"},
            {"id": "2", "slug": "crates", "redirect": "https://crates.io", "uid": "alice"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let slugs = api_for(&server).list(OwnerId::new("alice")).await.unwrap();

    assert_eq!(
        slugs,
        vec![
            SlugRecord::new("1", "docs", "https://docs.rs"),
            SlugRecord::new("2", "crates", "https://crates.io"),
        ]
    );
}

#[tokio::test]
async fn list_uses_sentinel_for_anonymous_owner() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slugs"))
        .and(query_param("userid", "-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let slugs = api_for(&server).list(OwnerId::anonymous()).await.unwrap();
    assert!(slugs.is_empty());
}

#[tokio::test]
async fn list_non_array_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slugs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"slugs": []})))
        .mount(&server)
        .await;

    let err = api_for(&server).list(OwnerId::new("alice")).await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn list_rejected_status_is_server_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slugs"))
        .respond_with(ResponseTemplate::new(400).set_body_string("USER not found"))
        .mount(&server)
        .await;

    let err = api_for(&server).list(OwnerId::new("ghost")).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::ServerRejected {
            status: 400,
            body: "USER not found".to_string(),
        }
    );
}

#[tokio::test]
async fn create_posts_body_with_uid_and_returns_server_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slugs"))
        .and(body_json(json!({"slug": "x", "redirect": "/p/x", "uid": "alice"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            {"id": "42", "slug": "x", "redirect": "/p/x", "uid": "alice"}
        )))
        .expect(1)
        .mount(&server)
        .await;

    let record = api_for(&server)
        .create(OwnerId::new("alice"), NewSlug::new("x", "/p/x"))
        .await
        .unwrap();

    assert_eq!(record, SlugRecord::new("42", "x", "/p/x"));
}

#[tokio::test]
async fn update_puts_full_record_and_ignores_ack_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/slugs"))
        .and(body_json(json!({"id": "2", "slug": "s2", "redirect": "/new", "uid": "alice"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .update(OwnerId::new("alice"), SlugRecord::new("2", "s2", "/new"))
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_sends_userid_and_id_query() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/slugs"))
        .and(query_param("userid", "alice"))
        .and(query_param("id", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .delete(OwnerId::new("alice"), SlugId::new("3"))
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_failure_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/slugs"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .delete(OwnerId::new("alice"), SlugId::new("3"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ServerRejected { status: 500, .. }));
}

#[tokio::test]
async fn resolve_returns_redirect_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slug"))
        .and(query_param("slug", "apple-macbook-pro"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "9",
            "slug": "apple-macbook-pro",
            "redirect": "/products/apple-macbook-pro",
            "uid": "alice"
        })))
        .mount(&server)
        .await;

    let target = api_for(&server)
        .resolve("apple-macbook-pro".to_string())
        .await
        .unwrap();
    assert_eq!(target, "/products/apple-macbook-pro");
}

#[tokio::test]
async fn resolve_unknown_slug_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slug"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .resolve("does-not-exist".to_string())
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::NotFound("does-not-exist".to_string()));
}

#[tokio::test]
async fn unreachable_backend_is_transport_failure() {
    // Reserve a free port, then close it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ClientConfig::new(format!("http://127.0.0.1:{port}")).unwrap();

    let api = HttpSlugApi::new(&config).unwrap();
    let err = api.list(OwnerId::new("alice")).await.unwrap_err();
    assert!(matches!(err, ApiError::TransportFailure(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_backend_times_out_as_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slug"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"redirect": "/late"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new(server.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(50));
    let api = HttpSlugApi::new(&config).unwrap();

    let err = api.resolve("late".to_string()).await.unwrap_err();
    assert!(matches!(err, ApiError::TransportFailure(_)), "got {err:?}");
}
