//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::time::Duration;
use tag_cache::{api::create_router, AppState, CacheRegistry};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::new(CacheRegistry::new()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(put_json("/users/set", r#"{"key":"test_key","value":"test_value"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_empty_key() {
    let app = create_test_app();

    let response = app
        .oneshot(put_json("/users/set", r#"{"key":"","value":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_set_endpoint_malformed_json() {
    let app = create_test_app();

    let response = app
        .oneshot(put_json("/users/set", r#"{"key":"k""#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_set_then_get_structured_value() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_json(
            "/Users/set",
            r#"{"key":"u1","value":{"name":"ada","roles":["admin"]},"expire":60000,"tags":["people"]}"#,
        ))
        .await
        .unwrap();

    let response = app.oneshot(get("/users/get/u1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "u1");
    assert_eq!(json["value"]["name"], "ada");
    let ttl = json["ttl"].as_u64().unwrap();
    assert!(ttl > 0 && ttl <= 60_000);
}

#[tokio::test]
async fn test_get_after_expiry() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_json("/ns/set", r#"{"key":"short","value":1,"expire":100}"#))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;

    let response = app.oneshot(get("/ns/get/short")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_namespaces_are_isolated() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_json("/a/set", r#"{"key":"k","value":"in-a"}"#))
        .await
        .unwrap();

    let response = app.oneshot(get("/b/get/k")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_flushes_memory_store() {
    let app = create_test_app();

    for body in [r#"{"key":"one","value":1}"#, r#"{"key":"two","value":2}"#] {
        app.clone().oneshot(put_json("/ns/set", body)).await.unwrap();
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/ns/del/one")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["scope"], "all");

    let response = app.oneshot(get("/ns/get/two")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == TAGRM Endpoint Tests ==

#[tokio::test]
async fn test_tagrm_endpoint_invalidates_tagged_entries_only() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_json("/ns/set", r#"{"key":"a","value":1,"tags":"A"}"#))
        .await
        .unwrap();
    app.clone()
        .oneshot(put_json("/ns/set", r#"{"key":"b","value":2,"tags":["B"]}"#))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/ns/tagrm", r#"{"tag":"A"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["tag"], "A");
    assert!(json["instant"].as_u64().unwrap() > 0);

    let response = app.clone().oneshot(get("/ns/get/a")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/ns/get/b")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_global_tagrm_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_json("/ns/set", r#"{"key":"a","value":1,"tags":"A"}"#))
        .await
        .unwrap();

    let response = app.clone().oneshot(post_json("/ns/tagrm", "{}")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["tag"], "__global__");

    let response = app.oneshot(get("/ns/get/a")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Stats & Health ==

#[tokio::test]
async fn test_stats_endpoint_counts_lookups() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_json("/ns/set", r#"{"key":"k","value":1}"#))
        .await
        .unwrap();
    app.clone().oneshot(get("/ns/get/k")).await.unwrap();
    app.clone().oneshot(get("/ns/get/missing")).await.unwrap();

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["store"]["hits"], 1);
    assert_eq!(json["store"]["misses"], 1);
    assert_eq!(json["namespaces"][0]["namespace"], "ns");
    assert_eq!(json["namespaces"][0]["hits"], 1);
    assert_eq!(json["namespaces"][0]["absent"], 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
