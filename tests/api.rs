// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// HTTP tests for the message processing API

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use pii_shield::scanner::{PiiScanner, ScannerConfig};
use pii_shield::service::{build_router, responder::DEFAULT_REPLY, AppState, Settings};

fn create_app_with(settings: Settings) -> Router {
    let scanner = PiiScanner::new(ScannerConfig {
        fallback_enabled: false,
        ..Default::default()
    })
    .unwrap();
    build_router(AppState::new(scanner, &settings).unwrap())
}

fn create_app(max_input_chars: usize) -> Router {
    create_app_with(Settings {
        max_input_chars,
        ..Default::default()
    })
}

/// App allowed to fetch from loopback, for tests against a local page server
fn create_webpage_app() -> Router {
    let mut settings = Settings::default();
    settings.webpage.allow_private_hosts = true;
    create_app_with(settings)
}

/// Serve fixed pages on an ephemeral local port; returns the base URL
async fn spawn_page_server() -> String {
    let pages = Router::new()
        .route(
            "/profile",
            axum::routing::get(|| async {
                axum::response::Html(
                    "<html><head><title>Profile</title></head><body>\
                     <h1>Contact</h1><p>reach me at jane@corp.io or 555-123-4567.</p>\
                     <script>var tracking = 'x@y.com';</script></body></html>",
                )
            }),
        )
        .route(
            "/plain",
            axum::routing::get(|| async { axum::response::Html("<p>Opening hours 9 to 5</p>") }),
        )
        .route(
            "/moved",
            axum::routing::get(|| async { axum::response::Redirect::temporary("/profile") }),
        )
        .route(
            "/big",
            axum::routing::get(|| async { "a".repeat(64 * 1024) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, pages).await.unwrap();
    });
    format!("http://{}", addr)
}

fn post_message(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/process-message")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let app = create_app(20_000);

    for uri in ["/", "/health"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");
        assert_eq!(body["storedRecords"], 0);
    }
}

#[tokio::test]
async fn test_process_message_with_pii() {
    let app = create_app(20_000);

    let (status, body) = send(
        &app,
        post_message(json!({
            "text": "My email is a@b.com and my phone is 555-123-4567",
            "detectionLevel": "High (Sensitive)",
            "contentType": "text"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["sanitizedText"],
        "My email is [REDACTED] and my phone is [REDACTED]"
    );
    assert_eq!(body["piiDetected"], true);
    assert_eq!(body["piiCount"], 2);
    assert_eq!(body["detectionLevel"], "High (Sensitive)");
    assert_eq!(body["piiItems"][0]["type"], "Email");
    assert_eq!(body["piiItems"][1]["type"], "Phone Number");
    assert!(body["llmResponse"]
        .as_str()
        .unwrap()
        .contains("protected 2 pieces of personal information"));
    assert!(body["sessionId"].as_str().unwrap().starts_with("session-"));
}

#[tokio::test]
async fn test_stored_record_is_retrievable() {
    let app = create_app(20_000);

    let request = Request::builder()
        .method("POST")
        .uri("/api/process-message")
        .header("content-type", "application/json")
        .header("x-user-id", "42")
        .body(Body::from(json!({ "text": "SSN 123-45-6789" }).to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    let (status, record) = send(&app, get(&format!("/api/pii/42/{}", session_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["sessionId"], session_id.as_str());
    assert_eq!(record["userId"], 42);
    assert_eq!(record["piiItems"][0]["type"], "SSN");
    assert_eq!(record["piiItems"][0]["value"], "[REDACTED]");
    assert_eq!(record["summary"]["total"], 1);

    // Records are scoped to their owner
    let (status, _) = send(&app, get(&format!("/api/pii/anonymous/{}", session_id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, health) = send(&app, get("/health")).await;
    assert_eq!(health["storedRecords"], 1);
}

#[tokio::test]
async fn test_process_message_without_pii() {
    let app = create_app(20_000);

    let (status, body) = send(&app, post_message(json!({ "text": "hello there" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["piiDetected"], false);
    assert_eq!(body["piiCount"], 0);
    assert_eq!(body["sanitizedText"], "hello there");
    assert_eq!(body["llmResponse"], DEFAULT_REPLY);
    assert_eq!(body["detectionLevel"], "Medium (Standard)");
    assert!(body.get("sessionId").is_none());
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let app = create_app(20_000);

    let (status, body) = send(
        &app,
        post_message(json!({ "text": "a@b.com", "contentType": "image" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported content type");
}

#[tokio::test]
async fn test_invalid_request_bodies() {
    let app = create_app(20_000);

    let (status, body) = send(
        &app,
        post_message(json!({ "text": "hi", "detectionLevel": "Extreme" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request data");

    let (status, _) = send(&app, post_message(json!({ "message": "hi" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/api/process-message")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_user_header() {
    let app = create_app(20_000);

    let request = Request::builder()
        .method("POST")
        .uri("/api/process-message")
        .header("content-type", "application/json")
        .header("x-user-id", "bob")
        .body(Body::from(json!({ "text": "hi" }).to_string()))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_message_too_long() {
    let app = create_app(10);

    let (status, body) = send(
        &app,
        post_message(json!({ "text": "this message is far too long" })),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Message too long");
}

#[tokio::test]
async fn test_unknown_record() {
    let app = create_app(20_000);

    let (status, body) = send(&app, get("/api/pii/anonymous/session-missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_detection_level_is_case_insensitive() {
    let app = create_app(20_000);

    let (status, body) = send(
        &app,
        post_message(json!({ "text": "hi", "detectionLevel": "HIGH" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detectionLevel"], "High (Sensitive)");
}

#[tokio::test]
async fn test_webpage_is_fetched_and_scanned() {
    let base = spawn_page_server().await;
    let app = create_webpage_app();
    let url = format!("{}/profile", base);

    let (status, body) = send(
        &app,
        post_message(json!({ "contentType": "webpage", "url": url })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["sanitizedText"],
        "Contact\nreach me at [REDACTED] or [REDACTED]."
    );
    assert_eq!(body["piiCount"], 2);
    assert_eq!(
        body["llmResponse"],
        format!(
            "I've processed the webpage at {} and found 2 pieces of personal information. \
             The content has been secured.",
            url
        )
        .as_str()
    );
    assert!(body["sessionId"].as_str().unwrap().starts_with("session-"));
}

#[tokio::test]
async fn test_webpage_redirect_followed() {
    let base = spawn_page_server().await;
    let app = create_webpage_app();

    let (status, body) = send(
        &app,
        post_message(json!({ "contentType": "webpage", "url": format!("{}/moved", base) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["piiCount"], 2);
}

#[tokio::test]
async fn test_webpage_without_pii() {
    let base = spawn_page_server().await;
    let app = create_webpage_app();

    let (status, body) = send(
        &app,
        post_message(json!({ "contentType": "webpage", "url": format!("{}/plain", base) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["piiDetected"], false);
    assert_eq!(body["sanitizedText"], "Opening hours 9 to 5");
    assert!(body.get("sessionId").is_none());
}

#[tokio::test]
async fn test_webpage_upstream_failures() {
    let base = spawn_page_server().await;
    let mut settings = Settings::default();
    settings.webpage.allow_private_hosts = true;
    settings.webpage.max_bytes = 1024;
    let app = create_app_with(settings);

    let (status, body) = send(
        &app,
        post_message(json!({ "contentType": "webpage", "url": format!("{}/missing", base) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Webpage processing error");

    let (status, _) = send(
        &app,
        post_message(json!({ "contentType": "webpage", "url": format!("{}/big", base) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_webpage_rejects_internal_and_missing_urls() {
    // Default settings block loopback targets
    let base = spawn_page_server().await;
    let app = create_app(20_000);

    let (status, body) = send(
        &app,
        post_message(json!({ "contentType": "webpage", "url": format!("{}/profile", base) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].as_str().unwrap().contains("blocked host"));

    let (status, _) = send(&app, post_message(json!({ "contentType": "webpage" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_message(json!({ "contentType": "webpage", "url": "file:///etc/passwd" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
