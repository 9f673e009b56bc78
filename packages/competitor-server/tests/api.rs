//! Router-level tests against mocked collaborators.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use competitor_analysis::testing::{sample_pdf, MockFetcher, MockReasoningService, MockRenderer};
use competitor_analysis::{PageOutline, Pipeline};
use competitor_server::{build_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const PAGE: &str = "<html><head><title>Acme Furniture</title></head><body>\
    <h1>Handmade tables</h1>\
    <p>Every table is built to order from solid oak and shipped within two weeks.</p>\
    </body></html>";

const BOUNDARY: &str = "competitor-test-boundary";

fn pipeline_with(mock: MockReasoningService, renderer: MockRenderer) -> Pipeline {
    Pipeline::builder(Arc::new(mock))
        .fetcher(Arc::new(MockFetcher::with_html(PAGE)))
        .renderer(Arc::new(renderer))
        .build()
        .unwrap()
}

fn app(mock: MockReasoningService) -> Router {
    build_app(AppState::new(pipeline_with(mock, MockRenderer::unavailable())))
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn multipart_request(uri: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
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
    let app = app(MockReasoningService::new());
    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "competitor-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_analyze_text_success_is_listed_in_history() {
    let app = app(MockReasoningService::new());
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/analyze_text",
            json!({"text": "Great prices, slow delivery, no live chat support."}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["error"].is_null());
    assert_eq!(body["analysis"]["design_score"], 6);
    assert_eq!(body["analysis"]["weaknesses"][0], "Slow delivery");

    let (status, history) = send(&app, empty_request(Method::GET, "/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["total"], 1);
    assert_eq!(history["items"][0]["request_type"], "text");
}

#[tokio::test]
async fn test_short_text_is_bad_request() {
    let mock = MockReasoningService::new();
    let app = app(mock.clone());
    let (status, body) = send(
        &app,
        json_request(Method::POST, "/analyze_text", json!({"text": "too short"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("at least 10"));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let app = app(MockReasoningService::new().with_failure("503 Service Unavailable"));
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/analyze_text",
            json!({"text": "Great prices, slow delivery"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);

    let (_, history) = send(&app, empty_request(Method::GET, "/history")).await;
    assert_eq!(history["total"], 0);
}

#[tokio::test]
async fn test_clear_history() {
    let app = app(MockReasoningService::new());
    send(
        &app,
        json_request(
            Method::POST,
            "/analyze_text",
            json!({"text": "Great prices, slow delivery"}),
        ),
    )
    .await;

    let (status, body) = send(&app, empty_request(Method::DELETE, "/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, history) = send(&app, empty_request(Method::GET, "/history")).await;
    assert_eq!(history["total"], 0);
    assert_eq!(history["items"], json!([]));
}

#[tokio::test]
async fn test_analyze_image_upload() {
    let mock = MockReasoningService::new();
    let app = app(mock.clone());
    let request = multipart_request("/analyze_image", "landing.png", "image/png", b"\x89PNG\r\n\x1a\n");
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["visual_style_score"], 7);
    assert!(mock.calls()[0].is_multimodal());

    let (_, history) = send(&app, empty_request(Method::GET, "/history")).await;
    assert_eq!(history["items"][0]["request_summary"], "Image: landing.png");
}

#[tokio::test]
async fn test_unsupported_image_type() {
    let mock = MockReasoningService::new();
    let app = app(mock.clone());
    let request = multipart_request("/analyze_image", "scan.bmp", "image/bmp", b"BM....");
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["success"], false);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_pdf_endpoint_requires_pdf_content_type() {
    let app = app(MockReasoningService::new());
    let request = multipart_request("/analyze_pdf", "notes.txt", "text/plain", b"hello");
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].as_str().unwrap().contains("application/pdf"));
}

#[tokio::test]
async fn test_analyze_pdf_upload() {
    let app = app(MockReasoningService::new());
    let pdf = sample_pdf(&["Alpha", "Beta"]);
    let request = multipart_request("/analyze_pdf", "brochure.pdf", "application/pdf", &pdf);
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["extracted_text"], "Alpha\n\nBeta");
    assert_eq!(body["analysis"]["design_score"], 6);

    let (_, history) = send(&app, empty_request(Method::GET, "/history")).await;
    assert_eq!(history["items"][0]["request_type"], "pdf");
    assert_eq!(history["items"][0]["request_summary"], "PDF: brochure.pdf");
}

#[tokio::test]
async fn test_undecodable_pdf_is_unprocessable() {
    let mock = MockReasoningService::new();
    let app = app(mock.clone());
    let request = multipart_request(
        "/analyze_pdf",
        "brochure.pdf",
        "application/pdf",
        b"%PDF-1.4 truncated garbage",
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = app(MockReasoningService::new());
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/analyze_image")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_parse_fast_returns_outline_and_text_analysis() {
    let app = app(MockReasoningService::new());
    let (status, body) = send(
        &app,
        json_request(Method::POST, "/parse_fast", json!({"url": "https://acme.example"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["url"], "https://acme.example/");
    assert_eq!(body["data"]["title"], "Acme Furniture");
    assert_eq!(body["data"]["h1"], "Handmade tables");
    assert_eq!(body["data"]["route"], "text");
    assert_eq!(body["data"]["analysis"]["variant"], "text");
}

#[tokio::test]
async fn test_parse_demo_with_screenshot_uses_vision() {
    let outline = PageOutline {
        title: Some("Acme Furniture".into()),
        heading: Some("Handmade tables".into()),
        lead_paragraph: None,
    };
    let renderer = MockRenderer::with_screenshot(outline, b"\x89PNG\r\n".to_vec());
    let app = build_app(AppState::new(pipeline_with(MockReasoningService::new(), renderer)));

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/parse_demo", json!({"url": "https://acme.example"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["route"], "vision");
    assert_eq!(body["data"]["analysis"]["variant"], "image");
    assert!(body["data"].get("degraded_reason").is_none());
}

#[tokio::test]
async fn test_parse_rejects_private_address() {
    let app = app(MockReasoningService::new());
    let (status, body) = send(
        &app,
        json_request(Method::POST, "/parse_fast", json!({"url": "http://127.0.0.1:8080/admin"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_parse_unreachable_page() {
    let renderer = MockRenderer::failing("net::ERR_CONNECTION_REFUSED");
    let app = build_app(AppState::new(pipeline_with(MockReasoningService::new(), renderer)));

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/parse_demo", json!({"url": "https://down.example"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
