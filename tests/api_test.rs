mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use common::{blank_image, pipeline, rxing, ScriptedProvider};
use kenshoku::api::{create_api, AppState, SESSION_HEADER};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn app(server: &MockServer, reply: &'static str) -> Router {
    let provider = ScriptedProvider::replying(reply);
    let pipeline = pipeline(&server.uri(), rxing(), provider.clone());
    create_api(AppState::new(pipeline, provider, 8))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, session: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = session {
        builder = builder.header(SESSION_HEADER, id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, session: &str) -> Request<Body> {
    Request::get(uri)
        .header(SESSION_HEADER, session)
        .body(Body::empty())
        .unwrap()
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send(
        app,
        post_json("/profile", None, json!({ "name": "Sam", "goals": "more protein" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_string()
}

fn data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

#[tokio::test]
async fn health_reports_running() {
    let server = MockServer::start().await;
    let app = app(&server, "ok").await;

    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Server is running and healthy");
}

#[tokio::test]
async fn scan_requires_a_known_session() {
    let server = MockServer::start().await;
    let app = app(&server, "ok").await;

    let request = post_json(
        "/scan",
        Some("7d8f9c1e-0000-4000-8000-000000000000"),
        json!({ "image": data_uri(&blank_image()), "mode": "food" }),
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_mode_is_a_bad_request() {
    let server = MockServer::start().await;
    let app = app(&server, "ok").await;
    let session = new_session(&app).await;

    let request = post_json(
        "/scan",
        Some(&session),
        json!({ "image": data_uri(&blank_image()), "mode": "qr" }),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["code"], "INVALID_MODE");
}

#[tokio::test]
async fn broken_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    let app = app(&server, "ok").await;
    let session = new_session(&app).await;

    let request = post_json(
        "/scan",
        Some(&session),
        json!({ "image": "data:image/png;base64,@@not base64@@" }),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DECODE_ERROR");
}

#[tokio::test]
async fn food_scan_feeds_product_page_and_image() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foods/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "foods": [] })))
        .mount(&server)
        .await;
    let app = app(&server, "Food: lentil soup\nQuantity: 1 bowl").await;
    let session = new_session(&app).await;

    let (status, _) = send(&app, get("/product", &session)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let image = blank_image();
    let request = post_json(
        "/scan",
        Some(&session),
        json!({ "image": data_uri(&image), "mode": "food" }),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["product"]["product_name"], "lentil soup");
    assert_eq!(body["product"]["dietary"], "Likely Vegan (please verify ingredients)");

    let (status, body) = send(&app, get("/product", &session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Sam");
    assert!(body["sections"]["calories"].is_string());

    let response = app.clone().oneshot(get("/image", &session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(served.as_ref(), image.as_slice());
}

#[tokio::test]
async fn chat_answers_within_a_session() {
    let server = MockServer::start().await;
    let app = app(&server, "Eat more beans.").await;
    let session = new_session(&app).await;

    let request = post_json("/chat", Some(&session), json!({ "question": "What should I eat?" }));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Eat more beans.");
}

#[tokio::test]
async fn missing_image_is_a_structured_failure() {
    let server = MockServer::start().await;
    let app = app(&server, "ok").await;
    let session = new_session(&app).await;

    let (status, body) = send(&app, post_json("/scan", Some(&session), json!({ "mode": "food" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["code"], "DECODE_ERROR");
    assert!(body["message"].as_str().unwrap().contains("No image data provided"));

    let request = Request::post("/scan")
        .header(header::CONTENT_TYPE, "application/json")
        .header(SESSION_HEADER, session.as_str())
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");
}

#[tokio::test]
async fn missing_question_is_a_bad_request() {
    let server = MockServer::start().await;
    let app = app(&server, "ok").await;
    let session = new_session(&app).await;

    let (status, body) = send(&app, post_json("/chat", Some(&session), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["status"].as_str().unwrap().starts_with("Invalid question"));
}

#[tokio::test]
async fn profile_accepts_non_string_values() {
    let server = MockServer::start().await;
    let app = app(&server, "ok").await;

    let (status, body) = send(
        &app,
        post_json("/profile", None, json!({ "name": "Sam", "age": 31, "allergens": ["peanuts"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session = body["session_id"].as_str().unwrap().to_string();

    let request = post_json(
        "/scan",
        Some(&session),
        json!({ "image": data_uri(&blank_image()), "mode": "qr" }),
    );
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
