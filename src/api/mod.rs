use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::Validate;

use crate::food::imaging::decode_image_payload;
use crate::food::pipeline::{FailureReason, Resolution, ResolutionPipeline, ScanMode};
use crate::food::record::NutritionRecord;
use crate::llm::chat::CHAT_UNAVAILABLE;
use crate::llm::{ChatAssistant, SectionGateway, Sections};
use crate::profile::UserProfile;
use crate::providers::traits::CompletionProvider;
use crate::session::SessionStore;

pub const SESSION_HEADER: &str = "x-session-id";

/// Camera frames arrive base64-encoded, so allow well beyond axum's 2 MB default.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
const MAX_IN_FLIGHT_REQUESTS: usize = 64;

const NO_IMAGE_MESSAGE: &str = "No image data provided. Expected JSON with 'image' field.";

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<ResolutionPipeline>,
    sections: SectionGateway,
    chat: ChatAssistant,
    sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(
        pipeline: ResolutionPipeline,
        provider: Arc<dyn CompletionProvider>,
        max_sessions: usize,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sections: SectionGateway::new(Arc::clone(&provider)),
            chat: ChatAssistant::new(provider),
            sessions: Arc::new(SessionStore::new(max_sessions)),
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct ScanRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Image data is empty"))]
    image: Option<String>,
    #[serde(default = "default_mode")]
    mode: String,
}

fn default_mode() -> String {
    "barcode".to_string()
}

#[derive(Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 1000))]
    question: String,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: Uuid,
}

#[derive(Serialize)]
struct ScanSuccess {
    status: &'static str,
    product: NutritionRecord,
}

#[derive(Serialize)]
struct ScanFailure {
    status: &'static str,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ProductResponse {
    product: NutritionRecord,
    user: UserProfile,
    sections: Sections,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
}

fn status_response(code: StatusCode, status: impl Into<String>) -> Response {
    (code, Json(ApiResponse { status: status.into() })).into_response()
}

fn scan_failure(code: &'static str, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ScanFailure {
            status: "failed",
            code,
            message,
        }),
    )
        .into_response()
}

fn failure_response(reason: &FailureReason) -> Response {
    scan_failure(reason.code(), reason.to_string())
}

fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

fn unknown_session() -> Response {
    status_response(
        StatusCode::NOT_FOUND,
        "Unknown session. Submit your profile first.",
    )
}

/// Create and configure the API router
pub fn create_api(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .route("/profile", post(profile_handler))
        .route("/scan", post(scan_handler))
        .route("/product", get(product_handler))
        .route("/chat", post(chat_handler))
        .route("/image", get(image_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT_REQUESTS))
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Response {
    Json(ApiResponse {
        status: "Server is running and healthy".to_string(),
    })
    .into_response()
}

async fn profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response {
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => {
            warn!("Rejected profile body: {}", rejection.body_text());
            return status_response(
                StatusCode::BAD_REQUEST,
                "Expected a JSON object of profile fields",
            );
        }
    };
    let profile = UserProfile::from_form(form);
    let id = state.sessions.submit_profile(session_id(&headers), profile);
    info!("User profile saved for session {}", id);
    Json(SessionResponse { session_id: id }).into_response()
}

async fn scan_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Response {
    let Some(id) = session_id(&headers).filter(|id| state.sessions.get(id).is_some()) else {
        return unknown_session();
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected scan body: {}", rejection.body_text());
            return scan_failure("DECODE_ERROR", NO_IMAGE_MESSAGE.to_string());
        }
    };

    if let Err(reason) = request.mode.parse::<ScanMode>() {
        return failure_response(&reason);
    }
    if request.validate().is_err() {
        return scan_failure("DECODE_ERROR", "Image data is empty".to_string());
    }
    let Some(payload) = request.image else {
        return scan_failure("DECODE_ERROR", NO_IMAGE_MESSAGE.to_string());
    };
    let image = match decode_image_payload(&payload) {
        Ok(image) => image,
        Err(e) => {
            warn!("Rejected scan payload: {}", e);
            return failure_response(&FailureReason::DecodeError);
        }
    };

    match state.pipeline.resolve(&request.mode, &image).await {
        Resolution::Resolved(record) => {
            state
                .sessions
                .update(&id, |session| session.record_scan(record.clone(), image));
            Json(ScanSuccess {
                status: "success",
                product: record,
            })
            .into_response()
        }
        Resolution::Failed(reason) => failure_response(&reason),
    }
}

async fn product_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = session_id(&headers).and_then(|id| state.sessions.get(&id)) else {
        return unknown_session();
    };
    let Some(record) = session.record else {
        return status_response(StatusCode::NOT_FOUND, "No product scanned yet");
    };

    let sections = state
        .sections
        .synthesize_sections(&session.profile, &record)
        .await;

    Json(ProductResponse {
        product: record,
        user: session.profile,
        sections,
    })
    .into_response()
}

async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Some(session) = session_id(&headers).and_then(|id| state.sessions.get(&id)) else {
        return unknown_session();
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return status_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid question: {}", rejection.body_text()),
            );
        }
    };
    if let Err(e) = request.validate() {
        return status_response(StatusCode::BAD_REQUEST, format!("Invalid question: {}", e));
    }

    let answer = state
        .chat
        .answer(&session.profile, session.record.as_ref(), &request.question)
        .await
        .unwrap_or_else(|| CHAT_UNAVAILABLE.to_string());

    Json(ChatResponse { answer }).into_response()
}

async fn image_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = session_id(&headers).and_then(|id| state.sessions.get(&id)) else {
        return unknown_session();
    };

    match session.image {
        Some(image) => ([(header::CONTENT_TYPE, "image/jpeg")], Bytes::from(image)).into_response(),
        None => status_response(StatusCode::NOT_FOUND, "No image found"),
    }
}
