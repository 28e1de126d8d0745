//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    AssistantResponse, ChatRequest, ChatResponse, ErrorResponse, ModelsResponse, SuccessResponse,
};
use super::AppState;
use crate::runtime::{AssistantHandle, SubmitError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Panel: open (or reuse) and read, close
        .route("/api/assistant", get(get_assistant).delete(close_assistant))
        // User actions
        .route("/api/assistant/chat", post(send_chat))
        .route("/api/assistant/clear", post(clear_assistant))
        // SSE streaming
        .route("/api/assistant/stream", get(stream_assistant))
        // Model info
        .route("/api/models", get(list_models))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Panel
// ============================================================

fn panel_view(state: &AppState, handle: &AssistantHandle) -> AssistantResponse {
    let snapshot = handle.snapshot();
    AssistantResponse {
        member: state.actor.display_name().to_string(),
        messages: snapshot.messages.clone(),
        status: snapshot.status,
        generation: snapshot.generation,
    }
}

async fn get_assistant(State(state): State<AppState>) -> Json<AssistantResponse> {
    let handle = state.panels.open().await;
    Json(panel_view(&state, &handle))
}

async fn close_assistant(State(state): State<AppState>) -> Json<SuccessResponse> {
    let success = state.panels.close().await;
    Json(SuccessResponse { success })
}

async fn stream_assistant(State(state): State<AppState>) -> impl IntoResponse {
    let handle = state.panels.open().await;
    sse_stream(handle.subscribe())
}

// ============================================================
// User Actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), AppError> {
    let handle = state.panels.open().await;
    let generation = handle.submit(req.text).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ChatResponse {
            accepted: true,
            generation,
        }),
    ))
}

async fn clear_assistant(
    State(state): State<AppState>,
) -> Result<Json<AssistantResponse>, AppError> {
    let handle = state.panels.open().await;
    handle.clear().await?;
    Ok(Json(panel_view(&state, &handle)))
}

// ============================================================
// Model Info
// ============================================================

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_model_info(),
        default: state.llm_registry.default_model_id().to_string(),
    })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("p3394-portal ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Empty | SubmitError::Rejected(_) => AppError::BadRequest(e.to_string()),
            SubmitError::Busy => AppError::Conflict(e.to_string()),
            SubmitError::Closed => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
