//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{
    ChatRequest, ConfigResponse, CreateSessionResponse, CredentialRequest, DeletedResponse,
    ErrorResponse, GroundingResponse, QueuedResponse, SessionResponse,
};
use super::AppState;
use crate::runtime::{RuntimeError, SseEvent};
use crate::state_machine::Event;
use crate::system_prompt::{grounding_exercise, CAPTION};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat page
        .route("/", get(serve_page))
        .route("/assets/*path", get(serve_static))
        // Display settings
        .route("/api/config", get(get_config))
        .route("/api/grounding-exercise", get(get_grounding_exercise))
        // Sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/stream", get(stream_session))
        // User actions
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/clear", post(clear_session))
        .route("/api/sessions/:id/credential", post(set_credential))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn serve_page() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - page not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Display settings
// ============================================================

async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = state.runtime.config();
    Json(ConfigResponse {
        title: config.app.title.clone(),
        caption: CAPTION,
        warning_message: config.app.warning_message.clone(),
        crisis_hotline: config.app.crisis_hotline.clone(),
        crisis_text: config.app.crisis_text.clone(),
        background_color: config.style.background_color.clone(),
        model: state.runtime.completion().model().to_string(),
    })
}

async fn get_grounding_exercise() -> Json<GroundingResponse> {
    Json(GroundingResponse {
        steps: grounding_exercise(),
    })
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let handle = state.runtime.create_session().await;
    tracing::info!(session_id = %handle.session_id, "Session created");

    Json(CreateSessionResponse {
        messages: handle.snapshot().messages,
        session_id: handle.session_id,
        created_at: handle.created_at,
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = state.runtime.get(&id).await?;
    let snapshot = handle.snapshot();

    Ok(Json(SessionResponse {
        session_id: handle.session_id,
        state: snapshot.state,
        messages: snapshot.messages,
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    state.runtime.remove_session(&id).await?;
    Ok(Json(DeletedResponse { deleted: true }))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (snapshot, rx) = state.runtime.subscribe(&id).await?;
    Ok(sse_stream(SseEvent::Init { snapshot }, rx))
}

// ============================================================
// User actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Message text is empty".to_string()));
    }

    state
        .runtime
        .send_event(&id, Event::UserMessage { text: req.text })
        .await?;

    Ok(Json(QueuedResponse { queued: true }))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QueuedResponse>, AppError> {
    state.runtime.send_event(&id, Event::Clear).await?;
    Ok(Json(QueuedResponse { queued: true }))
}

async fn set_credential(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    state
        .runtime
        .send_event(
            &id,
            Event::SetCredential {
                api_key: req.api_key,
            },
        )
        .await?;
    Ok(Json(QueuedResponse { queued: true }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<RuntimeError> for AppError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::SessionNotFound(_) => AppError::NotFound(e.to_string()),
            RuntimeError::SessionClosed(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
