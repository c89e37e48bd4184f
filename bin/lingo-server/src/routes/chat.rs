use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use lingo_llm::{CompletionProfile, CompletionResult, Turn};
use tracing::{info, warn};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::middleware::SessionId;
use crate::schemas::chat::{
    ChatHealthResponse, ChatRequest, ChatResponse, ClearResponse, SessionInfoResponse,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(chat_with_context, clear_context, session_info, chat_health),
    components(schemas(
        ChatRequest,
        ChatResponse,
        ClearResponse,
        SessionInfoResponse,
        ChatHealthResponse
    ))
)]
pub struct ChatApi;

/// Request body cap for chat; base64 inflates an image by about a third.
pub const MAX_CHAT_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Routes nested under `/api`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/chat-with-context",
            post(chat_with_context).layer(DefaultBodyLimit::max(MAX_CHAT_BODY_BYTES)),
        )
        .route("/clear-context", post(clear_context))
        .route("/session-info", get(session_info))
        .route("/health", get(chat_health))
}

/// Send a message (text, image or both) with the session's recent history.
///
/// Upstream failures still answer 200: `success` is false, `response` holds
/// the failure message and `error` its kind. Nothing is recorded then.
#[utoipa::path(
    post,
    path = "/api/chat-with-context",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Exchange completed or upstream failure reported", body = ChatResponse),
        (status = 400, description = "No text or image, or image is not base64"),
        (status = 413, description = "Body larger than the chat cap"),
        (status = 415, description = "Body is not `application/json`"),
        (status = 422, description = "Body has the wrong shape"),
        (status = 500, description = "Session store error"),
    )
)]
pub async fn chat_with_context(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    let Json(req) = payload?;
    let text = req.text.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let image = req.image.as_deref().map(decode_image).transpose()?.flatten();
    info!(
        session_id = %session,
        has_text = text.is_some(),
        has_image = image.is_some(),
        "chat request"
    );

    let history = state.chat_history.get(session.as_str()).await?;
    let messages = state.context.chat(&history, text, image.as_deref());
    if messages.is_empty() {
        return Err(ServerError::BadRequest("No text or image provided".into()));
    }

    let result = state.upstream.complete(messages, CompletionProfile::chat()).await;
    let stored = match &result {
        CompletionResult::Success(reply) => {
            let user = Turn::user(text.unwrap_or(Turn::IMAGE_PLACEHOLDER), image.is_some());
            state
                .chat_history
                .append(session.as_str(), vec![user, Turn::assistant(reply.as_str())])
                .await?
        }
        CompletionResult::Failure { kind, message } => {
            warn!(session_id = %session, %kind, detail = %message, "chat exchange failed");
            history.len()
        }
    };

    Ok(Json(ChatResponse::from_result(&result, session.as_str(), stored / 2)))
}

#[utoipa::path(
    post,
    path = "/api/clear-context",
    tag = "chat",
    responses(
        (status = 200, description = "History cleared", body = ClearResponse),
        (status = 500, description = "Session store error"),
    )
)]
pub async fn clear_context(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<ClearResponse>, ServerError> {
    state.chat_history.clear(session.as_str()).await?;
    info!(session_id = %session, "conversation context cleared");
    Ok(Json(ClearResponse::ok("Conversation context cleared")))
}

#[utoipa::path(
    get,
    path = "/api/session-info",
    tag = "chat",
    responses(
        (status = 200, description = "Session summary", body = SessionInfoResponse),
        (status = 500, description = "Session store error"),
    )
)]
pub async fn session_info(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<SessionInfoResponse>, ServerError> {
    let history = state.chat_history.get(session.as_str()).await?;
    Ok(Json(SessionInfoResponse::from_history(session.as_str(), &history)))
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "chat",
    responses(
        (status = 200, description = "Chat service is up", body = ChatHealthResponse),
        (status = 500, description = "Session store error"),
    )
)]
pub async fn chat_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChatHealthResponse>, ServerError> {
    Ok(Json(ChatHealthResponse {
        status: "healthy".into(),
        service: "chat".into(),
        active_sessions: state.chat_history.session_count().await?,
    }))
}

/// Decode a base64 image, accepting an optional `data:<mime>;base64,` prefix.
/// Blank or empty payloads count as no image.
fn decode_image(raw: &str) -> Result<Option<Vec<u8>>, ServerError> {
    let raw = raw.trim();
    let payload = match raw.strip_prefix("data:") {
        Some(uri) => uri
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| ServerError::BadRequest("Image data URI must be base64".into()))?,
        None => raw,
    };
    if payload.is_empty() {
        return Ok(None);
    }
    let bytes = BASE64_STANDARD
        .decode(payload)
        .map_err(|e| ServerError::BadRequest(format!("Invalid image data: {e}")))?;
    Ok((!bytes.is_empty()).then_some(bytes))
}
