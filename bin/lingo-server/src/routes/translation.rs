use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use lingo_llm::{CompletionProfile, CompletionResult, ContextEntry, Language};
use tracing::{info, warn};
use utoipa::OpenApi;

use crate::entities::TranslationRecord;
use crate::error::ServerError;
use crate::middleware::SessionId;
use crate::schemas::chat::ClearResponse;
use crate::schemas::translation::{
    ConversationContextEntry, HistoryResponse, LanguagesResponse, TranslateRequest,
    TranslateResponse, TranslationEntry, TranslationHealthResponse,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(translate, languages, history, clear_history, translation_health),
    components(schemas(
        TranslateRequest,
        ConversationContextEntry,
        TranslateResponse,
        LanguagesResponse,
        TranslationEntry,
        HistoryResponse,
        TranslationHealthResponse
    ))
)]
pub struct TranslationApi;

/// Routes nested under `/api/translation`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/translate", post(translate))
        .route("/languages", get(languages))
        .route("/history", get(history))
        .route("/clear-history", post(clear_history))
        .route("/health", get(translation_health))
}

#[utoipa::path(
    post,
    path = "/api/translation/translate",
    tag = "translation",
    request_body = TranslateRequest,
    responses(
        (status = 200, description = "Translation completed or upstream failure reported", body = TranslateResponse),
        (status = 400, description = "Blank text, unsupported language or malformed JSON"),
        (status = 415, description = "Body is not `application/json`"),
        (status = 422, description = "Body has the wrong shape"),
        (status = 500, description = "Session store error"),
    )
)]
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ServerError> {
    let Json(req) = payload?;
    let text = req.text.trim();
    info!(
        session_id = %session,
        has_text = !text.is_empty(),
        target = %req.target_language,
        "translation request"
    );

    if text.is_empty() {
        return Err(ServerError::BadRequest(
            "No text provided for translation".into(),
        ));
    }
    let language = Language::from_code(&req.target_language).ok_or_else(|| {
        ServerError::BadRequest(format!("Unsupported language: {}", req.target_language))
    })?;

    let context: Vec<ContextEntry> = req
        .conversation_context
        .into_iter()
        .map(ContextEntry::from)
        .collect();
    let messages = state.context.translation(text, language, &context);
    let result = state
        .upstream
        .complete(messages, CompletionProfile::translation())
        .await
        .map_text(|t| t.trim().to_owned());

    let (translated_text, error, message) = match result {
        CompletionResult::Success(translated) => {
            let record = TranslationRecord::new(text, translated.as_str(), language.code());
            state.translations.append(session.as_str(), vec![record]).await?;
            (translated, None, None)
        }
        CompletionResult::Failure { kind, message } => {
            warn!(session_id = %session, %kind, detail = %message, "translation failed");
            (String::new(), Some(kind.to_string()), Some(message))
        }
    };

    Ok(Json(TranslateResponse {
        success: error.is_none(),
        original_text: text.to_owned(),
        translated_text,
        target_language: language.code().to_owned(),
        language_name: language.name().to_owned(),
        session_id: session.0,
        error,
        message,
    }))
}

#[utoipa::path(
    get,
    path = "/api/translation/languages",
    tag = "translation",
    responses(
        (status = 200, description = "Supported target languages", body = LanguagesResponse)
    )
)]
pub async fn languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse::supported())
}

#[utoipa::path(
    get,
    path = "/api/translation/history",
    tag = "translation",
    responses(
        (status = 200, description = "Recent translations, oldest first", body = HistoryResponse),
        (status = 500, description = "Session store error"),
    )
)]
pub async fn history(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let records = state.translations.get(session.as_str()).await?;
    Ok(Json(HistoryResponse {
        success: true,
        history: records.iter().map(TranslationRecord::to_response).collect(),
        session_id: session.0,
    }))
}

#[utoipa::path(
    post,
    path = "/api/translation/clear-history",
    tag = "translation",
    responses(
        (status = 200, description = "History cleared", body = ClearResponse),
        (status = 500, description = "Session store error"),
    )
)]
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<ClearResponse>, ServerError> {
    state.translations.clear(session.as_str()).await?;
    info!(session_id = %session, "translation history cleared");
    Ok(Json(ClearResponse::ok("Translation history cleared")))
}

#[utoipa::path(
    get,
    path = "/api/translation/health",
    tag = "translation",
    responses(
        (status = 200, description = "Translation service is up", body = TranslationHealthResponse)
    )
)]
pub async fn translation_health() -> Json<TranslationHealthResponse> {
    Json(TranslationHealthResponse {
        status: "healthy".into(),
        service: "translation".into(),
        supported_languages: Language::all().count(),
    })
}
