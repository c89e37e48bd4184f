use lingo_llm::{CompletionResult, Turn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Message text; blank counts as absent.
    #[serde(default)]
    pub text: Option<String>,
    /// Base64 image, optionally as a `data:` URI.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub success: bool,
    /// Assistant reply, or the failure message when `success` is false.
    pub response: String,
    pub session_id: String,
    /// Completed user/assistant exchanges stored for the session.
    pub message_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn from_result(result: &CompletionResult, session_id: &str, message_count: usize) -> Self {
        Self {
            success: result.is_success(),
            response: result.text().to_owned(),
            session_id: session_id.to_owned(),
            message_count,
            error: result.kind().map(|k| k.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

impl ClearResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionInfoResponse {
    pub success: bool,
    pub session_id: String,
    pub message_count: usize,
    pub turn_count: usize,
    /// RFC 3339 timestamp of the newest turn.
    pub last_activity: Option<String>,
}

impl SessionInfoResponse {
    pub fn from_history(session_id: &str, history: &[Turn]) -> Self {
        Self {
            success: true,
            session_id: session_id.to_owned(),
            message_count: history.len() / 2,
            turn_count: history.len(),
            last_activity: history.last().map(|t| t.timestamp.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatHealthResponse {
    pub status: String,
    pub service: String,
    pub active_sessions: usize,
}
