//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code. Handlers take
//! `Result<Json<T>, JsonRejection>` so body rejections also answer in JSON.
//!
//! Upstream failures are not errors here: they arrive as
//! [`lingo_llm::CompletionResult`] values and are embedded in normal
//! responses by the handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the lingo-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body was missing, oversized, not JSON or the wrong shape.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            // Log the detail, keep it away from the client.
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_exposes_message() {
        let response = ServerError::BadRequest("No text provided".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "No text provided");
    }

    #[tokio::test]
    async fn body_rejection_keeps_status_and_answers_json() {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::Request;

        let req = Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": 5}"#))
            .unwrap();
        let rejection = Json::<std::collections::HashMap<String, String>>::from_request(req, &())
            .await
            .unwrap_err();

        let response = ServerError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let err: ServerError = anyhow::anyhow!("lock poisoned at store.rs:42").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "internal server error");
    }
}
