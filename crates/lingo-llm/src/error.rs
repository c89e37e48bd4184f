use serde::Serialize;
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Classification of an upstream call that did not produce text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// HTTP 200 whose body lacks `choices[0].message.content`.
    MalformedResponse,
    /// HTTP 503 on the final attempt.
    UpstreamUnavailable,
    /// HTTP 429 on the final attempt.
    RateLimited,
    /// HTTP 400.
    BadRequest,
    /// Any other non-success status.
    UpstreamError,
    /// The per-attempt timeout elapsed on the final attempt.
    Timeout,
    /// The endpoint could not be reached on the final attempt.
    ConnectionError,
    /// Anything the classifier does not recognise.
    InternalError,
    /// The attempt loop ran out without a terminal classification.
    ExhaustedRetries,
}

/// Outcome of [`crate::UpstreamClient::complete`].
///
/// Failures are values: nothing the upstream does is allowed to escape the
/// client as an error or a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Success(String),
    Failure { kind: FailureKind, message: String },
}

impl CompletionResult {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        CompletionResult::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompletionResult::Success(_))
    }

    /// The failure class, if any.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            CompletionResult::Success(_) => None,
            CompletionResult::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Either the generated text or the user-facing failure message.
    pub fn text(&self) -> &str {
        match self {
            CompletionResult::Success(text) => text,
            CompletionResult::Failure { message, .. } => message,
        }
    }

    /// Apply `f` to the success text, leaving failures untouched.
    pub fn map_text(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            CompletionResult::Success(text) => CompletionResult::Success(f(text)),
            failure => failure,
        }
    }
}

/// Errors raised while constructing the client, never while calling it.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The reqwest client could not be built (TLS backend, proxy, ...).
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token is empty.
    #[error("missing API key")]
    MissingApiKey,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn failure_kinds_render_snake_case() {
        assert_eq!(FailureKind::MalformedResponse.to_string(), "malformed_response");
        assert_eq!(FailureKind::ExhaustedRetries.as_ref(), "exhausted_retries");
        assert_eq!(
            serde_json::to_value(FailureKind::RateLimited).unwrap(),
            serde_json::json!("rate_limited")
        );
    }

    #[test]
    fn map_text_ignores_failures() {
        let ok = CompletionResult::Success("  hola \n".into()).map_text(|t| t.trim().to_owned());
        assert_eq!(ok, CompletionResult::Success("hola".into()));

        let failed = CompletionResult::failure(FailureKind::Timeout, "late")
            .map_text(|_| "changed".into());
        assert_eq!(failed.text(), "late");
        assert_eq!(failed.kind(), Some(FailureKind::Timeout));
    }
}
