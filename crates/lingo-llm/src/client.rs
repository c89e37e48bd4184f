//! Upstream client: request shaping, outcome classification and retries.
//!
//! [`UpstreamClient::complete`] never fails. Each attempt is classified as
//! either terminal (success, malformed body, client error, unknown status,
//! unexpected fault) or transient (503, 429, timeout, connection error).
//! Transient outcomes are retried after the delay given by the
//! [`RetryPolicy`] until the last attempt, which reports the transient class
//! itself.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::{CompletionResult, FailureKind, LlmError};
use crate::retry::{Backoff, RetryPolicy, Sleeper, TokioSleeper};
use crate::transport::{CompletionTransport, HttpTransport, RawResponse, TransportError};
use crate::types::{ChatMessage, CompletionProfile, CompletionRequest};

const MSG_UNEXPECTED_FORMAT: &str = "Unexpected response format from AI.";
const MSG_NO_CHOICES: &str = "No response generated by AI.";
const MSG_UNAVAILABLE: &str =
    "AI service is temporarily unavailable. Please try again in a few moments.";
const MSG_RATE_LIMITED: &str = "Rate limit exceeded. Please try again later.";
const MSG_BAD_REQUEST: &str = "Invalid request format. Please try again.";
const MSG_TIMEOUT: &str = "Request timed out. Please try again.";
const MSG_CONNECTION: &str = "Connection failed. Please check your internet connection.";
const MSG_INTERNAL: &str = "An unexpected error occurred.";
const MSG_EXHAUSTED: &str = "Failed to get response after multiple attempts.";

/// Result of classifying one attempt.
#[derive(Debug, PartialEq)]
enum Verdict {
    Done(CompletionResult),
    Transient { kind: FailureKind, backoff: Backoff },
}

/// Calls the completion endpoint on behalf of one inbound request.
#[derive(Clone)]
pub struct UpstreamClient {
    transport: Arc<dyn CompletionTransport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    model: String,
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("model", &self.model)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl UpstreamClient {
    pub fn new(transport: Arc<dyn CompletionTransport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            policy: RetryPolicy::default(),
            model: model.into(),
        }
    }

    /// Client talking HTTP to the API rooted at `base_url`.
    pub fn http(base_url: &str, api_key: &str, model: impl Into<String>) -> Result<Self, LlmError> {
        let transport = HttpTransport::new(base_url, api_key)?;
        Ok(Self::new(Arc::new(transport), model))
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `messages` with the sampling parameters of `profile`.
    pub async fn complete(&self, messages: Vec<ChatMessage>, profile: CompletionProfile) -> CompletionResult {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: profile.temperature,
            max_tokens: profile.max_tokens,
            top_p: profile.top_p,
        };
        let max_attempts = self.policy.max_attempts;

        for attempt in 0..max_attempts {
            info!(attempt = attempt + 1, max_attempts, model = %self.model, "sending completion request");

            let verdict = match self.transport.send(&request, profile.timeout).await {
                Ok(response) => {
                    info!(status = response.status, "upstream response status");
                    classify_response(&response)
                }
                Err(err) => classify_transport_error(&err),
            };

            let (kind, backoff) = match verdict {
                Verdict::Done(result) => return result,
                Verdict::Transient { kind, backoff } => (kind, backoff),
            };

            if self.policy.is_last(attempt) {
                error!(kind = %kind, attempts = max_attempts, "max retries reached");
                return CompletionResult::failure(kind, transient_message(kind));
            }

            let delay = self.policy.delay_for(backoff, attempt);
            warn!(kind = %kind, delay_ms = delay.as_millis() as u64, "transient upstream failure; retrying");
            self.sleeper.sleep(delay).await;
        }

        CompletionResult::failure(FailureKind::ExhaustedRetries, MSG_EXHAUSTED)
    }
}

fn classify_response(response: &RawResponse) -> Verdict {
    match response.status {
        200 => Verdict::Done(extract_content(&response.body)),
        503 => Verdict::Transient {
            kind: FailureKind::UpstreamUnavailable,
            backoff: Backoff::Exponential,
        },
        429 => Verdict::Transient {
            kind: FailureKind::RateLimited,
            backoff: Backoff::RateLimit,
        },
        400 => {
            error!(body = %response.body, "upstream rejected request as malformed");
            Verdict::Done(CompletionResult::failure(FailureKind::BadRequest, MSG_BAD_REQUEST))
        }
        status => {
            error!(status, body = %response.body, "upstream returned an error status");
            Verdict::Done(CompletionResult::failure(
                FailureKind::UpstreamError,
                format!("API returned {status}. Please try again."),
            ))
        }
    }
}

fn classify_transport_error(err: &TransportError) -> Verdict {
    match err {
        TransportError::Timeout => Verdict::Transient {
            kind: FailureKind::Timeout,
            backoff: Backoff::Exponential,
        },
        TransportError::Connect(detail) => {
            warn!(error = %detail, "connection to upstream failed");
            Verdict::Transient {
                kind: FailureKind::ConnectionError,
                backoff: Backoff::Exponential,
            }
        }
        TransportError::Other(detail) => {
            error!(error = %detail, "unexpected upstream fault");
            Verdict::Done(CompletionResult::failure(FailureKind::InternalError, MSG_INTERNAL))
        }
    }
}

/// Pull `choices[0].message.content` out of a 200 body.
fn extract_content(body: &str) -> CompletionResult {
    let malformed = |message: &str| CompletionResult::failure(FailureKind::MalformedResponse, message);

    let Ok(json) = serde_json::from_str::<Value>(body) else {
        error!(body = %body, "upstream body is not JSON");
        return malformed(MSG_UNEXPECTED_FORMAT);
    };

    let Some(choice) = json.get("choices").and_then(Value::as_array).and_then(|c| c.first()) else {
        error!(body = %body, "no choices in upstream response");
        return malformed(MSG_NO_CHOICES);
    };

    match choice.pointer("/message/content").and_then(Value::as_str) {
        Some(content) => CompletionResult::Success(content.to_owned()),
        None => {
            error!(body = %body, "unexpected upstream response structure");
            malformed(MSG_UNEXPECTED_FORMAT)
        }
    }
}

fn transient_message(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::UpstreamUnavailable => MSG_UNAVAILABLE,
        FailureKind::RateLimited => MSG_RATE_LIMITED,
        FailureKind::Timeout => MSG_TIMEOUT,
        FailureKind::ConnectionError => MSG_CONNECTION,
        _ => MSG_INTERNAL,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
