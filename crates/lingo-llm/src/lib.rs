//! Resilient access to an OpenAI-compatible chat-completion endpoint.
//!
//! The crate is split along the seams the HTTP layer needs:
//! - [`context`] turns stored turns plus the current input into messages.
//! - [`client::UpstreamClient`] sends them, classifies the outcome and retries
//!   transient failures according to a [`retry::RetryPolicy`].
//! - [`transport`] and [`retry::Sleeper`] are injectable so retry behaviour can
//!   be exercised without a network or a wall clock.

pub mod client;
pub mod context;
pub mod error;
pub mod language;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::UpstreamClient;
pub use error::{CompletionResult, FailureKind, LlmError};
pub use language::Language;
pub use retry::{Backoff, RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{CompletionTransport, HttpTransport, RawResponse, TransportError};
pub use types::{
    ChatMessage, CompletionProfile, CompletionRequest, ContentPart, ContextEntry, ImageUrl,
    MessageContent, Role, Turn,
};

/// Base URL of the OpenAI-compatible upstream.
pub const DEFAULT_BASE_URL: &str = "https://api.manus.im/v1";

/// Model requested for every completion.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
