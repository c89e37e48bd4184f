//! HTTP middleware stack.
//!
//! - [`trace`]: per-request span with an `x-trace-id`, body and latency logging.
//! - [`cors`]: CORS layer built from the configured allow-list.
//! - [`session`]: resolves or mints the caller's session id.

pub mod cors;
pub mod session;
pub mod trace;

pub use session::SessionId;
