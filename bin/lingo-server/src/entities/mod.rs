//! Per-session history storage.
//!
//! Handlers only see [`HistoryStore`], so the in-memory [`MemoryStore`] can be
//! replaced by a persistent backend without touching the upstream client or
//! the context builder.

pub mod memory;
pub mod translation;

pub use memory::MemoryStore;
pub use translation::TranslationRecord;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ServerError;

/// Turns kept per chat session.
pub const CHAT_HISTORY_CAP: usize = 20;

/// Translations kept per session.
pub const TRANSLATION_HISTORY_CAP: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A writer panicked while holding the session lock.
    #[error("session store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        ServerError::Internal(e.to_string())
    }
}

/// Bounded, ordered entries (oldest first) keyed by session id.
///
/// Implementations enforce their own capacity and evict the oldest entries
/// first. Each call is atomic with respect to other calls on the same key.
#[async_trait]
pub trait HistoryStore<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Entries for `session_id`; empty when the session is unknown.
    async fn get(&self, session_id: &str) -> Result<Vec<T>, StoreError>;

    /// Replace the entries of `session_id`, keeping only the newest that fit.
    async fn put(&self, session_id: &str, entries: Vec<T>) -> Result<(), StoreError>;

    /// Append `entries` in order and return the resulting length.
    async fn append(&self, session_id: &str, entries: Vec<T>) -> Result<usize, StoreError>;

    /// Drop every entry of `session_id`.
    async fn clear(&self, session_id: &str) -> Result<(), StoreError>;

    /// Number of sessions that have stored anything.
    async fn session_count(&self) -> Result<usize, StoreError>;
}
