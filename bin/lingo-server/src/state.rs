//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use lingo_llm::context::ContextBuilder;
use lingo_llm::{Turn, UpstreamClient};

use crate::config::Config;
use crate::entities::{
    CHAT_HISTORY_CAP, HistoryStore, MemoryStore, TRANSLATION_HISTORY_CAP, TranslationRecord,
};

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Resilient client for the completion endpoint.
    pub upstream: UpstreamClient,
    /// Shapes history and input into completion messages.
    pub context: ContextBuilder,
    /// Conversation turns per session.
    pub chat_history: Arc<dyn HistoryStore<Turn>>,
    /// Completed translations per session.
    pub translations: Arc<dyn HistoryStore<TranslationRecord>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("upstream", &self.upstream)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State with in-memory history stores at their default capacities.
    pub fn new(config: Config, upstream: UpstreamClient) -> Self {
        Self {
            config: Arc::new(config),
            upstream,
            context: ContextBuilder::new(),
            chat_history: Arc::new(MemoryStore::new(CHAT_HISTORY_CAP)),
            translations: Arc::new(MemoryStore::new(TRANSLATION_HISTORY_CAP)),
        }
    }
}
