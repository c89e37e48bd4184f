//! Server configuration, loaded from environment variables at startup.

use anyhow::{Context, bail};
use lingo_llm::RetryPolicy;

/// Runtime configuration for lingo-server.
///
/// Everything except the upstream API key has a default, so only
/// `OPENAI_API_KEY` must be set to start the server.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:5000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS allow-list; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,

    /// Bearer token for the upstream completion API.
    pub api_key: String,

    /// OpenAI-compatible API root; the client appends `/chat/completions`.
    pub upstream_base_url: String,

    /// Model requested from the upstream.
    pub model: String,

    /// Attempts and backoff unit for upstream calls.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("enable_docs", &self.enable_docs)
            .field("api_key", &"<redacted>")
            .field("upstream_base_url", &self.upstream_base_url)
            .field("model", &self.model)
            .field("retry", &self.retry)
            .finish()
    }
}

impl Config {
    /// Build [`Config`] from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("OPENAI_API_KEY must be set to reach the completion API")?;

        let enable_docs = parse_flag(lookup("LINGO_ENABLE_DOCS"), true);
        let bind_address = env_or(&lookup, "LINGO_BIND", "0.0.0.0:5000");
        if bind_address.parse::<std::net::SocketAddr>().is_err() {
            bail!("LINGO_BIND='{bind_address}' is not a socket address");
        }

        Ok(Self {
            bind_address,
            log_level: env_or(&lookup, "LINGO_LOG", "info"),
            log_json: parse_flag(lookup("LINGO_LOG_JSON"), false),
            cors_allowed_origins: lookup("LINGO_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            enable_docs,
            api_key,
            upstream_base_url: lingo_llm::DEFAULT_BASE_URL.to_owned(),
            model: lingo_llm::DEFAULT_MODEL.to_owned(),
            retry: RetryPolicy::default(),
        })
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_owned())
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
