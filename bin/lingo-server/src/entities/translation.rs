use chrono::{DateTime, Utc};

/// One completed translation kept in a session's history.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRecord {
    pub original: String,
    pub translated: String,
    /// Target language code, e.g. `"ja"`.
    pub language: String,
    pub timestamp: DateTime<Utc>,
}

impl TranslationRecord {
    pub fn new(original: impl Into<String>, translated: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            translated: translated.into(),
            language: language.into(),
            timestamp: Utc::now(),
        }
    }
}
