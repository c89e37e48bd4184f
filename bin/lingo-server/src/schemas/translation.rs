use std::collections::BTreeMap;

use lingo_llm::{ContextEntry, Language};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::TranslationRecord;

fn default_target_language() -> String {
    Language::English.code().to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: String,
    /// Language code from `/api/translation/languages`.
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Recent conversation used to disambiguate the text.
    #[serde(default)]
    pub conversation_context: Vec<ConversationContextEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ConversationContextEntry {
    /// `user` or `assistant`; anything else renders as the assistant.
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl From<ConversationContextEntry> for ContextEntry {
    fn from(entry: ConversationContextEntry) -> Self {
        ContextEntry {
            role: entry.role,
            content: entry.content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranslateResponse {
    pub success: bool,
    pub original_text: String,
    /// Empty when `success` is false.
    pub translated_text: String,
    pub target_language: String,
    pub language_name: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LanguagesResponse {
    pub success: bool,
    /// Code to display name.
    pub languages: BTreeMap<String, String>,
}

impl LanguagesResponse {
    pub fn supported() -> Self {
        Self {
            success: true,
            languages: Language::all()
                .map(|l| (l.code().to_owned(), l.name().to_owned()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranslationEntry {
    pub original: String,
    pub translated: String,
    pub language: String,
    pub timestamp: String,
}

impl TranslationRecord {
    pub fn to_response(&self) -> TranslationEntry {
        TranslationEntry {
            original: self.original.clone(),
            translated: self.translated.clone(),
            language: self.language.clone(),
            timestamp: self.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<TranslationEntry>,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranslationHealthResponse {
    pub status: String,
    pub service: String,
    pub supported_languages: usize,
}
