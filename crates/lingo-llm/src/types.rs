//! Wire and history types shared by the context builder and the client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── History ──────────────────────────────────────────────────────────────────

/// Author of a stored turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// Older histories call this role `model`.
    #[serde(alias = "model")]
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message of a stored conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    /// Text of the turn; image-only user turns store a placeholder.
    pub content: String,
    /// Set when an image accompanied the turn.
    #[serde(default)]
    pub has_image: bool,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Placeholder stored for a user turn that carried only an image.
    pub const IMAGE_PLACEHOLDER: &'static str = "[Image shared]";

    pub fn user(content: impl Into<String>, has_image: bool) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            has_image,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            has_image: false,
            timestamp: Utc::now(),
        }
    }
}

/// A caller-supplied context line for translation prompts.
///
/// Roles are free-form; anything other than `"user"` renders as the assistant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

// ── Chat completion wire format ──────────────────────────────────────────────

/// `image_url` payload of a content part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// One element of a multi-part message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Message body: a plain string or an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single message in an outgoing completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: role.as_str().to_owned(),
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn parts(role: Role, parts: Vec<ContentPart>) -> Self {
        Self {
            role: role.as_str().to_owned(),
            content: MessageContent::Parts(parts),
        }
    }
}

/// Request body for `POST {base}/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

/// Sampling parameters and per-attempt timeout for one kind of call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionProfile {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub timeout: Duration,
}

impl CompletionProfile {
    /// Conversational replies.
    pub const fn chat() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            top_p: 0.95,
            timeout: Duration::from_secs(60),
        }
    }

    /// Lower temperature keeps translations consistent.
    pub const fn translation() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1024,
            top_p: 0.95,
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_role_deserializes_as_assistant() {
        let turn: Turn = serde_json::from_value(json!({
            "role": "model",
            "content": "hi",
            "timestamp": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert!(!turn.has_image);
    }

    #[test]
    fn parts_serialize_in_openai_shape() {
        let msg = ChatMessage::parts(
            Role::User,
            vec![
                ContentPart::Text { text: "look".into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: "data:image/jpeg;base64,AA==".into() },
                },
            ],
        );
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": "look" },
                    { "type": "image_url", "image_url": { "url": "data:image/jpeg;base64,AA==" } }
                ]
            })
        );
    }

    #[test]
    fn text_content_serializes_as_plain_string() {
        let msg = ChatMessage::text(Role::Assistant, "hello");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "role": "assistant", "content": "hello" })
        );
    }

    #[test]
    fn profiles_match_call_kinds() {
        let chat = CompletionProfile::chat();
        assert_eq!(chat.max_tokens, 2048);
        assert_eq!(chat.timeout, Duration::from_secs(60));

        let translation = CompletionProfile::translation();
        assert_eq!(translation.max_tokens, 1024);
        assert_eq!(translation.timeout, Duration::from_secs(30));
        assert!(translation.temperature < chat.temperature);
    }
}
