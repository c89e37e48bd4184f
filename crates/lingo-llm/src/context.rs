//! Shapes stored history and the current input into completion messages.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::language::Language;
use crate::types::{ChatMessage, ContentPart, ContextEntry, ImageUrl, Role, Turn};

/// Prior turns forwarded with each chat request.
pub const CHAT_HISTORY_WINDOW: usize = 10;

/// Caller-supplied context lines quoted in a translation prompt.
pub const TRANSLATION_CONTEXT_WINDOW: usize = 3;

/// Builds message lists for the chat and translation paths.
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    history_window: usize,
    translation_window: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            history_window: CHAT_HISTORY_WINDOW,
            translation_window: TRANSLATION_CONTEXT_WINDOW,
        }
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages for a chat turn: the tail of `history` followed by the new
    /// user input.
    ///
    /// Blank text counts as absent. With neither text nor image the result is
    /// empty and the caller must not contact the upstream.
    pub fn chat(&self, history: &[Turn], text: Option<&str>, image: Option<&[u8]>) -> Vec<ChatMessage> {
        let text = text.map(str::trim).filter(|t| !t.is_empty());

        let mut parts = Vec::with_capacity(2);
        if let Some(text) = text {
            parts.push(ContentPart::Text { text: text.to_owned() });
        }
        if let Some(image) = image.filter(|bytes| !bytes.is_empty()) {
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl { url: jpeg_data_uri(image) },
            });
        }
        if parts.is_empty() {
            return Vec::new();
        }

        let skip = history.len().saturating_sub(self.history_window);
        let mut messages: Vec<ChatMessage> = history[skip..]
            .iter()
            .map(|turn| ChatMessage::text(turn.role, turn.content.clone()))
            .collect();
        messages.push(ChatMessage::parts(Role::User, parts));
        messages
    }

    /// A single user message carrying the translation instructions.
    pub fn translation(&self, text: &str, language: Language, context: &[ContextEntry]) -> Vec<ChatMessage> {
        vec![ChatMessage::text(Role::User, self.translation_prompt(text, language, context))]
    }

    /// The instruction prompt sent for a translation.
    pub fn translation_prompt(&self, text: &str, language: Language, context: &[ContextEntry]) -> String {
        let language_name = language.name();

        let mut context_text = String::new();
        if !context.is_empty() {
            context_text.push_str("\n\nRecent conversation context for reference:\n");
            let skip = context.len().saturating_sub(self.translation_window);
            for (i, entry) in context[skip..].iter().enumerate() {
                let role = if entry.role == "user" { "User" } else { "AI Assistant" };
                context_text.push_str(&format!("{}. {}: {}\n", i + 1, role, entry.content));
            }
        }

        format!(
            "You are a professional translator. Please translate the following text to {language_name}.\n\
             \n\
             IMPORTANT INSTRUCTIONS:\n\
             1. Consider the conversation context provided below to ensure accurate and contextually appropriate translation\n\
             2. Maintain the tone and style of the original text\n\
             3. If the text contains technical terms or proper nouns, keep them appropriately\n\
             4. Provide ONLY the translated text without any explanations or additional comments\n\
             5. If the text is already in {language_name}, return it as-is\n\
             \n\
             Text to translate: \"{text}\"{context_text}\n\
             \n\
             Translation:"
        )
    }
}

fn jpeg_data_uri(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(bytes))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::MessageContent;

    fn history(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("q{i}"), false)
                } else {
                    Turn::assistant(format!("a{i}"))
                }
            })
            .collect()
    }

    fn last_parts(messages: &[ChatMessage]) -> &[ContentPart] {
        match &messages.last().expect("at least one message").content {
            MessageContent::Parts(parts) => parts,
            MessageContent::Text(_) => panic!("current turn should be multi-part"),
        }
    }

    #[test]
    fn text_only_yields_single_text_part() {
        let messages = ContextBuilder::new().chat(&[], Some("hello"), None);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert_eq!(last_parts(&messages), &[ContentPart::Text { text: "hello".into() }]);
    }

    #[test]
    fn image_only_yields_single_jpeg_part() {
        let messages = ContextBuilder::new().chat(&[], None, Some(&[0xffu8, 0xd8, 0xff][..]));
        let parts = last_parts(&messages);
        assert_eq!(parts.len(), 1);
        match &parts[0] {
            ContentPart::ImageUrl { image_url } => {
                assert_eq!(image_url.url, "data:image/jpeg;base64,/9j/");
            }
            other => panic!("unexpected part {other:?}"),
        }
    }

    #[test]
    fn text_and_image_keep_text_first() {
        let messages = ContextBuilder::new().chat(&[], Some("what is this?"), Some(&b"img"[..]));
        let parts = last_parts(&messages);
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], ContentPart::Text { .. }));
        assert!(matches!(parts[1], ContentPart::ImageUrl { .. }));
    }

    #[test]
    fn no_input_is_a_no_op_even_with_history() {
        let builder = ContextBuilder::new();
        assert!(builder.chat(&history(4), None, None).is_empty());
        assert!(builder.chat(&history(4), Some("   "), None).is_empty());
        assert!(builder.chat(&[], None, Some(&[][..])).is_empty());
    }

    #[test]
    fn only_the_last_ten_turns_are_forwarded() {
        let turns = history(14);
        let messages = ContextBuilder::new().chat(&turns, Some("next"), None);
        assert_eq!(messages.len(), CHAT_HISTORY_WINDOW + 1);
        assert_eq!(messages[0].content, MessageContent::Text("q4".into()));
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[9].content, MessageContent::Text("a13".into()));
    }

    #[test]
    fn translation_prompt_names_language_without_context() {
        let prompt = ContextBuilder::new().translation_prompt("good morning", Language::Japanese, &[]);
        assert!(prompt.starts_with(
            "You are a professional translator. Please translate the following text to Japanese."
        ));
        assert!(prompt.contains("5. If the text is already in Japanese, return it as-is"));
        assert!(prompt.ends_with("Text to translate: \"good morning\"\n\nTranslation:"));
        assert!(!prompt.contains("Recent conversation context"));
    }

    #[test]
    fn translation_prompt_quotes_last_three_context_entries() {
        let context: Vec<ContextEntry> = ["one", "two", "three", "four"]
            .iter()
            .enumerate()
            .map(|(i, c)| ContextEntry {
                role: if i % 2 == 0 { "user".into() } else { "model".into() },
                content: (*c).into(),
            })
            .collect();

        let prompt = ContextBuilder::new().translation_prompt("bank", Language::French, &context);
        assert!(prompt.contains(
            "Text to translate: \"bank\"\n\nRecent conversation context for reference:\n\
             1. AI Assistant: two\n2. User: three\n3. AI Assistant: four\n\n\nTranslation:"
        ));
        assert!(!prompt.contains(": one"));
    }

    #[test]
    fn translation_wraps_prompt_in_one_user_message() {
        let messages = ContextBuilder::new().translation("hola", Language::English, &[]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert!(matches!(messages[0].content, MessageContent::Text(_)));
    }
}
