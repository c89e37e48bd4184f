//! Target languages accepted by the translation route.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// A supported translation target, displayed as its ISO 639-1 code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
pub enum Language {
    #[strum(serialize = "en")]
    English,
    #[strum(serialize = "ja")]
    Japanese,
    #[strum(serialize = "es")]
    Spanish,
    #[strum(serialize = "zh")]
    Chinese,
    #[strum(serialize = "fr")]
    French,
    #[strum(serialize = "it")]
    Italian,
    #[strum(serialize = "ko")]
    Korean,
    #[strum(serialize = "ar")]
    Arabic,
    #[strum(serialize = "hi")]
    Hindi,
    #[strum(serialize = "ru")]
    Russian,
    #[strum(serialize = "id")]
    Indonesian,
    #[strum(serialize = "pt")]
    Portuguese,
}

impl Language {
    /// Look up a language by code. Codes are case-sensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        code.parse().ok()
    }

    pub fn code(self) -> &'static str {
        self.into()
    }

    /// English display name used inside prompts and responses.
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Japanese => "Japanese",
            Language::Spanish => "Spanish",
            Language::Chinese => "Chinese",
            Language::French => "French",
            Language::Italian => "Italian",
            Language::Korean => "Korean",
            Language::Arabic => "Arabic",
            Language::Hindi => "Hindi",
            Language::Russian => "Russian",
            Language::Indonesian => "Indonesian",
            Language::Portuguese => "Portuguese",
        }
    }

    pub fn all() -> impl Iterator<Item = Language> {
        Language::iter()
    }
}
