use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable, provider-prefixed user id (e.g. `telegram_123`, `google_abc`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Generates a new UUIDv7 — time-sortable, used for every record's primary key.
pub fn new_record_id() -> String {
    Uuid::now_v7().to_string()
}

/// Current time as an RFC3339 string — used for every `created_at`/`updated_at`.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Target/preferred analysis and letter language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
    De,
    Uk,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::De => "de",
            Language::Uk => "uk",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            "de" => Ok(Language::De),
            "uk" => Ok(Language::Uk),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

/// Which identity provider authenticated a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthProvider {
    GoogleLike,
    ChatLike,
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OAuthProvider::GoogleLike => write!(f, "google"),
            OAuthProvider::ChatLike => write!(f, "telegram"),
        }
    }
}

/// The three native LLM provider families the Router dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    GeminiLike,
    OpenAILike,
    AnthropicLike,
}

impl ProviderFamily {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderFamily::GeminiLike => "gemini",
            ProviderFamily::OpenAILike => "openai",
            ProviderFamily::AnthropicLike => "anthropic",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderFamily::GeminiLike => "gemini-2.0-flash",
            ProviderFamily::OpenAILike => "gpt-4o",
            ProviderFamily::AnthropicLike => "claude-3-5-sonnet",
        }
    }

    /// All three families support image parts at their default model.
    pub fn supports_vision(&self) -> bool {
        true
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
