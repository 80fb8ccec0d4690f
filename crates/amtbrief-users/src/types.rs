use amtbrief_core::types::{Language, OAuthProvider};
use serde::{Deserialize, Serialize};

/// Full user record. Stored in SQLite; loaded per-request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable, provider-prefixed id (e.g. `telegram_<n>`, `google_<sub>`).
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub picture_url: Option<String>,
    pub oauth_provider: OAuthProvider,
    pub preferred_language: Language,

    /// Opaque, nullable per-slot provider API keys — never logged, never
    /// returned verbatim.
    pub api_key_slot_1: Option<String>,
    pub api_key_slot_2: Option<String>,
    pub api_key_slot_3: Option<String>,

    pub created_at: String,
    pub last_login_at: String,
}

impl User {
    pub fn key_slot(&self, slot: u8) -> Option<&str> {
        match slot {
            1 => self.api_key_slot_1.as_deref(),
            2 => self.api_key_slot_2.as_deref(),
            3 => self.api_key_slot_3.as_deref(),
            _ => None,
        }
    }
}

/// An immutable analysis result, created by the Pipeline Controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub file_type: String,
    pub analysis_language: Language,
    pub llm_provider_used: String,
    pub llm_model_used: String,
    pub extracted_text_length: usize,
    /// The nine named analysis sections, stored as a JSON object.
    pub analysis_sections: serde_json::Value,
    pub created_at: String,
}

/// A saved letter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterRecord {
    pub id: String,
    pub user_id: String,
    pub recipient_category: String,
    pub template_key: Option<String>,
    pub subject: String,
    pub body_de: String,
    pub body_translation: Option<String>,
    pub variables_snapshot: serde_json::Value,
    pub created_at: String,
}

/// An admin-editable UI string; the core treats this as an opaque
/// keyed map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppText {
    pub key: String,
    pub category: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: String,
}

/// Simple offset/limit paging for `list_analyses`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paging {
    pub offset: u32,
    pub limit: u32,
}
