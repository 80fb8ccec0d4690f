use amtbrief_core::types::OAuthProvider;
use serde::{Deserialize, Serialize};

/// The uniform record produced by either identity provider.
///
/// Both `google.rs` and `telegram.rs` converge on this shape before handing
/// off to the User & Key Store's `upsert_user`.
#[derive(Debug, Clone)]
pub struct NormalizedIdentity {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub picture_url: Option<String>,
    pub oauth_provider: OAuthProvider,
    pub preferred_language_hint: Option<String>,
}

/// The three accepted ChatLike payload shapes, modeled as an explicit
/// tagged variant rather than accepting "whatever comes".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChatLoginPayload {
    Nested {
        #[serde(alias = "telegram_user")]
        user: RawChatUser,
    },
    InitData {
        #[serde(rename = "initData")]
        init_data: String,
    },
    Flat(RawChatUser),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawChatUser {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleLoginPayload {
    pub credential: String,
}

/// Response shape shared by both login endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub oauth_provider: String,
    pub has_key_slot_1: bool,
    pub has_key_slot_2: bool,
    pub has_key_slot_3: bool,
    pub key_slot_1_preview: Option<String>,
    pub key_slot_2_preview: Option<String>,
    pub key_slot_3_preview: Option<String>,
    pub preferred_language: String,
}
