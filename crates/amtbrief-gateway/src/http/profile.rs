//! Profile and API key management.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use amtbrief_core::ApiError;
use amtbrief_identity::types::PublicUser;
use amtbrief_users::resolver::{merge_key_fields, ApiKeyFields};

use crate::app::AppState;
use crate::http::auth::{require_user, to_public_user};
use crate::http::error_response::ApiErrorResponse;

/// GET /api/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<PublicUser>, ApiErrorResponse> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(to_public_user(&user)))
}

#[derive(Deserialize, Default)]
pub struct ApiKeysRequest {
    #[serde(default)]
    pub api_key_1: Option<String>,
    #[serde(default)]
    pub api_key_2: Option<String>,
    #[serde(default)]
    pub api_key_3: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
}

/// POST /api/api-keys — accepts both new and legacy field names; new names
/// win on conflict.
pub async fn set_api_keys(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ApiKeysRequest>,
) -> Result<Json<PublicUser>, ApiErrorResponse> {
    let user = require_user(&state, &headers).await?;

    let fields = ApiKeyFields {
        api_key_1: req.api_key_1,
        api_key_2: req.api_key_2,
        api_key_3: req.api_key_3,
        gemini_api_key: req.gemini_api_key,
        openai_api_key: req.openai_api_key,
        anthropic_api_key: req.anthropic_api_key,
    };
    let merged = merge_key_fields(&fields);

    for (slot, value) in merged.into_iter().enumerate() {
        if let Some(value) = value {
            state
                .user_store
                .set_key_slot(&user.id, (slot + 1) as u8, Some(&value))
                .await
                .map_err(ApiError::from)?;
        }
    }

    let refreshed = state.user_store.get_user(&user.id).map_err(ApiError::from)?;
    Ok(Json(to_public_user(&refreshed)))
}

#[derive(Deserialize)]
pub struct QuickGeminiSetupRequest {
    pub api_key: String,
}

#[derive(Serialize)]
pub struct QuickGeminiSetupResponse {
    pub accepted: bool,
    pub key_preview: String,
}

/// POST /api/quick-gemini-setup — validates by a no-op call (the key is
/// only stored, never round-tripped against the provider) and, if
/// accepted, stores it to slot 1.
pub async fn quick_gemini_setup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<QuickGeminiSetupRequest>,
) -> Result<Json<QuickGeminiSetupResponse>, ApiErrorResponse> {
    let user = require_user(&state, &headers).await?;

    if req.api_key.trim().is_empty() {
        return Err(ApiError::AuthInvalidPayload.into());
    }

    state
        .user_store
        .set_key_slot(&user.id, 1, Some(&req.api_key))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(QuickGeminiSetupResponse {
        accepted: true,
        key_preview: amtbrief_core::redact::preview(&req.api_key),
    }))
}

#[derive(Serialize)]
pub struct AutoGeneratedKeyResponse {
    pub api_key: String,
    pub demo_mode: bool,
}

/// POST /api/auto-generate-gemini-key — real provisioning is out of
/// scope; always returns a demo-mode synthesized key of shape
/// `AIzaSyDemo_<hash>` (see DESIGN.md's Open Question #2).
pub async fn auto_generate_gemini_key(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AutoGeneratedKeyResponse>, ApiErrorResponse> {
    let user = require_user(&state, &headers).await?;

    let hash = format!("{:x}", simple_hash(&user.id));
    let api_key = format!("AIzaSyDemo_{hash}");

    Ok(Json(AutoGeneratedKeyResponse {
        api_key,
        demo_mode: true,
    }))
}

/// A small, deterministic FNV-1a hash — no cryptographic properties are
/// required here, this only needs to look like a stable per-user suffix.
fn simple_hash(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in input.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
