//! Login endpoints and the Session Token bearer-auth helper shared by
//! every other handler module.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;

use amtbrief_core::ApiError;
use amtbrief_identity::types::{ChatLoginPayload, GoogleLoginPayload, LoginResponse, PublicUser};
use amtbrief_identity::{google, session, telegram};
use amtbrief_users::User;

use crate::app::AppState;
use crate::http::error_response::ApiErrorResponse;

/// Extracts the bearer token and verifies it as a Session Token, then loads
/// the corresponding user record. Used by every handler that requires auth.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = extract_bearer(headers).ok_or(ApiError::Unauthenticated)?;
    let user_id = session::verify(token, &state.config.auth.session_secret)?;
    state.user_store.get_user(&user_id).map_err(Into::into)
}

pub(crate) fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

pub(crate) fn to_public_user(user: &User) -> PublicUser {
    PublicUser {
        id: user.id.clone(),
        email: user.email.clone(),
        name: user.display_name.clone(),
        oauth_provider: user.oauth_provider.to_string(),
        has_key_slot_1: user.api_key_slot_1.is_some(),
        has_key_slot_2: user.api_key_slot_2.is_some(),
        has_key_slot_3: user.api_key_slot_3.is_some(),
        key_slot_1_preview: user.api_key_slot_1.as_deref().map(amtbrief_core::redact::preview),
        key_slot_2_preview: user.api_key_slot_2.as_deref().map(amtbrief_core::redact::preview),
        key_slot_3_preview: user.api_key_slot_3.as_deref().map(amtbrief_core::redact::preview),
        preferred_language: user.preferred_language.as_str().to_string(),
    }
}

async fn login_response(state: &AppState, identity: &amtbrief_identity::types::NormalizedIdentity) -> Result<LoginResponse, ApiError> {
    let user = state.user_store.upsert_user(identity).await?;
    let access_token = session::mint(&user.id, &state.config.auth.session_secret, state.config.auth.session_ttl_secs)?;
    Ok(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: to_public_user(&user),
    })
}

/// POST /api/auth/google/verify
pub async fn google_verify(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GoogleLoginPayload>,
) -> Result<Json<LoginResponse>, ApiErrorResponse> {
    let identity = google::verify(&payload.credential, state.config.auth.google_client_id.as_deref())
        .await
        .map_err(ApiError::from)?;
    let response = login_response(&state, &identity).await?;
    Ok(Json(response))
}

/// POST /api/auth/telegram/verify
pub async fn telegram_verify(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatLoginPayload>,
) -> Result<Json<LoginResponse>, ApiErrorResponse> {
    let identity = telegram::normalize(&payload, state.config.auth.telegram_bot_secret.as_deref())
        .map_err(ApiError::from)?;
    let response = login_response(&state, &identity).await?;
    Ok(Json(response))
}
