//! Letter composition endpoints. Catalog reads (`letter-categories`,
//! `letter-templates`, `letter-template`) and `generate-letter-pdf` are
//! served from a static in-memory catalog and a `NotFound`-returning PDF
//! stub respectively — both are out of scope for the core engineering.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use amtbrief_core::types::Language;
use amtbrief_core::ApiError;
use amtbrief_letters::templates::{self, LetterTemplate};
use amtbrief_users::Paging;

use crate::app::AppState;
use crate::http::auth::require_user;
use crate::http::error_response::ApiErrorResponse;
use crate::http::keys::build_user_keys;

#[derive(Serialize)]
pub struct TemplateSummary {
    pub category: &'static str,
    pub template_key: &'static str,
    pub required_variables: &'static [&'static str],
}

impl From<&LetterTemplate> for TemplateSummary {
    fn from(t: &LetterTemplate) -> Self {
        Self {
            category: t.category,
            template_key: t.template_key,
            required_variables: t.required_variables,
        }
    }
}

/// GET /api/letter-categories — catalog read, no auth required.
pub async fn letter_categories() -> Json<&'static [&'static str]> {
    Json(templates::CATEGORIES)
}

/// GET /api/letter-templates/{category} — catalog read, no auth required.
pub async fn letter_templates(Path(category): Path<String>) -> Json<Vec<TemplateSummary>> {
    Json(templates::by_category(&category).into_iter().map(TemplateSummary::from).collect())
}

/// GET /api/letter-template/{category}/{key} — catalog read, no auth required.
pub async fn letter_template(
    Path((category, key)): Path<(String, String)>,
) -> Result<Json<TemplateSummary>, ApiErrorResponse> {
    templates::find(&category, &key)
        .map(|t| Json(TemplateSummary::from(t)))
        .ok_or_else(|| ApiError::NotFound(format!("letter template {category}/{key}")).into())
}

#[derive(Deserialize)]
pub struct GenerateLetterTemplateRequest {
    pub category: String,
    pub template_key: String,
    pub variables: HashMap<String, String>,
    pub target_language: String,
}

#[derive(Serialize)]
pub struct ComposedLetterResponse {
    pub subject: String,
    pub body_de: String,
    pub body_translation: Option<String>,
}

/// POST /api/generate-letter-template.
pub async fn generate_letter_template(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<GenerateLetterTemplateRequest>,
) -> Result<Json<ComposedLetterResponse>, ApiErrorResponse> {
    let user = require_user(&state, &headers).await?;
    let target_language =
        Language::from_str(&req.target_language).map_err(|_| ApiError::DecodeFailed)?;
    let user_keys = build_user_keys(&user, &state.config.providers.slot_mapping);

    let composed = amtbrief_letters::compose_from_template(
        &state.router,
        &req.category,
        &req.template_key,
        &req.variables,
        target_language,
        &user_keys,
        &state.system_keys,
    )
    .await
    .map_err(ApiError::from)?;

    Ok(Json(ComposedLetterResponse {
        subject: composed.subject,
        body_de: composed.body_de,
        body_translation: composed.body_translation,
    }))
}

#[derive(Deserialize)]
pub struct GenerateLetterRequest {
    pub prompt: String,
    pub target_language: String,
}

/// POST /api/generate-letter.
pub async fn generate_letter(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<GenerateLetterRequest>,
) -> Result<Json<ComposedLetterResponse>, ApiErrorResponse> {
    let user = require_user(&state, &headers).await?;
    let target_language =
        Language::from_str(&req.target_language).map_err(|_| ApiError::DecodeFailed)?;
    let user_keys = build_user_keys(&user, &state.config.providers.slot_mapping);

    let composed = amtbrief_letters::compose_from_prompt(
        &state.router,
        &req.prompt,
        target_language,
        &user_keys,
        &state.system_keys,
    )
    .await
    .map_err(ApiError::from)?;

    Ok(Json(ComposedLetterResponse {
        subject: composed.subject,
        body_de: composed.body_de,
        body_translation: composed.body_translation,
    }))
}

/// POST /api/improve-letter — reuses the free-form prompt path to lightly
/// polish an arbitrary draft the user already has.
#[derive(Deserialize)]
pub struct ImproveLetterRequest {
    pub body_de: String,
    pub target_language: String,
}

pub async fn improve_letter(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ImproveLetterRequest>,
) -> Result<Json<ComposedLetterResponse>, ApiErrorResponse> {
    let user = require_user(&state, &headers).await?;
    let target_language =
        Language::from_str(&req.target_language).map_err(|_| ApiError::DecodeFailed)?;
    let user_keys = build_user_keys(&user, &state.config.providers.slot_mapping);

    let improve_prompt = format!(
        "Lightly polish the following German business letter for grammar and \
         tone without changing its meaning, facts, or structure. Return only \
         the polished letter body:\n\n{}",
        req.body_de
    );
    let composed = amtbrief_letters::compose_from_prompt(
        &state.router,
        &improve_prompt,
        target_language,
        &user_keys,
        &state.system_keys,
    )
    .await
    .map_err(ApiError::from)?;

    Ok(Json(ComposedLetterResponse {
        subject: composed.subject,
        body_de: composed.body_de,
        body_translation: composed.body_translation,
    }))
}

#[derive(Deserialize)]
pub struct SaveLetterRequest {
    pub recipient_category: String,
    pub template_key: Option<String>,
    pub subject: String,
    pub body_de: String,
    pub body_translation: Option<String>,
    #[serde(default)]
    pub variables_snapshot: serde_json::Value,
}

#[derive(Serialize)]
pub struct SavedLetterResponse {
    pub id: String,
    pub created_at: String,
}

/// POST /api/save-letter — persistence is optional and explicit; the
/// composed letter is only stored when the caller hits this endpoint.
pub async fn save_letter(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SaveLetterRequest>,
) -> Result<Json<SavedLetterResponse>, ApiErrorResponse> {
    let user = require_user(&state, &headers).await?;

    let letter = amtbrief_letters::ComposedLetter {
        subject: req.subject,
        body_de: req.body_de,
        body_translation: req.body_translation,
    };
    let record = amtbrief_letters::save_letter(
        &state.user_store,
        &user.id,
        &req.recipient_category,
        req.template_key.as_deref(),
        &letter,
        req.variables_snapshot,
    )
    .await
    .map_err(ApiError::from)?;

    Ok(Json(SavedLetterResponse {
        id: record.id,
        created_at: record.created_at,
    }))
}

/// POST /api/generate-letter-pdf — PDF rendering is delegated to an
/// external collaborator out of scope for this service; stubbed as a
/// `NotFound`.
pub async fn generate_letter_pdf(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(), ApiErrorResponse> {
    require_user(&state, &headers).await?;
    Err(ApiError::NotFound("letter PDF rendering".to_string()).into())
}

#[derive(Deserialize)]
pub struct PagingQuery {
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
}

/// GET /api/user-letters
pub async fn user_letters(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(paging): Query<PagingQuery>,
) -> Result<Json<Vec<amtbrief_users::LetterRecord>>, ApiErrorResponse> {
    let user = require_user(&state, &headers).await?;
    let letters = state
        .user_store
        .list_letters(
            &user.id,
            Paging {
                offset: paging.offset,
                limit: paging.limit,
            },
        )
        .map_err(ApiError::from)?;
    Ok(Json(letters))
}

#[derive(Deserialize)]
pub struct LetterSearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
}

/// GET /api/letter-search — a simple case-insensitive substring search over
/// the user's own saved letters (subject and body), layered over
/// `list_letters` since the store keeps no separate search index.
pub async fn letter_search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<LetterSearchQuery>,
) -> Result<Json<Vec<amtbrief_users::LetterRecord>>, ApiErrorResponse> {
    let user = require_user(&state, &headers).await?;
    let letters = state
        .user_store
        .list_letters(
            &user.id,
            Paging {
                offset: query.offset,
                limit: query.limit,
            },
        )
        .map_err(ApiError::from)?;

    let needle = query.q.to_ascii_lowercase();
    let filtered = letters
        .into_iter()
        .filter(|l| {
            needle.is_empty()
                || l.subject.to_ascii_lowercase().contains(&needle)
                || l.body_de.to_ascii_lowercase().contains(&needle)
        })
        .collect();

    Ok(Json(filtered))
}
