//! The Pipeline Controller's document-analysis endpoint:
//! `POST /api/analyze-file`. Orchestrates auth, OCR, the Analysis
//! Formatter, and persistence under the request's latency budget.

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use amtbrief_core::types::Language;
use amtbrief_core::ApiError;
use amtbrief_llm::ImagePart;

use crate::app::AppState;
use crate::http::auth::require_user;
use crate::http::error_response::ApiErrorResponse;
use crate::http::keys::build_user_keys;

/// Hard end-to-end budget: a timeout past this returns `AnalysisTimeout`
/// and nothing is persisted.
const END_TO_END_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
pub struct AnalyzeFileResponse {
    pub analysis: serde_json::Value,
    pub llm_provider: &'static str,
    pub llm_model: String,
    pub analysis_language: &'static str,
    pub extracted_text_length: usize,
    pub file_name: String,
    pub file_type: String,
}

/// POST /api/analyze-file — multipart `file` + `language`.
pub async fn analyze_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<AnalyzeFileResponse>, ApiErrorResponse> {
    // Step 1: verify session.
    let user = require_user(&state, &headers).await?;

    match tokio::time::timeout(END_TO_END_TIMEOUT, run_pipeline(&state, &user, multipart)).await {
        Ok(result) => Ok(Json(result?)),
        Err(_) => Err(ApiError::AnalysisTimeout.into()),
    }
}

async fn run_pipeline(
    state: &AppState,
    user: &amtbrief_users::User,
    mut multipart: Multipart,
) -> Result<AnalyzeFileResponse, ApiErrorResponse> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name = String::new();
    let mut mime = String::new();
    let mut language_raw = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::DecodeFailed)?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                file_name = field.file_name().unwrap_or("upload").to_string();
                mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|_| ApiError::DecodeFailed)?;
                file_bytes = Some(bytes.to_vec());
            }
            "language" => {
                language_raw = field.text().await.map_err(|_| ApiError::DecodeFailed)?;
            }
            _ => {}
        }
    }

    let file_bytes = file_bytes.ok_or(ApiError::DecodeFailed)?;

    // Step 2: reject oversize or unsupported MIME.
    if file_bytes.len() > state.config.upload.max_bytes {
        return Err(ApiError::InputTooLarge.into());
    }
    let language = Language::from_str(language_raw.trim()).map_err(|_| ApiError::DecodeFailed)?;

    // Step 3: OCR extract.
    let extraction = amtbrief_ocr::extract(
        &file_bytes,
        &mime,
        state.config.upload.max_bytes,
        &state.config.ocr.binary_path,
        &state.config.ocr.languages,
    )
    .await
    .map_err(ApiError::from)?;

    // Empty-extraction policy: only attach the raw image when OCR yielded
    // nothing and the upload is actually an image.
    let image = if extraction.text.trim().is_empty() && is_image_mime(&mime) {
        Some(ImagePart {
            mime: mime.clone(),
            bytes: file_bytes.clone(),
        })
    } else {
        None
    };

    // Step 4: format + LLM call.
    let user_keys = build_user_keys(user, &state.config.providers.slot_mapping);
    let outcome = amtbrief_analysis::analyze(
        &state.router,
        &extraction.text,
        image,
        language,
        &user_keys,
        &state.system_keys,
    )
    .await
    .map_err(ApiError::from)?;

    // Step 5: persist the AnalysisRecord.
    let record = amtbrief_users::AnalysisRecord {
        id: String::new(),
        user_id: user.id.clone(),
        file_name: file_name.clone(),
        file_type: mime.clone(),
        analysis_language: language,
        llm_provider_used: outcome.provider_used.name().to_string(),
        llm_model_used: outcome.model_used.clone(),
        extracted_text_length: outcome.extracted_text_length,
        analysis_sections: outcome.sections.to_json(),
        created_at: amtbrief_core::types::now_rfc3339(),
    };
    state
        .user_store
        .append_analysis(record)
        .await
        .map_err(ApiError::from)?;

    // Step 6: response.
    let mut analysis_json = outcome.sections.to_json();
    if let Some(obj) = analysis_json.as_object_mut() {
        obj.insert("full_text".to_string(), serde_json::Value::String(outcome.full_text));
    }

    Ok(AnalyzeFileResponse {
        analysis: analysis_json,
        llm_provider: outcome.provider_used.name(),
        llm_model: outcome.model_used,
        analysis_language: language.as_str(),
        extracted_text_length: outcome.extracted_text_length,
        file_name,
        file_type: mime,
    })
}

fn is_image_mime(mime: &str) -> bool {
    mime.to_ascii_lowercase().starts_with("image/")
}
