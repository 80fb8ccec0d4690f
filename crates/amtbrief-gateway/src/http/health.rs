//! Observability endpoints: `/api/health`, `/api/ocr-status`,
//! `/api/modern-llm-status`, each reading its own data source instead of
//! one combined payload.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use amtbrief_core::types::ProviderFamily;

use crate::app::AppState;
use crate::http::error_response::ApiErrorResponse;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: String,
    pub users_count: i64,
    pub analyses_count: i64,
    pub telegram_mini_app: bool,
}

/// GET /api/health
pub async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiErrorResponse> {
    let (users_count, analyses_count) = state
        .user_store
        .counts()
        .map_err(amtbrief_core::ApiError::from)?;

    Ok(Json(HealthResponse {
        status: "healthy",
        database: state.config.database.path.clone(),
        users_count,
        analyses_count,
        telegram_mini_app: true,
    }))
}

#[derive(Serialize)]
pub struct OcrMethodEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub available: bool,
}

#[derive(Serialize)]
pub struct OcrStatusResponse {
    pub service_name: &'static str,
    pub primary_method: &'static str,
    pub tesseract_available: bool,
    pub tesseract_version: Option<String>,
    pub optimized_for_speed: bool,
    pub production_ready: bool,
    pub methods: Vec<OcrMethodEntry>,
    pub languages: Vec<&'static str>,
}

/// GET /api/ocr-status
pub async fn ocr_status(State(state): State<Arc<AppState>>) -> Json<OcrStatusResponse> {
    let observability = amtbrief_ocr::observe(&state.config.ocr.binary_path);

    Json(OcrStatusResponse {
        service_name: "amtbrief-ocr",
        primary_method: observability.primary_method,
        tesseract_available: observability.tesseract_available,
        tesseract_version: observability.tesseract_version,
        optimized_for_speed: observability.optimized_for_speed,
        production_ready: observability.tesseract_available,
        methods: vec![
            OcrMethodEntry {
                name: "direct_pdf",
                description: "Direct text-layer extraction for PDFs with an embedded text layer",
                available: true,
            },
            OcrMethodEntry {
                name: "tesseract_ocr",
                description: "Tesseract OCR over a grayscaled, resized raster image",
                available: observability.tesseract_available,
            },
        ],
        languages: observability.languages,
    })
}

#[derive(Serialize)]
pub struct ModernProviderEntry {
    pub name: &'static str,
    pub modern: bool,
    pub model: &'static str,
    pub has_system_key: bool,
}

#[derive(Serialize)]
pub struct ModernLlmStatusResponse {
    pub status: &'static str,
    pub modern: bool,
    pub providers: Vec<ModernProviderEntry>,
}

/// GET /api/modern-llm-status
pub async fn modern_llm_status(State(state): State<Arc<AppState>>) -> Json<ModernLlmStatusResponse> {
    let modern = state.router.modern();

    let providers = [
        (ProviderFamily::GeminiLike, state.system_keys.gemini.is_some()),
        (ProviderFamily::OpenAILike, state.system_keys.openai.is_some()),
        (ProviderFamily::AnthropicLike, state.system_keys.anthropic.is_some()),
    ]
    .into_iter()
    .map(|(family, has_system_key)| ModernProviderEntry {
        name: family.name(),
        modern,
        model: family.default_model(),
        has_system_key,
    })
    .collect();

    Json(ModernLlmStatusResponse {
        status: "ok",
        modern,
        providers,
    })
}
