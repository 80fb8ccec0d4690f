use axum::{
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex};

use amtbrief_core::config::AppConfig;
use amtbrief_llm::{Router as LlmRouter, SystemKeys};
use amtbrief_users::UserStore;

/// Central shared state — passed as `Arc<AppState>` to all Axum handlers.
/// There is no WebSocket surface, cross-channel bridging, terminal
/// subsystem, or background scheduler here: this service is
/// request/response only.
pub struct AppState {
    pub config: AppConfig,
    pub user_store: Arc<UserStore>,
    pub router: LlmRouter,
    pub system_keys: SystemKeys,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = rusqlite::Connection::open(&config.database.path)?;
        amtbrief_users::db::init_db(&conn)?;
        let user_store = Arc::new(UserStore::new(Arc::new(Mutex::new(conn))));

        let system_keys = SystemKeys {
            gemini: config.providers.gemini_api_key.clone(),
            openai: config.providers.openai_api_key.clone(),
            anthropic: config.providers.anthropic_api_key.clone(),
        };

        Ok(Self {
            config,
            user_store,
            router: LlmRouter::new(),
            system_keys,
        })
    }
}

/// Assembles the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/google/verify", post(crate::http::auth::google_verify))
        .route("/api/auth/telegram/verify", post(crate::http::auth::telegram_verify))
        .route("/api/profile", get(crate::http::profile::get_profile))
        .route("/api/api-keys", post(crate::http::profile::set_api_keys))
        .route("/api/quick-gemini-setup", post(crate::http::profile::quick_gemini_setup))
        .route(
            "/api/auto-generate-gemini-key",
            post(crate::http::profile::auto_generate_gemini_key),
        )
        .route("/api/analyze-file", post(crate::http::analyze::analyze_file))
        .route("/api/health", get(crate::http::health::health_handler))
        .route("/api/ocr-status", get(crate::http::health::ocr_status))
        .route("/api/modern-llm-status", get(crate::http::health::modern_llm_status))
        .route("/api/letter-categories", get(crate::http::letters::letter_categories))
        .route(
            "/api/letter-templates/{category}",
            get(crate::http::letters::letter_templates),
        )
        .route(
            "/api/letter-template/{category}/{key}",
            get(crate::http::letters::letter_template),
        )
        .route("/api/generate-letter", post(crate::http::letters::generate_letter))
        .route(
            "/api/generate-letter-template",
            post(crate::http::letters::generate_letter_template),
        )
        .route("/api/improve-letter", post(crate::http::letters::improve_letter))
        .route("/api/save-letter", post(crate::http::letters::save_letter))
        .route(
            "/api/generate-letter-pdf",
            post(crate::http::letters::generate_letter_pdf),
        )
        .route("/api/user-letters", get(crate::http::letters::user_letters))
        .route("/api/letter-search", get(crate::http::letters::letter_search))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::compression::CompressionLayer::new())
}
