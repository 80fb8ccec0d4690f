use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amtbrief_gateway=info,tower_http=debug".into()),
        )
        .init();

    info!(git_sha = env!("AMTBRIEF_GIT_SHA"), "starting amtbrief-gateway");

    // load config: explicit path > AMTBRIEF_CONFIG env > ~/.amtbrief/amtbrief.toml
    let config_path = std::env::var("AMTBRIEF_CONFIG").ok();
    let config = match amtbrief_core::config::AppConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            // No sensible zero-value default here — `session_secret` has no
            // safe fallback — so a bad config is a fatal startup error.
            error!("config load failed ({e}), refusing to start with an insecure default");
            std::process::exit(1);
        }
    };

    if !amtbrief_ocr::observe(&config.ocr.binary_path).tesseract_available {
        warn!(
            binary = config.ocr.binary_path,
            "OCR binary not found on PATH; only direct-text-layer PDFs will be analyzable"
        );
    }

    let bind = config.server.bind.clone();
    let port = config.server.port;
    let max_upload = config.upload.max_bytes;

    let state = match app::AppState::new(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("failed to initialize application state ({e})");
            std::process::exit(1);
        }
    };

    let router = app::build_router(state)
        .layer(tower_http::limit::RequestBodyLimitLayer::new(max_upload));

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("Amtbrief gateway listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
