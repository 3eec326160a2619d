mod analysis;
mod config;
mod diagnostics;
mod document;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod ui;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::document::{DocumentLoader, TesseractOcr};
use crate::llm_client::{credential::KEY_PREFIX, GeminiClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    match &config.google_api_key {
        None => warn!("GOOGLE_API_KEY is not set; analyses will fail until it is configured"),
        Some(key) if !key.has_expected_format() => warn!(
            "GOOGLE_API_KEY ({}) does not start with '{KEY_PREFIX}'; it may be incorrect",
            key.masked()
        ),
        Some(key) => info!("Google API key loaded ({})", key.masked()),
    }

    // Initialize LLM client
    let model = Arc::new(GeminiClient::new(config.gemini_settings())?);
    info!(
        "LLM client initialized (model: {}, timeout: {}s, retries: {})",
        config.gemini_model.as_deref().unwrap_or("auto"),
        config.llm_timeout_secs,
        config.llm_max_retries
    );

    // Initialize document loader (text layer first, OCR fallback)
    let ocr = Arc::new(TesseractOcr::new(config.ocr_dpi, config.ocr_lang.clone()));
    let loader = DocumentLoader::new(ocr);
    info!("OCR fallback: tesseract ({}) at {} dpi", config.ocr_lang, config.ocr_dpi);

    // Build app state
    let state = AppState {
        config: config.clone(),
        model,
        loader,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
