pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::diagnostics::handlers as diagnostics;
use crate::state::AppState;
use crate::ui::handlers as ui;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Browser UI
        .route("/", get(ui::index))
        .route("/analyze", post(ui::analyze))
        .route("/diagnostics/test", post(ui::diagnostics_test))
        .route("/download", post(ui::download))
        // JSON API
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        .route("/api/v1/diagnostics", get(diagnostics::handle_key_status))
        .route(
            "/api/v1/diagnostics/test-connection",
            post(diagnostics::handle_test_connection),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
