use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness only. Does not call the model or check the OCR tools.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-analyzer"
    }))
}
