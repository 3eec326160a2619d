use axum::{extract::State, Json};

use crate::diagnostics::{key_status, test_connection, ConnectionCheck, KeyStatus};
use crate::state::AppState;

/// GET /api/v1/diagnostics
pub async fn handle_key_status(State(state): State<AppState>) -> Json<KeyStatus> {
    Json(key_status(&state.config))
}

/// POST /api/v1/diagnostics/test-connection
pub async fn handle_test_connection(State(state): State<AppState>) -> Json<ConnectionCheck> {
    Json(test_connection(state.model.as_ref()).await)
}
