//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::analysis::analyzer::analyze_resume;
use crate::analysis::form::AnalysisForm;
use crate::errors::AppError;
use crate::models::analysis::AnalysisReport;
use crate::state::AppState;

/// POST /api/v1/analyze
///
/// Multipart upload (`resume`, optional `mode`, optional `job_description`).
/// Returns the model's analysis wrapped in an `AnalysisReport`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let request = AnalysisForm::from_multipart(multipart).await?.into_request()?;
    let report = analyze_resume(&state.loader, state.model.as_ref(), request).await?;
    Ok(Json(report))
}
