//! Browser routes. Every handler re-renders the single page; failures show up
//! inside it instead of as a JSON envelope.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Form,
};
use askama::Template;
use serde::Deserialize;
use tracing::warn;

use crate::analysis::analyzer::analyze_resume;
use crate::analysis::form::AnalysisForm;
use crate::diagnostics::{key_status, test_connection};
use crate::errors::AppError;
use crate::models::analysis::AnalysisMode;
use crate::state::AppState;
use crate::ui::templates::{ConnectionView, ErrorView, IndexPage, KeyView, ResultView};

pub const DOWNLOAD_FILE_NAME: &str = "resume_analysis.txt";

fn blank_page(state: &AppState) -> IndexPage {
    IndexPage {
        key: KeyView::from(key_status(&state.config)),
        connection: None,
        job_match: false,
        job_description: String::new(),
        result: None,
        error: None,
    }
}

fn render(status: StatusCode, page: IndexPage) -> Result<(StatusCode, Html<String>), AppError> {
    Ok((status, Html(page.render()?)))
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Result<(StatusCode, Html<String>), AppError> {
    render(StatusCode::OK, blank_page(&state))
}

/// POST /analyze
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Html<String>), AppError> {
    let mut page = blank_page(&state);

    let form = match AnalysisForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => return render_failure(page, e),
    };
    page.job_match = form.effective_mode() == AnalysisMode::JobMatch;
    page.job_description = form.job_description.clone();

    let outcome = match form.into_request() {
        Ok(request) => analyze_resume(&state.loader, state.model.as_ref(), request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => {
            page.result = Some(ResultView::from(report));
            render(StatusCode::OK, page)
        }
        Err(e) => render_failure(page, e),
    }
}

fn render_failure(mut page: IndexPage, e: AppError) -> Result<(StatusCode, Html<String>), AppError> {
    let status = e.status();
    if status.is_server_error() {
        tracing::error!("Analysis failed: {e}");
    } else {
        warn!("Analysis rejected: {e}");
    }
    page.error = Some(ErrorView::from(&e));
    render(status, page)
}

/// POST /diagnostics/test
pub async fn diagnostics_test(
    State(state): State<AppState>,
) -> Result<(StatusCode, Html<String>), AppError> {
    let check = test_connection(state.model.as_ref()).await;
    let mut page = blank_page(&state);
    page.connection = Some(ConnectionView::from(check));
    render(StatusCode::OK, page)
}

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    pub analysis: String,
}

/// Plain-text export of a finished analysis.
pub fn download_body(analysis: &str) -> String {
    format!("Resume Analysis Results\n{}\n\n{}", "=".repeat(50), analysis)
}

/// POST /download
pub async fn download(Form(form): Form<DownloadForm>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
            ),
        ],
        download_body(&form.analysis),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_body_has_header_and_rule() {
        let body = download_body("## Summary\nSolid.");
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some("Resume Analysis Results"));
        assert_eq!(lines.next(), Some("=".repeat(50).as_str()));
        assert_eq!(lines.next(), Some(""));
        assert!(body.ends_with("## Summary\nSolid."));
    }
}
