use askama::Template;

use crate::diagnostics::{ConnectionCheck, ConnectionFailure, KeyStatus};
use crate::errors::AppError;
use crate::models::analysis::AnalysisReport;
use crate::ui::markdown::render_markdown;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub key: KeyView,
    pub connection: Option<ConnectionView>,
    pub job_match: bool,
    pub job_description: String,
    pub result: Option<ResultView>,
    pub error: Option<ErrorView>,
}

/// Sidebar credential panel.
pub struct KeyView {
    pub present: bool,
    pub preview: String,
    pub format_ok: bool,
    pub expected_prefix: &'static str,
}

impl From<KeyStatus> for KeyView {
    fn from(status: KeyStatus) -> Self {
        KeyView {
            present: status.present,
            preview: status.preview.unwrap_or_default(),
            format_ok: status.format_ok.unwrap_or(false),
            expected_prefix: status.expected_prefix,
        }
    }
}

pub struct ConnectionView {
    pub ok: bool,
    pub model_count: usize,
    pub models: Vec<String>,
    pub error: Option<ErrorView>,
}

impl From<ConnectionCheck> for ConnectionView {
    fn from(check: ConnectionCheck) -> Self {
        ConnectionView {
            ok: check.ok,
            model_count: check.model_count,
            models: check.models,
            error: check.failure.map(ErrorView::from),
        }
    }
}

pub struct ResultView {
    pub file_name: String,
    pub mode_label: &'static str,
    pub extraction_label: String,
    pub model: String,
    pub analysis_html: String,
    pub analysis_text: String,
}

impl From<AnalysisReport> for ResultView {
    fn from(report: AnalysisReport) -> Self {
        let extraction_label = extraction_label(&report);
        ResultView {
            file_name: report.file_name,
            mode_label: report.mode.label(),
            extraction_label,
            model: report.model,
            analysis_html: render_markdown(report.analysis.as_str()),
            analysis_text: report.analysis.0,
        }
    }
}

/// e.g. `OCR (scanned document), 2 pages`.
fn extraction_label(report: &AnalysisReport) -> String {
    let label = report.extraction_method.label();
    match report.ocr_pages {
        Some(1) => format!("{label}, 1 page"),
        Some(pages) => format!("{label}, {pages} pages"),
        None => label.to_string(),
    }
}

pub struct ErrorView {
    pub title: String,
    pub message: String,
    pub remediation: Vec<String>,
}

impl From<&AppError> for ErrorView {
    fn from(e: &AppError) -> Self {
        ErrorView {
            title: e.title().to_string(),
            message: e.user_message(),
            remediation: e.remediation().iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<ConnectionFailure> for ErrorView {
    fn from(failure: ConnectionFailure) -> Self {
        ErrorView {
            title: failure.title.to_string(),
            message: failure.message,
            remediation: failure.remediation.iter().map(|s| s.to_string()).collect(),
        }
    }
}
