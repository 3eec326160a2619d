//! Multipart form shared by the browser UI and the JSON API.
//!
//! Fields: `resume` (file), `mode` (`general` | `job_match`, optional),
//! `job_description` (text, optional).

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::analysis::analyzer::AnalysisRequest;
use crate::errors::AppError;
use crate::models::analysis::{AnalysisMode, JobDescription, UploadedDocument};

/// What the user submitted, kept raw so the page can echo it back on error.
#[derive(Debug, Default)]
pub struct AnalysisForm {
    pub document: Option<UploadedDocument>,
    pub mode: Option<AnalysisMode>,
    pub job_description: String,
}

impl AnalysisForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AnalysisForm::default();

        while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume" | "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(String::from);
                    let bytes = field.bytes().await.map_err(upload_error)?;
                    // browsers send an empty part when no file was chosen
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    let file_name = if file_name.is_empty() {
                        "resume.pdf".to_string()
                    } else {
                        file_name
                    };
                    form.document = Some(UploadedDocument::new(file_name, content_type, bytes));
                }
                "mode" => {
                    let value = field.text().await.map_err(upload_error)?;
                    if !value.trim().is_empty() {
                        form.mode = Some(AnalysisMode::from_form_value(&value).ok_or_else(|| {
                            AppError::Validation(format!(
                                "Unknown analysis mode '{}': use 'general' or 'job_match'",
                                value.trim()
                            ))
                        })?);
                    }
                }
                "job_description" => {
                    form.job_description = field.text().await.map_err(upload_error)?;
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Mode the user picked, or the one implied by the job description.
    pub fn effective_mode(&self) -> AnalysisMode {
        self.mode
            .unwrap_or_else(|| AnalysisMode::infer(JobDescription::parse(&self.job_description).as_ref()))
    }

    pub fn into_request(self) -> Result<AnalysisRequest, AppError> {
        let mode = self.effective_mode();
        let document = self.document.ok_or_else(|| {
            AppError::Validation("Please upload a resume in PDF format".to_string())
        })?;
        if !document.looks_like_pdf() {
            return Err(AppError::Validation(format!(
                "'{}' is not a PDF. Only PDF resumes are accepted",
                document.file_name
            )));
        }

        let job_description = JobDescription::parse(&self.job_description);
        if mode == AnalysisMode::JobMatch && job_description.is_none() {
            return Err(AppError::Validation(
                "Job match analysis needs a job description. Paste one or switch to general analysis"
                    .to_string(),
            ));
        }

        Ok(AnalysisRequest {
            document,
            mode,
            job_description,
        })
    }
}

fn upload_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation("The uploaded file is too large".to_string())
    } else {
        AppError::Validation(format!("Malformed upload: {}", e.body_text()))
    }
}
