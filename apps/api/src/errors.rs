use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::analysis::builder::PromptError;
use crate::document::DocumentError;
use crate::llm_client::{AuthFailure, LlmError};

/// Application-level error type.
/// Implements `IntoResponse` so JSON handlers can return `Result<T, AppError>`;
/// the browser UI renders the same kind, title and remediation inline.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PromptError> for AppError {
    fn from(e: PromptError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// What the user is told went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    DocumentUnreadable,
    AuthError,
    QuotaExceeded,
    TransientError,
    EmptyResponse,
    Upstream,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::DocumentUnreadable => "DOCUMENT_UNREADABLE",
            ErrorKind::AuthError => "AUTH_ERROR",
            ErrorKind::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorKind::TransientError => "TRANSIENT_ERROR",
            ErrorKind::EmptyResponse => "EMPTY_RESPONSE",
            ErrorKind::Upstream => "UPSTREAM_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Document(_) => ErrorKind::DocumentUnreadable,
            AppError::Llm(LlmError::Auth { .. }) => ErrorKind::AuthError,
            AppError::Llm(LlmError::QuotaExceeded { .. }) => ErrorKind::QuotaExceeded,
            AppError::Llm(LlmError::Transient(_)) => ErrorKind::TransientError,
            AppError::Llm(LlmError::EmptyResponse(_)) => ErrorKind::EmptyResponse,
            AppError::Llm(LlmError::Api { .. }) => ErrorKind::Upstream,
            AppError::Template(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Document(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Llm(LlmError::Auth {
                failure: AuthFailure::MissingKey,
                ..
            }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Llm(LlmError::QuotaExceeded { .. }) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Llm(LlmError::Transient(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Template(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short heading shown above the message.
    pub fn title(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Invalid request",
            AppError::Document(_) => "Could not read the resume",
            AppError::Llm(LlmError::Auth { failure, .. }) => match failure {
                AuthFailure::MissingKey => "No API key configured",
                AuthFailure::InvalidKey => "API key is invalid or incorrect",
                AuthFailure::PermissionDenied => "Permission denied: the API key may be restricted",
                AuthFailure::BillingDisabled => "Billing is not enabled",
            },
            AppError::Llm(LlmError::QuotaExceeded { .. }) => "Quota exceeded: API usage limit reached",
            AppError::Llm(LlmError::Transient(_)) => "Could not reach the AI service",
            AppError::Llm(LlmError::EmptyResponse(_)) => "The AI service returned no analysis",
            AppError::Llm(LlmError::Api { .. }) => "The AI service rejected the request",
            AppError::Template(_) | AppError::Internal(_) => "Something went wrong",
        }
    }

    /// Message safe to show to the user. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Template(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Steps the user can take to fix the problem.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            AppError::Validation(_) => &[],
            AppError::Document(_) => &[
                "Make sure the file is a valid PDF and is not password-protected",
                "For scanned resumes, make sure the scan is legible",
                "Try exporting the resume to PDF again from your editor",
            ],
            AppError::Llm(LlmError::Auth { failure, .. }) => match failure {
                AuthFailure::MissingKey => &[
                    "Create a .env file in the project root directory",
                    "Add the line GOOGLE_API_KEY=your_actual_api_key_here (no quotes, no spaces around =)",
                    "Restart the application",
                    "Get an API key from https://makersuite.google.com/app/apikey",
                ],
                AuthFailure::InvalidKey => &[
                    "Check that .env contains GOOGLE_API_KEY=your_key (no quotes, no spaces)",
                    "Verify the key at https://makersuite.google.com/app/apikey",
                    "Make sure the key has not been revoked or regenerated",
                    "Restart the application after changing the key",
                ],
                AuthFailure::PermissionDenied => &[
                    "Enable the Generative Language API in Google Cloud Console",
                    "Remove API key restrictions temporarily (APIs & Services > Credentials)",
                    "Or add 'Generative Language API' to the allowed APIs for this key",
                ],
                AuthFailure::BillingDisabled => &[
                    "Enable billing for your Google Cloud project: https://console.cloud.google.com/billing",
                    "Restart the analysis once billing is linked",
                ],
            },
            AppError::Llm(LlmError::QuotaExceeded { .. }) => &[
                "Wait a few minutes and retry: free-tier limits reset over time",
                "Check your quota: https://console.cloud.google.com/apis/api/generativelanguage.googleapis.com/quotas",
                "Enable billing to raise limits: https://console.cloud.google.com/billing",
                "Request a quota increase, or use a key from a different project",
            ],
            AppError::Llm(LlmError::Transient(_)) => &[
                "Check your network connection",
                "Retry the analysis in a moment",
            ],
            AppError::Llm(LlmError::EmptyResponse(_)) => &[
                "Retry the analysis",
                "If it keeps happening, try a shorter or cleaner version of the resume",
            ],
            AppError::Llm(LlmError::Api { .. }) => &[
                "Check that GEMINI_MODEL names a model available to your key",
                "Use Test API Connection in the sidebar to list available models",
            ],
            AppError::Template(_) | AppError::Internal(_) => &["Retry the request"],
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Template(e) => tracing::error!("Template error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            AppError::Llm(e) => tracing::warn!("LLM error: {e}"),
            AppError::Document(e) => tracing::warn!("{e}"),
            AppError::Validation(_) => {}
        }

        let kind = self.kind();
        let body = Json(json!({
            "error": {
                "code": kind.code(),
                "kind": kind,
                "title": self.title(),
                "message": self.user_message(),
                "remediation": self.remediation(),
            }
        }));

        (self.status(), body).into_response()
    }
}
