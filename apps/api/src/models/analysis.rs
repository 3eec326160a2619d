use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single uploaded resume. Lives for one request and is dropped after extraction.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    /// True when either the declared content type or the file extension says PDF.
    pub fn looks_like_pdf(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .map(|ct| ct.eq_ignore_ascii_case("application/pdf"))
            .unwrap_or(false);
        let by_name = self.file_name.to_ascii_lowercase().ends_with(".pdf");
        by_type || by_name
    }
}

/// Which path produced the resume text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    TextLayer,
    Ocr,
}

impl ExtractionMethod {
    pub fn label(&self) -> &'static str {
        match self {
            ExtractionMethod::TextLayer => "PDF text layer",
            ExtractionMethod::Ocr => "OCR (scanned document)",
        }
    }
}

/// Raw resume text. Never empty once constructed by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
    /// Number of OCR'd pages; `None` for text-layer extraction.
    pub ocr_pages: Option<usize>,
}

impl ExtractedText {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A job description pasted by the user. Blank input is not a job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct JobDescription(String);

impl JobDescription {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The two supported analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    General,
    JobMatch,
}

impl AnalysisMode {
    /// Parses a form value. Accepts `general`, `job_match` and `job-match`.
    pub fn from_form_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "general" => Some(AnalysisMode::General),
            "job_match" | "job-match" | "jobmatch" => Some(AnalysisMode::JobMatch),
            _ => None,
        }
    }

    /// Mode used when the caller did not pick one: job-match iff a job description exists.
    pub fn infer(job_description: Option<&JobDescription>) -> Self {
        if job_description.is_some() {
            AnalysisMode::JobMatch
        } else {
            AnalysisMode::General
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisMode::General => "General analysis",
            AnalysisMode::JobMatch => "Job match analysis",
        }
    }
}

/// The exact text sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt(pub String);

impl AnalysisPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free text returned by the model, shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnalysisResult(pub String);

impl AnalysisResult {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Envelope returned by the JSON API and used to fill the result page.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub file_name: String,
    pub mode: AnalysisMode,
    pub extraction_method: ExtractionMethod,
    /// Pages run through OCR; absent for text-layer extraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_pages: Option<usize>,
    pub resume_chars: usize,
    pub model: String,
    pub analysis: AnalysisResult,
    pub generated_at: DateTime<Utc>,
}
