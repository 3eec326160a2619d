//! Resume analysis: the one pipeline this service runs.
//!
//! Flow: load document, build prompt, generate, report.
//! Each step runs once, in order, inside the request that asked for it.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::analysis::builder::{build_prompt, PromptError};
use crate::document::DocumentLoader;
use crate::errors::AppError;
use crate::llm_client::LanguageModel;
use crate::models::analysis::{
    AnalysisMode, AnalysisReport, AnalysisResult, JobDescription, UploadedDocument,
};

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub document: UploadedDocument,
    pub mode: AnalysisMode,
    pub job_description: Option<JobDescription>,
}

pub async fn analyze_resume(
    loader: &DocumentLoader,
    model: &dyn LanguageModel,
    request: AnalysisRequest,
) -> Result<AnalysisReport, AppError> {
    // Fail before extraction; OCR is the slow part.
    if request.mode == AnalysisMode::JobMatch && request.job_description.is_none() {
        return Err(PromptError::MissingJobDescription.into());
    }

    let analysis_id = Uuid::new_v4();
    info!(
        "Analysis {analysis_id}: '{}' ({} bytes), mode={:?}",
        request.document.file_name,
        request.document.bytes.len(),
        request.mode
    );

    let extracted = loader.load(&request.document).await?;
    let prompt = build_prompt(&extracted, request.mode, request.job_description.as_ref())?;
    let generation = model.generate(prompt.as_str()).await?;

    info!(
        "Analysis {analysis_id} complete: extraction={:?}, model={}, {} chars returned",
        extracted.method,
        generation.model,
        generation.text.len()
    );

    Ok(AnalysisReport {
        analysis_id,
        file_name: request.document.file_name,
        mode: request.mode,
        extraction_method: extracted.method,
        ocr_pages: extracted.ocr_pages,
        resume_chars: extracted.char_count(),
        model: generation.model,
        analysis: AnalysisResult(generation.text),
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::document::fixtures::{text_pdf, FakeOcr};
    use crate::errors::ErrorKind;
    use crate::llm_client::{Generation, LlmError, ModelInfo};
    use crate::models::analysis::ExtractionMethod;

    /// Scripted model: lists skills the job description names but the resume
    /// lacks, and records every prompt it receives.
    pub(crate) struct ScriptedModel {
        pub prompts: Mutex<Vec<String>>,
        pub failure: Option<fn() -> LlmError>,
    }

    impl ScriptedModel {
        pub fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                failure: None,
            }
        }

        pub fn failing(failure: fn() -> LlmError) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                failure: Some(failure),
            }
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    const KNOWN_SKILLS: &[&str] = &["Python", "AWS", "Kubernetes", "Terraform", "Go"];

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, prompt: &str) -> Result<Generation, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(failure) = self.failure {
                return Err(failure());
            }

            let (resume, job) = match prompt.split_once("Job Description:") {
                Some((resume, job)) => (resume, Some(job)),
                None => (prompt, None),
            };
            let resume = resume.rsplit("Resume:").next().unwrap_or_default();

            let present: Vec<&str> = KNOWN_SKILLS
                .iter()
                .copied()
                .filter(|s| resume.contains(s))
                .collect();
            let mut text = format!("## Summary\nSolid profile.\n\n## Skills\n{}", present.join(", "));
            if let Some(job) = job {
                let missing: Vec<&str> = KNOWN_SKILLS
                    .iter()
                    .copied()
                    .filter(|s| job.contains(s) && !resume.contains(s))
                    .collect();
                text.push_str(&format!(
                    "\n\n## Match Score\n70%\n\n## Missing Skills\n{}",
                    missing.join(", ")
                ));
            }

            Ok(Generation {
                text,
                model: "scripted-model".to_string(),
                prompt_tokens: None,
                output_tokens: None,
            })
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
            match self.failure {
                Some(failure) => Err(failure()),
                None => Ok(vec![ModelInfo {
                    name: "models/scripted-model".to_string(),
                    display_name: Some("Scripted".to_string()),
                    supported_generation_methods: vec!["generateContent".to_string()],
                }]),
            }
        }
    }

    fn loader() -> DocumentLoader {
        DocumentLoader::new(Arc::new(FakeOcr::failing()))
    }

    fn pdf_upload(lines: &[&str]) -> UploadedDocument {
        UploadedDocument::new(
            "resume.pdf",
            Some("application/pdf".to_string()),
            Bytes::from(text_pdf(lines)),
        )
    }

    #[tokio::test]
    async fn test_general_analysis_end_to_end() {
        let model = ScriptedModel::new();
        let request = AnalysisRequest {
            document: pdf_upload(&["Experienced software engineer, 5 years Python, AWS"]),
            mode: AnalysisMode::General,
            job_description: None,
        };

        let report = analyze_resume(&loader(), &model, request).await.unwrap();

        assert!(!report.analysis.as_str().trim().is_empty());
        assert!(report.analysis.as_str().contains("Python, AWS"));
        assert_eq!(report.mode, AnalysisMode::General);
        assert_eq!(report.extraction_method, ExtractionMethod::TextLayer);
        assert_eq!(report.model, "scripted-model");
        assert!(report.resume_chars > 0);
    }

    #[tokio::test]
    async fn test_job_match_lists_missing_kubernetes() {
        let model = ScriptedModel::new();
        let request = AnalysisRequest {
            document: pdf_upload(&["Experienced software engineer, 5 years Python, AWS"]),
            mode: AnalysisMode::JobMatch,
            job_description: JobDescription::parse(
                "Platform Engineer. Required: Python, AWS and Kubernetes in production.",
            ),
        };

        let report = analyze_resume(&loader(), &model, request).await.unwrap();

        let missing = report
            .analysis
            .as_str()
            .split("## Missing Skills")
            .nth(1)
            .unwrap();
        assert!(missing.contains("Kubernetes"));
        assert!(!missing.contains("Python"));

        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("Experienced software engineer"));
        assert!(prompt.contains("Kubernetes in production"));
    }

    #[tokio::test]
    async fn test_job_match_without_description_skips_everything() {
        let model = ScriptedModel::new();
        let request = AnalysisRequest {
            document: pdf_upload(&["Anything"]),
            mode: AnalysisMode::JobMatch,
            job_description: None,
        };

        let err = analyze_resume(&loader(), &model, request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(model.last_prompt().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_document_never_reaches_model() {
        let model = ScriptedModel::new();
        let request = AnalysisRequest {
            document: UploadedDocument::new("broken.pdf", None, Bytes::from_static(b"%PDF-broken")),
            mode: AnalysisMode::General,
            job_description: None,
        };

        let err = analyze_resume(&loader(), &model, request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DocumentUnreadable);
        assert!(model.last_prompt().is_none());
    }

    #[tokio::test]
    async fn test_model_errors_keep_their_kind() {
        let model = ScriptedModel::failing(|| LlmError::QuotaExceeded {
            message: "Resource has been exhausted".to_string(),
        });
        let request = AnalysisRequest {
            document: pdf_upload(&["Experienced software engineer"]),
            mode: AnalysisMode::General,
            job_description: None,
        };

        let err = analyze_resume(&loader(), &model, request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
    }
}
