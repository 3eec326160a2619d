//! Prompt builder: fills one of the two fixed templates.

use thiserror::Error;

use crate::analysis::prompts::{GENERAL_ANALYSIS_TEMPLATE, JOB_MATCH_ANALYSIS_TEMPLATE};
use crate::models::analysis::{AnalysisMode, AnalysisPrompt, ExtractedText, JobDescription};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("Resume text is required for analysis")]
    EmptyResume,

    #[error("Job match analysis needs a job description")]
    MissingJobDescription,
}

/// Builds the prompt for `mode`. General mode ignores any job description.
pub fn build_prompt(
    resume: &ExtractedText,
    mode: AnalysisMode,
    job_description: Option<&JobDescription>,
) -> Result<AnalysisPrompt, PromptError> {
    let resume_text = resume.text.trim();
    if resume_text.is_empty() {
        return Err(PromptError::EmptyResume);
    }

    let prompt = match mode {
        AnalysisMode::General => GENERAL_ANALYSIS_TEMPLATE.replace("{resume_text}", resume_text),
        AnalysisMode::JobMatch => {
            let jd = job_description.ok_or(PromptError::MissingJobDescription)?;
            // job description is substituted first so resume text containing the
            // placeholder literal cannot pull it in twice
            JOB_MATCH_ANALYSIS_TEMPLATE
                .replace("{job_description}", jd.as_str())
                .replace("{resume_text}", resume_text)
        }
    };

    Ok(AnalysisPrompt(prompt))
}
