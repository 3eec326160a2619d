//! LLM client: the single point of entry for all Gemini API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Generative Language API directly.
//! Handlers and the analysis pipeline depend on the `LanguageModel` trait, which
//! `GeminiClient` implements.
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod credential;

pub use credential::ApiKey;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Tried in order when no model is configured.
pub const PREFERRED_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-1.5-flash",
    "gemini-pro",
];
const GENERATE_METHOD: &str = "generateContent";
const MODEL_LIST_PAGE_SIZE: u32 = 1000;
/// Backoff stops doubling after 2^6 seconds.
const MAX_BACKOFF_EXPONENT: u32 = 6;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Why the credential was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailure {
    MissingKey,
    InvalidKey,
    PermissionDenied,
    BillingDisabled,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Auth {
        failure: AuthFailure,
        message: String,
    },

    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Model returned no usable text: {0}")]
    EmptyResponse(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl LlmError {
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Transient(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Transient(format!("request timed out: {e}"))
        } else {
            LlmError::Transient(e.to_string())
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, or why there is none.
    fn into_text(self) -> Result<String, LlmError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(LlmError::EmptyResponse(format!("prompt was blocked ({reason})")));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse("response contained no candidates".into()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".into());
            return Err(LlmError::EmptyResponse(format!(
                "candidate had no text (finish reason {reason})"
            )));
        }
        Ok(text.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// One entry from the model list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Model id without the `models/` resource prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    pub fn supports_generation(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_METHOD)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

/// Text returned by a successful generation call.
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub model: String,
    pub prompt_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────────────────────────────────────

/// A hosted text model. Carried in `AppState` as `Arc<dyn LanguageModel>`.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// One generation call for a complete prompt.
    async fn generate(&self, prompt: &str) -> Result<Generation, LlmError>;

    /// Lists models visible to the credential. Used as the connection check.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub model: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<ApiKey>,
    base_url: String,
    model: Option<String>,
    max_retries: u32,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model,
            max_retries: settings.max_retries,
        })
    }

    fn key(&self) -> Result<&ApiKey, LlmError> {
        self.api_key.as_ref().ok_or_else(|| LlmError::Auth {
            failure: AuthFailure::MissingKey,
            message: "GOOGLE_API_KEY is not set".to_string(),
        })
    }

    async fn fetch_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let key = self.key()?;
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .query(&[("pageSize", MODEL_LIST_PAGE_SIZE)])
            .header("x-goog-api-key", key.expose())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_api_error(status.as_u16(), &body));
        }

        let listed: ListModelsResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::EmptyResponse(format!("malformed model list: {e}")))?;
        Ok(listed.models)
    }

    /// The configured model, else the best model the credential can see,
    /// else the first preferred name.
    async fn resolve_model(&self) -> String {
        if let Some(model) = &self.model {
            return model.clone();
        }
        match self.fetch_models().await {
            Ok(models) => select_model(&models).unwrap_or_else(|| PREFERRED_MODELS[0].to_string()),
            Err(e) => {
                debug!("Model listing failed, using default model: {e}");
                PREFERRED_MODELS[0].to_string()
            }
        }
    }

    /// Calls generateContent, retrying transient failures up to `max_retries`
    /// times with exponential backoff (1s, 2s, 4s, ...).
    async fn generate_content(&self, model: &str, prompt: &str) -> Result<Generation, LlmError> {
        let mut attempt = 0;
        loop {
            match self.generate_once(model, prompt).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = backoff_delay(attempt);
                    attempt += 1;
                    warn!(
                        "Gemini call attempt {attempt} failed ({e}), retrying after {}ms...",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn generate_once(&self, model: &str, prompt: &str) -> Result<Generation, LlmError> {
        let key = self.key()?;
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!("{}/models/{model}:{GENERATE_METHOD}", self.base_url))
            .header("x-goog-api-key", key.expose())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("Gemini API returned {status}");
            return Err(classify_api_error(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::EmptyResponse(format!("malformed response body: {e}")))?;

        let (prompt_tokens, output_tokens) = parsed
            .usage_metadata
            .as_ref()
            .map(|u| (u.prompt_token_count, u.candidates_token_count))
            .unwrap_or((None, None));

        let text = parsed.into_text()?;
        debug!(
            "Gemini call succeeded: model={model}, prompt_tokens={prompt_tokens:?}, output_tokens={output_tokens:?}"
        );

        Ok(Generation {
            text,
            model: model.to_string(),
            prompt_tokens,
            output_tokens,
        })
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Generation, LlmError> {
        self.key()?;
        let model = self.resolve_model().await;
        info!("Sending {} char prompt to {model}", prompt.len());
        self.generate_content(&model, prompt).await
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        self.fetch_models().await
    }
}

/// 1s, 2s, 4s, ... capped at 64s however many retries are configured.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(MAX_BACKOFF_EXPONENT))
}

/// Picks the first preferred model that supports generation, falling back to
/// the first listed model that does.
pub fn select_model(models: &[ModelInfo]) -> Option<String> {
    let generative: Vec<&ModelInfo> = models.iter().filter(|m| m.supports_generation()).collect();

    PREFERRED_MODELS
        .iter()
        .find(|preferred| generative.iter().any(|m| m.short_name() == **preferred))
        .map(|preferred| preferred.to_string())
        .or_else(|| generative.first().map(|m| m.short_name().to_string()))
}

/// Maps a non-success reply to the error kind the user needs to act on.
pub fn classify_api_error(status: u16, body: &str) -> LlmError {
    let (message, signals) = match serde_json::from_str::<GoogleErrorEnvelope>(body) {
        Ok(envelope) => {
            let mut signals = vec![envelope.error.message.clone()];
            signals.extend(envelope.error.status);
            signals.extend(
                envelope
                    .error
                    .details
                    .iter()
                    .filter_map(|d| d.get("reason").and_then(|r| r.as_str()))
                    .map(String::from),
            );
            (envelope.error.message, signals.join(" ").to_lowercase())
        }
        Err(_) => (body.trim().to_string(), body.to_lowercase()),
    };

    let mentions = |needles: &[&str]| needles.iter().any(|n| signals.contains(n));

    if status == 401 || mentions(&["api key not valid", "api_key_invalid", "invalid api key"]) {
        LlmError::Auth {
            failure: AuthFailure::InvalidKey,
            message,
        }
    } else if status == 429 || mentions(&["resource_exhausted", "quota", "rate limit"]) {
        LlmError::QuotaExceeded { message }
    } else if mentions(&["billing"]) {
        LlmError::Auth {
            failure: AuthFailure::BillingDisabled,
            message,
        }
    } else if status == 403 || mentions(&["permission_denied", "permission denied"]) {
        LlmError::Auth {
            failure: AuthFailure::PermissionDenied,
            message,
        }
    } else if status == 408 || status >= 500 {
        LlmError::Transient(format!("status {status}: {message}"))
    } else {
        LlmError::Api { status, message }
    }
}
