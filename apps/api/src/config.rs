use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{ApiKey, GeminiSettings, DEFAULT_API_BASE};

/// Application configuration loaded from environment variables (and `.env`).
///
/// Only malformed values fail startup. A missing `GOOGLE_API_KEY` is allowed:
/// analyses then fail with an auth error the UI can explain.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: Option<ApiKey>,
    pub gemini_model: Option<String>,
    pub gemini_api_base: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub ocr_dpi: u32,
    pub ocr_lang: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Config {
            google_api_key: lookup("GOOGLE_API_KEY").as_deref().and_then(ApiKey::parse),
            gemini_model: non_blank("GEMINI_MODEL"),
            gemini_api_base: non_blank("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            llm_timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?,
            llm_max_retries: parse_or(&lookup, "LLM_MAX_RETRIES", 0)?,
            ocr_dpi: parse_or(&lookup, "OCR_DPI", 300)?,
            ocr_lang: non_blank("OCR_LANG").unwrap_or_else(|| "eng".to_string()),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: non_blank("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            api_key: self.google_api_key.clone(),
            base_url: self.gemini_api_base.clone(),
            model: self.gemini_model.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
            max_retries: self.llm_max_retries,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
