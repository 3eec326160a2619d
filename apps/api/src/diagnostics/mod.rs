//! API diagnostics: credential status and a connection check that lists models.
//! Independent of any resume content.

pub mod handlers;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::{AppError, ErrorKind};
use crate::llm_client::{credential::KEY_PREFIX, LanguageModel};

/// How many model names the connection check reports.
const MODEL_PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct KeyStatus {
    pub present: bool,
    /// Masked preview, e.g. `AIza...wxyz`.
    pub preview: Option<String>,
    /// Whether the key starts with the expected prefix. `None` when absent.
    pub format_ok: Option<bool>,
    pub expected_prefix: &'static str,
    pub configured_model: Option<String>,
}

pub fn key_status(config: &Config) -> KeyStatus {
    let key = config.google_api_key.as_ref();
    KeyStatus {
        present: key.is_some(),
        preview: key.map(|k| k.masked()),
        format_ok: key.map(|k| k.has_expected_format()),
        expected_prefix: KEY_PREFIX,
        configured_model: config.gemini_model.clone(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionFailure {
    pub kind: ErrorKind,
    pub code: &'static str,
    pub title: &'static str,
    pub message: String,
    pub remediation: Vec<&'static str>,
}

impl From<&AppError> for ConnectionFailure {
    fn from(e: &AppError) -> Self {
        let kind = e.kind();
        ConnectionFailure {
            kind,
            code: kind.code(),
            title: e.title(),
            message: e.user_message(),
            remediation: e.remediation().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionCheck {
    pub ok: bool,
    pub model_count: usize,
    /// Up to ten model ids, without the `models/` prefix.
    pub models: Vec<String>,
    pub failure: Option<ConnectionFailure>,
}

/// Lists models with the configured credential. Never fails: the outcome,
/// good or bad, is the report.
pub async fn test_connection(model: &dyn LanguageModel) -> ConnectionCheck {
    match model.list_models().await {
        Ok(models) => {
            info!("Connection check succeeded: {} model(s) available", models.len());
            ConnectionCheck {
                ok: true,
                model_count: models.len(),
                models: models
                    .iter()
                    .take(MODEL_PREVIEW_LIMIT)
                    .map(|m| m.short_name().to_string())
                    .collect(),
                failure: None,
            }
        }
        Err(e) => {
            warn!("Connection check failed: {e}");
            let err = AppError::from(e);
            ConnectionCheck {
                ok: false,
                model_count: 0,
                models: Vec::new(),
                failure: Some(ConnectionFailure::from(&err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::tests::ScriptedModel;
    use crate::llm_client::{ApiKey, AuthFailure, LlmError};

    fn config_with_key(key: Option<&str>) -> Config {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.google_api_key = key.and_then(ApiKey::parse);
        config
    }

    #[test]
    fn test_key_status_absent() {
        let status = key_status(&config_with_key(None));
        assert!(!status.present);
        assert!(status.preview.is_none());
        assert!(status.format_ok.is_none());
    }

    #[test]
    fn test_key_status_masks_and_checks_format() {
        let status = key_status(&config_with_key(Some("AIzaSyExample1234")));
        assert!(status.present);
        assert_eq!(status.preview.as_deref(), Some("AIza...1234"));
        assert_eq!(status.format_ok, Some(true));

        let odd = key_status(&config_with_key(Some("sk-1234567890abcd")));
        assert_eq!(odd.format_ok, Some(false));
    }

    #[tokio::test]
    async fn test_connection_ok_lists_models() {
        let check = test_connection(&ScriptedModel::new()).await;
        assert!(check.ok);
        assert_eq!(check.model_count, 1);
        assert_eq!(check.models, vec!["scripted-model".to_string()]);
        assert!(check.failure.is_none());
    }

    #[tokio::test]
    async fn test_connection_reports_auth_failure() {
        let model = ScriptedModel::failing(|| LlmError::Auth {
            failure: AuthFailure::InvalidKey,
            message: "API key not valid".to_string(),
        });
        let check = test_connection(&model).await;

        assert!(!check.ok);
        let failure = check.failure.unwrap();
        assert_eq!(failure.kind, ErrorKind::AuthError);
        assert!(!failure.remediation.is_empty());
    }
}
