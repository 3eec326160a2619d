use std::sync::Arc;

use crate::config::Config;
use crate::document::DocumentLoader;
use crate::llm_client::LanguageModel;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable model backend. Default: `GeminiClient`.
    pub model: Arc<dyn LanguageModel>,
    pub loader: DocumentLoader,
}
