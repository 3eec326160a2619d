//! Document loader: turns an uploaded PDF into resume text.
//!
//! Text layer first (pdf-extract). When that yields nothing, the PDF is handed
//! to the OCR engine and per-page output is joined in page order.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use crate::document::ocr::OcrEngine;
use crate::models::analysis::{ExtractedText, ExtractionMethod, UploadedDocument};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Could not read any text from '{file_name}': {reason}")]
    Unreadable { file_name: String, reason: String },
}

#[derive(Clone)]
pub struct DocumentLoader {
    ocr: Arc<dyn OcrEngine>,
}

impl DocumentLoader {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    pub async fn load(&self, document: &UploadedDocument) -> Result<ExtractedText, DocumentError> {
        let unreadable = |reason: String| DocumentError::Unreadable {
            file_name: document.file_name.clone(),
            reason,
        };

        if document.bytes.is_empty() {
            return Err(unreadable("the uploaded file is empty".to_string()));
        }

        let text_layer_failure = match extract_text_layer(document.bytes.clone()).await {
            Ok(text) if !text.trim().is_empty() => {
                info!(
                    "Extracted {} chars from text layer of '{}'",
                    text.len(),
                    document.file_name
                );
                return Ok(ExtractedText {
                    text: text.trim().to_string(),
                    method: ExtractionMethod::TextLayer,
                    ocr_pages: None,
                });
            }
            Ok(_) => "no text layer".to_string(),
            Err(e) => {
                warn!("Direct text extraction failed for '{}': {e}", document.file_name);
                e
            }
        };

        info!("Falling back to OCR for '{}'", document.file_name);
        let pages = self.ocr.recognize_pages(&document.bytes).await.map_err(|e| {
            warn!("OCR failed for '{}': {e}", document.file_name);
            unreadable(format!("{text_layer_failure}; OCR failed: {e}"))
        })?;

        let page_count = pages.len();
        let text = join_pages(&pages);
        if text.is_empty() {
            return Err(unreadable(format!(
                "{text_layer_failure}; OCR found no legible text on {page_count} page(s)"
            )));
        }

        info!(
            "OCR recovered {} chars from {page_count} page(s) of '{}'",
            text.len(),
            document.file_name
        );
        Ok(ExtractedText {
            text,
            method: ExtractionMethod::Ocr,
            ocr_pages: Some(page_count),
        })
    }
}

/// Runs pdf-extract on the blocking pool. A panic inside the parser comes back
/// as a join error and is reported like any other parse failure.
async fn extract_text_layer(bytes: Bytes) -> Result<String, String> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| format!("PDF parser aborted: {e}"))?
        .map_err(|e| format!("PDF parser error: {e}"))
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| p.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
