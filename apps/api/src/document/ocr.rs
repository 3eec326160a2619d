//! OCR fallback for scanned resumes.
//!
//! `TesseractOcr` rasterizes the PDF with `pdftoppm` (poppler-utils) and runs
//! `tesseract` on each page image. Both binaries must be on `PATH`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("{tool} is not available: {source}")]
    ToolUnavailable {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: &'static str, stderr: String },

    #[error("rasterizer produced no page images")]
    NoPages,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recognizes text in a PDF by looking at its pixels.
/// Returns one string per page, in page order.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize_pages(&self, pdf: &[u8]) -> Result<Vec<String>, OcrError>;
}

pub struct TesseractOcr {
    dpi: u32,
    lang: String,
}

impl TesseractOcr {
    pub fn new(dpi: u32, lang: impl Into<String>) -> Self {
        Self {
            dpi,
            lang: lang.into(),
        }
    }

    async fn rasterize(&self, pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
        let output = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf_path)
            .arg(out_dir.join("page"))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| OcrError::ToolUnavailable {
                tool: "pdftoppm",
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::ToolFailed {
                tool: "pdftoppm",
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut images = Vec::new();
        let mut dir = tokio::fs::read_dir(out_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|ext| ext == "png").unwrap_or(false) {
                images.push(path);
            }
        }
        // pdftoppm zero-pads page numbers, so lexical order is page order.
        images.sort();

        if images.is_empty() {
            return Err(OcrError::NoPages);
        }
        Ok(images)
    }

    async fn recognize_image(&self, image: &Path) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| OcrError::ToolUnavailable {
                tool: "tesseract",
                source,
            })?;

        if !output.status.success() {
            // tesseract reports warnings on stderr and still prints what it read
            warn!(
                "tesseract exited with {} on {}: {}",
                output.status,
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize_pages(&self, pdf: &[u8]) -> Result<Vec<String>, OcrError> {
        let workdir = tempfile::tempdir()?;
        let pdf_path = workdir.path().join("resume.pdf");
        tokio::fs::write(&pdf_path, pdf).await?;

        let images = self.rasterize(&pdf_path, workdir.path()).await?;
        info!(
            "Rendered {} page(s) at {} dpi, running OCR (lang={})",
            images.len(),
            self.dpi,
            self.lang
        );

        let mut pages = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let text = self.recognize_image(image).await?;
            debug!("OCR page {}: {} chars", i + 1, text.len());
            pages.push(text);
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::blank_pdf;
    use crate::document::DocumentLoader;
    use crate::models::analysis::UploadedDocument;

    /// These tests drive the real binaries and return early where they are not installed.
    fn has_tool(tool: &str, version_flag: &str) -> bool {
        let found = std::process::Command::new(tool)
            .arg(version_flag)
            .output()
            .is_ok();
        if !found {
            eprintln!("skipping: {tool} is not installed");
        }
        found
    }

    #[tokio::test]
    async fn test_blank_pages_rasterize_in_order_with_no_text() {
        if !has_tool("pdftoppm", "-v") || !has_tool("tesseract", "--version") {
            return;
        }
        let ocr = TesseractOcr::new(72, "eng");
        let pages = ocr.recognize_pages(&blank_pdf(3)).await.unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.trim().is_empty()));
    }

    #[tokio::test]
    async fn test_non_pdf_bytes_fail_in_rasterizer() {
        if !has_tool("pdftoppm", "-v") {
            return;
        }
        let ocr = TesseractOcr::new(72, "eng");
        let err = ocr.recognize_pages(b"this is not a pdf").await.unwrap_err();
        assert!(matches!(err, OcrError::ToolFailed { tool: "pdftoppm", .. }));
    }

    #[tokio::test]
    async fn test_blank_scan_through_real_ocr_is_unreadable() {
        if !has_tool("pdftoppm", "-v") || !has_tool("tesseract", "--version") {
            return;
        }
        let loader = DocumentLoader::new(std::sync::Arc::new(TesseractOcr::new(72, "eng")));
        let document = UploadedDocument::new(
            "scan.pdf",
            Some("application/pdf".to_string()),
            bytes::Bytes::from(blank_pdf(1)),
        );
        let err = loader.load(&document).await.unwrap_err();
        assert!(err.to_string().contains("no legible text on 1 page(s)"));
    }}
