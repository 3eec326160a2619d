// Document loading: PDF text layer with an OCR fallback for scanned resumes.

pub mod loader;
pub mod ocr;

#[cfg(test)]
pub mod fixtures;

pub use loader::{DocumentError, DocumentLoader};
pub use ocr::{OcrEngine, TesseractOcr};
