pub mod chunker;
pub mod docx;
pub mod format;
pub mod ocr;
pub mod orchestrator;
pub mod pdf;
pub mod types;

pub use chunker::*;
pub use format::*;
pub use ocr::*;
pub use orchestrator::*;
pub use pdf::*;
pub use types::*;

use thiserror::Error;

/// Terminal extraction failures. Nothing downstream runs after one of
/// these; the caller surfaces a single human-readable reason.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document exceeds the {max_mb} MB limit", max_mb = format::MAX_DOCUMENT_BYTES / (1024 * 1024))]
    DocumentTooLarge { size_bytes: usize },

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Word document parsing failed: {0}")]
    DocxParsing(String),

    #[error("Scanned input requires text recognition, which is not available")]
    OcrUnavailable,

    #[error("Text recognition failed: {0}")]
    OcrProcessing(String),

    #[error("No readable text found in the document")]
    EmptyDocument,
}
