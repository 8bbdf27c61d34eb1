use super::types::OcrEngine;
use super::ExtractionError;

/// Production default when no OCR capability is wired in: scanned input
/// fails with a clear reason instead of silently yielding empty text.
pub struct NullOcrEngine;

impl OcrEngine for NullOcrEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
        Err(ExtractionError::OcrUnavailable)
    }
}

/// Mock OCR engine for testing — returns a configurable transcript.
pub struct MockOcrEngine {
    text: String,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }
}
