use super::ExtractionError;

/// One uploaded document: opaque payload plus the media type the client
/// declared. Lives only for the duration of one analysis request and is
/// never persisted.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(
        file_name: impl Into<String>,
        declared_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            declared_type,
            bytes,
        }
    }
}

/// PDF text-layer extraction abstraction
pub trait PdfExtractor: Send + Sync {
    /// Extract the text of each page, in page order.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Text-recognition abstraction for scanned input (allows mocking in tests;
/// production wiring may leave it unconfigured).
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;
}
