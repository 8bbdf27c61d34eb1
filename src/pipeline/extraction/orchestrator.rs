//! Chunk extraction orchestrator: document bytes in, ordered chunks out.
//!
//! Routes by detected format, flattens to a single text stream, then
//! delegates segmentation to the clause chunker. Trait-based DI for the
//! PDF and OCR engines keeps the orchestrator testable with mocks.

use super::chunker::{Chunk, ClauseChunker};
use super::docx::extract_docx_text;
use super::format::{detect_format, DocumentKind, MAX_DOCUMENT_BYTES};
use super::types::{Document, OcrEngine, PdfExtractor};
use super::ExtractionError;

pub struct ChunkExtractor {
    ocr: Box<dyn OcrEngine>,
    pdf: Box<dyn PdfExtractor>,
    chunker: ClauseChunker,
}

impl ChunkExtractor {
    pub fn new(ocr: Box<dyn OcrEngine>, pdf: Box<dyn PdfExtractor>) -> Self {
        Self {
            ocr,
            pdf,
            chunker: ClauseChunker::new(),
        }
    }

    pub fn with_chunker(mut self, chunker: ClauseChunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Production wiring: pdf-extract text layers, no OCR capability.
    pub fn with_defaults() -> Self {
        Self::new(
            Box::new(super::ocr::NullOcrEngine),
            Box::new(super::pdf::PdfTextExtractor),
        )
    }

    /// Extract an ordered chunk sequence from one document.
    ///
    /// Fails with `UnsupportedFormat` when the payload is not one of the
    /// supported media types, and with an extraction failure when the
    /// payload cannot be parsed or yields no text.
    pub fn extract(&self, document: &Document) -> Result<Vec<Chunk>, ExtractionError> {
        if document.bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(ExtractionError::DocumentTooLarge {
                size_bytes: document.bytes.len(),
            });
        }
        if document.bytes.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let detection = detect_format(&document.bytes, document.declared_type.as_deref());
        tracing::debug!(
            file_name = %document.file_name,
            kind = detection.kind.as_str(),
            size_bytes = document.bytes.len(),
            "Extraction: format detected"
        );

        let text = match detection.kind {
            DocumentKind::DigitalPdf => {
                let pages = self.pdf.extract_pages(&document.bytes)?;
                pages.join("\n\n")
            }
            DocumentKind::ScannedPdf | DocumentKind::Image => {
                self.ocr.recognize(&document.bytes)?
            }
            DocumentKind::Docx => extract_docx_text(&document.bytes)?,
            DocumentKind::PlainText => String::from_utf8_lossy(&document.bytes).into_owned(),
            DocumentKind::Unsupported => {
                return Err(ExtractionError::UnsupportedFormat(detection.mime_type))
            }
        };

        let text = text.replace("\r\n", "\n");
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        tracing::info!(
            file_name = %document.file_name,
            chunks = chunks.len(),
            "Extraction complete"
        );
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::ocr::MockOcrEngine;

    struct FailingPdf;

    impl PdfExtractor for FailingPdf {
        fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
            Err(ExtractionError::PdfParsing("damaged xref table".into()))
        }
    }

    struct FixedPdf(Vec<String>);

    impl PdfExtractor for FixedPdf {
        fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    fn pdf_header(rest: &str) -> Vec<u8> {
        format!("%PDF-1.4 BT /F1 12 Tf (x) Tj ET {rest}").into_bytes()
    }

    #[test]
    fn plain_text_document_yields_ordered_chunks() {
        let extractor = ChunkExtractor::with_defaults();
        let doc = Document::new(
            "contract.txt",
            Some("text/plain".into()),
            b"1. Term. This agreement runs for twelve months from the effective date stated above.\n\n2. Fees. All invoices are payable within thirty days of the invoice date without setoff.".to_vec(),
        );

        let chunks = extractor.extract(&doc).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id, 0);
        assert_eq!(chunks[1].id, 1);
        assert!(chunks[0].text.starts_with("1. Term"));
    }

    #[test]
    fn digital_pdf_pages_are_joined_in_order() {
        let pages = vec![
            "First page clause text with enough length to survive the merge threshold in the chunker.".to_string(),
            "Second page clause text, also long enough to stand alone as an independent chunk here.".to_string(),
        ];
        let extractor = ChunkExtractor::new(Box::new(MockOcrEngine::new("")), Box::new(FixedPdf(pages)));
        let doc = Document::new("scan.pdf", None, pdf_header("body"));

        let chunks = extractor.extract(&doc).unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.contains("First page"));
        assert!(chunks[1].text.contains("Second page"));
    }

    #[test]
    fn corrupt_pdf_surfaces_parsing_error() {
        let extractor =
            ChunkExtractor::new(Box::new(MockOcrEngine::new("")), Box::new(FailingPdf));
        let doc = Document::new("broken.pdf", None, pdf_header("body"));

        let result = extractor.extract(&doc);
        assert!(matches!(result, Err(ExtractionError::PdfParsing(_))));
    }

    #[test]
    fn image_goes_through_ocr_engine() {
        let transcript = "Handwritten side letter: the supplier accepts unlimited liability for all indirect damages.";
        let extractor = ChunkExtractor::new(
            Box::new(MockOcrEngine::new(transcript)),
            Box::new(FailingPdf),
        );
        let doc = Document::new(
            "photo.png",
            Some("image/png".into()),
            vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        );

        let chunks = extractor.extract(&doc).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("unlimited liability"));
    }

    #[test]
    fn image_without_ocr_engine_fails_clearly() {
        let extractor = ChunkExtractor::with_defaults();
        let doc = Document::new(
            "photo.jpg",
            Some("image/jpeg".into()),
            vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
        );

        let result = extractor.extract(&doc);
        assert!(matches!(result, Err(ExtractionError::OcrUnavailable)));
    }

    #[test]
    fn unsupported_payload_rejected() {
        let extractor = ChunkExtractor::with_defaults();
        let doc = Document::new(
            "program.exe",
            None,
            vec![0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00, 0x00, 0x01],
        );

        let result = extractor.extract(&doc);
        assert!(matches!(result, Err(ExtractionError::UnsupportedFormat(_))));
    }

    #[test]
    fn oversized_document_rejected_before_parsing() {
        let extractor = ChunkExtractor::with_defaults();
        let doc = Document::new(
            "huge.txt",
            Some("text/plain".into()),
            vec![b'a'; MAX_DOCUMENT_BYTES + 1],
        );

        let result = extractor.extract(&doc);
        assert!(matches!(
            result,
            Err(ExtractionError::DocumentTooLarge { .. })
        ));
    }

    #[test]
    fn empty_payload_rejected() {
        let extractor = ChunkExtractor::with_defaults();
        let doc = Document::new("empty.txt", Some("text/plain".into()), Vec::new());
        assert!(matches!(
            extractor.extract(&doc),
            Err(ExtractionError::EmptyDocument)
        ));
    }

    #[test]
    fn whitespace_only_extraction_rejected() {
        let extractor = ChunkExtractor::new(
            Box::new(MockOcrEngine::new("   \n\n  ")),
            Box::new(FailingPdf),
        );
        let doc = Document::new(
            "blank.png",
            None,
            vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        );

        assert!(matches!(
            extractor.extract(&doc),
            Err(ExtractionError::EmptyDocument)
        ));
    }
}
