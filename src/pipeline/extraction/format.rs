//! Media-type detection for uploaded documents.
//!
//! Magic bytes decide, not file extensions or the declared content type —
//! the declared type only breaks the tie for zip-based containers, which
//! share the same leading bytes.

use serde::{Deserialize, Serialize};

/// Documents above this size are rejected before any parsing.
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Broad document categories the extractor handles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DocumentKind {
    /// PDF with an extractable text layer.
    DigitalPdf,
    /// PDF without a text layer; needs OCR.
    ScannedPdf,
    /// Word-processor document (zip container).
    Docx,
    Image,
    PlainText,
    Unsupported,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DigitalPdf => "digital_pdf",
            Self::ScannedPdf => "scanned_pdf",
            Self::Docx => "docx",
            Self::Image => "image",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn needs_ocr(&self) -> bool {
        matches!(self, Self::ScannedPdf | Self::Image)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Result of format detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDetection {
    pub mime_type: String,
    pub kind: DocumentKind,
}

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Detect the document format from payload bytes and the declared media type.
pub fn detect_format(bytes: &[u8], declared_type: Option<&str>) -> FormatDetection {
    let header: &[u8] = if bytes.len() >= 8 { &bytes[..8] } else { bytes };

    let (mime_type, kind) = match header {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => {
            let kind = if pdf_has_text_layer(bytes) {
                DocumentKind::DigitalPdf
            } else {
                DocumentKind::ScannedPdf
            };
            ("application/pdf".to_string(), kind)
        }
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => ("image/jpeg".to_string(), DocumentKind::Image),
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => ("image/png".to_string(), DocumentKind::Image),
        // TIFF: little-endian (49 49 2A 00) or big-endian (4D 4D 00 2A)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => {
            ("image/tiff".to_string(), DocumentKind::Image)
        }
        // Zip container: PK — DOCX if the declared type or the archive
        // directory says so, otherwise an opaque archive we don't handle.
        [0x50, 0x4B, 0x03, 0x04, ..] => {
            let declared_docx = declared_type.is_some_and(|t| t == DOCX_MIME);
            if declared_docx || zip_looks_like_docx(bytes) {
                (DOCX_MIME.to_string(), DocumentKind::Docx)
            } else {
                ("application/zip".to_string(), DocumentKind::Unsupported)
            }
        }
        _ => {
            if is_likely_text(bytes) {
                ("text/plain".to_string(), DocumentKind::PlainText)
            } else {
                (
                    "application/octet-stream".to_string(),
                    DocumentKind::Unsupported,
                )
            }
        }
    };

    FormatDetection { mime_type, kind }
}

/// Check whether a PDF has an extractable text layer (digital vs scanned).
/// Heuristic over the leading bytes: count text-drawing operators.
fn pdf_has_text_layer(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(256 * 1024)];
    let content = String::from_utf8_lossy(window);

    // BT/ET = begin/end text, Tj/TJ = show text, Tf = set font
    let text_markers = ["BT", "ET", " Tj", " TJ", " Tf"];
    let marker_count: usize = text_markers
        .iter()
        .map(|m| content.matches(m).count())
        .sum();

    marker_count >= 3
}

/// DOCX archives name their main part `word/document.xml`; the local file
/// headers keep those names in the raw bytes.
fn zip_looks_like_docx(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(64 * 1024)];
    window
        .windows(b"word/document.xml".len())
        .any(|w| w == b"word/document.xml")
}

/// Check if the payload is likely plain text (valid UTF-8, mostly printable).
fn is_likely_text(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let sample = &bytes[..bytes.len().min(4096)];
    let text = match std::str::from_utf8(sample) {
        Ok(t) => t,
        // The sample may cut a multi-byte character; accept the valid prefix.
        Err(e) if e.valid_up_to() > 0 => {
            match std::str::from_utf8(&sample[..e.valid_up_to()]) {
                Ok(t) => t,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    let ratio = printable as f64 / text.chars().count().max(1) as f64;
    ratio > 0.80
}
