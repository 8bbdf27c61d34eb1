//! Word-processor (DOCX) text extraction.
//!
//! A DOCX file is a zip container whose main part is `word/document.xml`.
//! Only paragraph text is needed for clause analysis, so the XML is read
//! with a light touch: `<w:t>` runs carry the text, `</w:p>` closes a
//! paragraph.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::Regex;

use super::ExtractionError;

/// Extract paragraph text from a DOCX payload, in document order.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::DocxParsing(format!("not a readable archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::DocxParsing(format!("missing document part: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::DocxParsing(format!("unreadable document part: {e}")))?;

    Ok(document_xml_to_text(&xml))
}

fn document_xml_to_text(xml: &str) -> String {
    static TEXT_RUN: OnceLock<Regex> = OnceLock::new();
    let text_run = TEXT_RUN
        .get_or_init(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("text-run regex"));

    let mut paragraphs = Vec::new();
    for para_xml in xml.split("</w:p>") {
        let mut para = String::new();
        for cap in text_run.captures_iter(para_xml) {
            para.push_str(&unescape_xml(&cap[1]));
        }
        let para = para.trim().to_string();
        if !para.is_empty() {
            paragraphs.push(para);
        }
    }

    paragraphs.join("\n\n")
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
