use std::collections::HashMap;

use tracing::debug;

use crate::types::{Error, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Text content below this length suggests a scanned document.
const SCANNED_TEXT_THRESHOLD: usize = 100;

/// Plain text, page count, and format hints pulled from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Full extracted text
    pub text: String,
    /// Number of pages reported by the parser (1 for plain text)
    pub page_count: u32,
    /// Heuristic flag: the document likely needs OCR. Advisory only, no OCR
    /// is performed.
    pub is_scanned: bool,
    /// Raw parser metadata (format, version)
    pub metadata: HashMap<String, String>,
}

/// Converts a document binary into plain text plus a page count.
///
/// PDF bytes are parsed with lopdf; anything else is decoded as UTF-8 plain
/// text with a single page. Unparseable input is an `Error::Extraction`.
#[derive(Debug, Clone, Default)]
pub struct DocumentTextExtractor;

impl DocumentTextExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract text and page information from raw document bytes.
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        if bytes.is_empty() {
            return Err(Error::Extraction("empty document".to_string()));
        }

        let mut metadata = HashMap::new();

        let (text, page_count) = if bytes.starts_with(PDF_MAGIC) {
            let doc = lopdf::Document::load_mem(bytes)
                .map_err(|e| Error::Extraction(format!("failed to parse PDF: {}", e)))?;

            let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
            let page_count = page_numbers.len() as u32;
            let text = doc
                .extract_text(&page_numbers)
                .map_err(|e| Error::Extraction(format!("failed to extract PDF text: {}", e)))?;

            metadata.insert("format".to_string(), "pdf".to_string());
            metadata.insert("pdf_version".to_string(), doc.version.clone());
            (text, page_count.max(1))
        } else {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| Error::Extraction("document is neither a PDF nor valid UTF-8 text".to_string()))?
                .to_string();
            metadata.insert("format".to_string(), "text".to_string());
            (text, 1)
        };

        if text.trim().is_empty() {
            return Err(Error::Extraction("document contains no extractable text".to_string()));
        }

        let is_scanned = likely_scanned(&text);
        debug!(pages = page_count, chars = text.len(), is_scanned, "document text extracted");

        Ok(ExtractedDocument {
            text,
            page_count,
            is_scanned,
            metadata,
        })
    }

    /// Split extracted text into per-page line groups by dividing the lines
    /// evenly across the reported page count.
    ///
    /// This is a documented approximation, not a layout-aware mapping: real
    /// page boundaries are lost once the text is flattened.
    pub fn page_lines<'a>(&self, text: &'a str, page_count: u32) -> Vec<Vec<&'a str>> {
        let lines: Vec<&str> = text.lines().collect();
        let pages = page_count.max(1) as usize;
        let per_page = lines.len().div_ceil(pages).max(1);

        lines.chunks(per_page).map(|chunk| chunk.to_vec()).collect()
    }
}

/// Heuristic for documents that likely require OCR: very little text, a
/// scan-related keyword, heavy non-ASCII content, or too few lines.
fn likely_scanned(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.len() < SCANNED_TEXT_THRESHOLD {
        return true;
    }

    let lower = trimmed.to_lowercase();
    if lower.contains("scanned") || lower.contains("scan") || lower.contains("ocr") {
        return true;
    }

    let non_ascii = trimmed.bytes().filter(|b| !b.is_ascii()).count();
    if non_ascii * 5 > trimmed.len() {
        return true;
    }

    trimmed.lines().count() < 5
}
