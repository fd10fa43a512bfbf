//! Per-page PDF text extraction
//!
//! `lopdf` gives page-by-page text. When it yields nothing (unusual font
//! encodings), `pdf-extract` is tried on the whole file and its output is split on
//! form feeds.

use std::panic::{self, AssertUnwindSafe};

use crate::error::{Error, Result};
use crate::types::PageText;

/// Turns PDF bytes into ordered page texts
pub trait PdfExtractor: Send + Sync {
    /// Extract text per page; `origin` names the file in error messages
    fn extract_pages(&self, data: &[u8], origin: &str) -> Result<Vec<PageText>>;
}

/// Default extractor backed by `lopdf` with a `pdf-extract` fallback
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_with_lopdf(data: &[u8], origin: &str) -> Result<Vec<PageText>> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::extraction(origin, format!("Failed to load PDF: {}", e)))?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys().copied() {
            match doc.extract_text(&[page_number]) {
                Ok(text) => pages.push(PageText::new(page_number, clean_page_text(&text))),
                Err(e) => {
                    tracing::debug!("Could not extract text from page {} of {}: {}", page_number, origin, e);
                    pages.push(PageText::new(page_number, String::new()));
                }
            }
        }

        Ok(pages)
    }

    fn extract_with_pdf_extract(data: &[u8], origin: &str) -> Result<Vec<PageText>> {
        // pdf-extract panics on some malformed font tables
        let result = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(data)))
            .map_err(|_| Error::extraction(origin, "PDF text extraction panicked"))?;
        let text = result.map_err(|e| Error::extraction(origin, e.to_string()))?;

        Ok(text
            .split('\u{c}')
            .enumerate()
            .map(|(i, page)| PageText::new(i as u32 + 1, clean_page_text(page)))
            .collect())
    }
}

impl PdfExtractor for PdfTextExtractor {
    fn extract_pages(&self, data: &[u8], origin: &str) -> Result<Vec<PageText>> {
        let mut pages = Self::extract_with_lopdf(data, origin)?;

        if pages.iter().all(|p| p.text.is_empty()) {
            tracing::warn!("lopdf produced no text for {}, trying pdf-extract", origin);
            pages = Self::extract_with_pdf_extract(data, origin)?;
        }

        if pages.iter().all(|p| p.text.is_empty()) {
            return Err(Error::extraction(
                origin,
                "PDF has no extractable text (it may be image-based or encrypted)",
            ));
        }

        tracing::debug!(
            "Extracted {} pages ({} chars) from {}",
            pages.len(),
            pages.iter().map(|p| p.text.len()).sum::<usize>(),
            origin
        );

        Ok(pages)
    }
}

/// Trim lines, drop NULs, and collapse blank-line runs to a single paragraph break
pub fn clean_page_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut pending_break = false;

    for line in text.replace('\0', "").lines() {
        let line = line.trim();
        if line.is_empty() {
            pending_break = !cleaned.is_empty();
            continue;
        }
        if !cleaned.is_empty() {
            cleaned.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        cleaned.push_str(line);
        pending_break = false;
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_page_text() {
        let raw = "  Title  \n\n\n\nFirst line\n  second line \0\n\n";
        assert_eq!(clean_page_text(raw), "Title\n\nFirst line\nsecond line");
        assert_eq!(clean_page_text(" \n \n"), "");
    }

    #[test]
    fn test_garbage_bytes_are_extraction_errors() {
        let err = PdfTextExtractor::new()
            .extract_pages(b"definitely not a pdf", "junk.pdf")
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
        assert!(err.to_string().contains("junk.pdf"));
    }
}
