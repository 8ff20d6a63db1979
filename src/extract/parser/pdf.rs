//! PDF text extraction using the `pdf-extract` crate.
//!
//! Pages are extracted in order and each page's text is terminated with a
//! newline. Image-only scans come back (nearly) empty; the pipeline decides
//! whether that warrants OCR.

use std::panic;

use crate::extract::error::ParseError;
use crate::extract::model::FormatTag;
use crate::extract::parser::TextExtractor;

/// PDF extractor backed by `pdf-extract`.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn format(&self) -> FormatTag {
        FormatTag::Pdf
    }

    fn extract(&self, data: &[u8]) -> Result<String, ParseError> {
        let pages = extract_pages(data)?;
        Ok(join_pages(&pages))
    }
}

/// Per-page text, page 1 first.
pub fn extract_pages(data: &[u8]) -> Result<Vec<String>, ParseError> {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data)) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ParseError::new(e.to_string())),
        Err(_) => Err(ParseError::new("pdf parser panicked on malformed input")),
    }
}

/// Join page texts, each followed by a newline. Line breaks inside a page
/// become single spaces.
pub fn join_pages(pages: &[String]) -> String {
    let mut out = String::new();
    for page in pages {
        let runs: Vec<&str> = page
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        out.push_str(&runs.join(" "));
        out.push('\n');
    }
    out
}
