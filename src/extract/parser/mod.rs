//! Format extractors and the table that dispatches to them.
//!
//! Each supported format implements `TextExtractor`. `ExtractorTable::standard()`
//! registers one extractor per [`FormatTag`]; hosts may replace entries.

pub mod docx;
pub mod pdf;
pub mod pptx;

use std::collections::HashMap;

use crate::extract::error::ParseError;
use crate::extract::model::FormatTag;

/// Turns raw document bytes into unnormalized text.
pub trait TextExtractor: Send + Sync {
    /// The format this extractor handles.
    fn format(&self) -> FormatTag;

    /// Extract the document's text. Whitespace normalization happens later.
    fn extract(&self, data: &[u8]) -> Result<String, ParseError>;
}

/// Get the built-in extractor for a format.
pub fn extractor_for(format: FormatTag) -> Box<dyn TextExtractor> {
    match format {
        FormatTag::Pdf => Box::new(pdf::PdfExtractor),
        FormatTag::Docx => Box::new(docx::DocxExtractor),
        FormatTag::Pptx => Box::new(pptx::PptxExtractor),
    }
}

/// Mapping from format to extractor.
pub struct ExtractorTable {
    extractors: HashMap<FormatTag, Box<dyn TextExtractor>>,
}

impl ExtractorTable {
    /// Empty table; every lookup fails until extractors are registered.
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Table with the built-in extractor for every supported format.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for format in FormatTag::ALL {
            table.register(extractor_for(format));
        }
        table
    }

    /// Register an extractor under its own format, replacing any previous one.
    pub fn register(&mut self, extractor: Box<dyn TextExtractor>) {
        self.extractors.insert(extractor.format(), extractor);
    }

    pub fn get(&self, format: FormatTag) -> Option<&dyn TextExtractor> {
        self.extractors.get(&format).map(|e| e.as_ref())
    }
}

impl Default for ExtractorTable {
    fn default() -> Self {
        Self::standard()
    }
}
