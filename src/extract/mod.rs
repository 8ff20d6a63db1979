//! Document text extraction.
//!
//! Turns a link to a PDF, DOCX or PPTX document (including Google Docs,
//! Slides and Drive links) into whitespace-normalized plain text. Image-only
//! PDFs fall back to OCR.
//!
//! ```no_run
//! use uniconnect_extract::extract;
//!
//! let result = extract::extract("https://example.org/notes/week1.pdf").unwrap();
//! println!("{} (ocr: {})", result.text, result.used_fallback);
//! ```

pub mod error;
pub mod fetch;
pub mod format;
pub mod model;
pub mod normalize;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod source;
pub mod xml;

pub use error::{ExtractError, ExtractResult, FetchError, ParseError};
pub use fetch::{Fetcher, HttpFetcher};
pub use model::{ExtractionResult, FetchedPayload, FormatTag, ResolvedSource, SourceKind};
pub use normalize::normalize_whitespace;
pub use ocr::{OcrEngine, OcrError, OcrFallback, Rasterizer};
pub use parser::{ExtractorTable, TextExtractor};
pub use pipeline::{Pipeline, extract};
pub use source::classify;
