// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # uniconnect-extract
//!
//! Text extraction for shared study resources: given a link to a lecture
//! PDF, a Word document, a slide deck, or a Google Docs/Slides/Drive file,
//! produce whitespace-normalized plain text suitable for storing alongside
//! the resource or handing to a summarizer.
//!
//! ## Architecture
//!
//! - **Classifier** (`extract::source`): rewrites Google links to export/download endpoints
//! - **Fetcher** (`extract::fetch`): one bounded GET via `ureq`
//! - **Format resolver** (`extract::format`): known format, `content-disposition` filename, or URL suffix
//! - **Extractors** (`extract::parser`): PDF pages, DOCX paragraphs, PPTX slides
//! - **OCR fallback** (`extract::ocr`): `pdftoppm` + `tesseract` for image-only PDFs
//! - **Summarizer** (`summarize`): optional LLM explanation of the result
//!
//! ## Library usage
//!
//! ```no_run
//! use uniconnect_extract::config::ExtractConfig;
//! use uniconnect_extract::extract::Pipeline;
//!
//! let pipeline = Pipeline::new(&ExtractConfig::default());
//! let result = pipeline
//!     .extract("https://docs.google.com/presentation/d/abc123/edit")
//!     .unwrap();
//! assert!(!result.used_fallback);
//! ```

pub mod config;
pub mod extract;
pub mod summarize;
