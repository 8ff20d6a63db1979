//! Rich diagnostic error types for the extraction pipeline.
//!
//! `ExtractError` is what callers of [`crate::extract::extract`] see. Each
//! variant names the source URL so a controller can turn it straight into a
//! user-facing message. The smaller component errors (`FetchError`,
//! `ParseError`) never leave the pipeline without a URL attached.

use miette::Diagnostic;
use thiserror::Error;

use crate::extract::ocr::OcrError;

/// Errors surfaced by a single extraction run.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    #[error("invalid source \"{url}\": must be an absolute http(s) URL")]
    #[diagnostic(
        code(uniconnect::extract::invalid_source),
        help("Provide a full web address starting with http:// or https://.")
    )]
    InvalidSource { url: String },

    #[error("failed to download \"{url}\": {message}")]
    #[diagnostic(
        code(uniconnect::extract::download_failed),
        help("Check if the URL is correct and publicly accessible.")
    )]
    DownloadFailed {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("could not determine the file type of \"{url}\"")]
    #[diagnostic(
        code(uniconnect::extract::unknown_format),
        help(
            "The link carries no file extension and the server did not report a filename. \
             Link directly to a .pdf, .docx or .pptx file."
        )
    )]
    UnknownFormat { url: String },

    #[error("unsupported file type \".{format}\" for \"{url}\"")]
    #[diagnostic(
        code(uniconnect::extract::unsupported_format),
        help("Supported formats are pdf, docx and pptx (Google Docs and Slides links are exported automatically).")
    )]
    UnsupportedFormat { url: String, format: String },

    #[error("{format} document at \"{url}\" could not be read: {message}")]
    #[diagnostic(
        code(uniconnect::extract::unreadable),
        help("The file is damaged or is not really a {format} document.")
    )]
    Unreadable {
        url: String,
        format: String,
        message: String,
    },

    #[error("no readable text in {format} document at \"{url}\"")]
    #[diagnostic(
        code(uniconnect::extract::empty_document),
        help("The document might be empty or contain only images.")
    )]
    EmptyDocument { url: String, format: String },

    #[error("OCR failed for \"{url}\"")]
    #[diagnostic(
        code(uniconnect::extract::ocr_failed),
        help(
            "The PDF has no text layer and optical character recognition did not help. \
             Make sure poppler-utils and tesseract (with the English model) are installed."
        )
    )]
    OcrFailed {
        url: String,
        #[source]
        source: OcrError,
    },
}

impl ExtractError {
    /// The source URL the failing run was started with.
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidSource { url }
            | Self::DownloadFailed { url, .. }
            | Self::UnknownFormat { url }
            | Self::UnsupportedFormat { url, .. }
            | Self::Unreadable { url, .. }
            | Self::EmptyDocument { url, .. }
            | Self::OcrFailed { url, .. } => url,
        }
    }
}

/// Convenience alias for extraction results.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Transport-level failure from a [`crate::extract::fetch::Fetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("reading response body: {source}")]
    Body {
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// A format extractor could not make sense of the payload.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
