//! Transient values passed between pipeline stages.
//!
//! Nothing here is persisted: every value is created and dropped inside a
//! single extraction run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Pdf,
    Docx,
    Pptx,
}

impl FormatTag {
    pub const ALL: [FormatTag; 3] = [Self::Pdf, Self::Docx, Self::Pptx];

    /// Lower-case file suffix, also used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
        }
    }

    /// Map a file suffix (any case, no leading dot) to a format.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which URL rule matched during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GoogleDocs,
    GoogleSlides,
    GoogleDrive,
    Direct,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::GoogleDocs => "google-docs",
            Self::GoogleSlides => "google-slides",
            Self::GoogleDrive => "google-drive",
            Self::Direct => "direct",
        })
    }
}

/// A source URL after classification. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    /// The URL the caller handed in.
    pub source_url: String,
    /// The URL actually fetched.
    pub download_url: String,
    /// Format implied by the URL shape alone (Google export links).
    pub known_format: Option<FormatTag>,
    /// Whether the filename must be recovered from `content-disposition`.
    pub needs_header_sniff: bool,
    pub kind: SourceKind,
}

/// Raw response of the single GET issued per run.
#[derive(Debug, Clone, Default)]
pub struct FetchedPayload {
    pub bytes: Vec<u8>,
    /// Response headers. `HttpFetcher` lower-cases names; other fetchers
    /// may not, so read through [`FetchedPayload::header`].
    pub headers: BTreeMap<String, String>,
}

impl FetchedPayload {
    /// Case-insensitive header lookup, whatever case the names were stored in.
    pub fn header(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.headers.get(name) {
            return Some(value);
        }
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Terminal output of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Whitespace-normalized text.
    pub text: String,
    /// `true` only when the OCR fallback produced the text.
    pub used_fallback: bool,
    pub format: FormatTag,
}
