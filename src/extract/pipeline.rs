//! The extraction pipeline: classify, fetch, resolve format, extract,
//! optionally OCR, normalize.
//!
//! A `Pipeline` holds no per-run state, so one instance can serve many
//! concurrent `extract` calls. Every collaborator is replaceable.

use crate::config::ExtractConfig;
use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::fetch::{Fetcher, HttpFetcher};
use crate::extract::format::resolve_format;
use crate::extract::model::{ExtractionResult, FormatTag};
use crate::extract::normalize::normalize_whitespace;
use crate::extract::ocr::OcrFallback;
use crate::extract::parser::{ExtractorTable, TextExtractor};
use crate::extract::source::classify;

/// Orchestrates one extraction per [`Pipeline::extract`] call.
pub struct Pipeline {
    fetcher: Box<dyn Fetcher>,
    extractors: ExtractorTable,
    /// Fallback for PDFs with too little structured text. No other format
    /// has one.
    pdf_fallback: Option<OcrFallback>,
    min_text_chars: usize,
}

impl Pipeline {
    /// Pipeline with the HTTP fetcher, the built-in extractors and, when
    /// `ocr.enabled`, the pdftoppm/tesseract fallback.
    pub fn new(config: &ExtractConfig) -> Self {
        let pdf_fallback = config
            .ocr
            .enabled
            .then(|| OcrFallback::from_config(&config.ocr));
        Self {
            fetcher: Box::new(HttpFetcher::new(&config.fetch)),
            extractors: ExtractorTable::standard(),
            pdf_fallback,
            min_text_chars: config.ocr.min_text_chars,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Box<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the extractor for the extractor's own format.
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractors.register(extractor);
        self
    }

    pub fn with_extractors(mut self, extractors: ExtractorTable) -> Self {
        self.extractors = extractors;
        self
    }

    pub fn with_ocr(mut self, fallback: OcrFallback) -> Self {
        self.pdf_fallback = Some(fallback);
        self
    }

    pub fn without_ocr(mut self) -> Self {
        self.pdf_fallback = None;
        self
    }

    /// Extract normalized plain text from the document at `source_url`.
    ///
    /// Fails with `InvalidSource` before any network traffic when the URL
    /// is not absolute http(s).
    pub fn extract(&self, source_url: &str) -> ExtractResult<ExtractionResult> {
        let source = classify(source_url)?;
        tracing::info!(
            url = source_url,
            kind = %source.kind,
            download_url = %source.download_url,
            "classified source"
        );

        let payload = self
            .fetcher
            .fetch(&source)
            .map_err(|e| ExtractError::DownloadFailed {
                url: source_url.to_string(),
                status: e.status(),
                message: e.to_string(),
            })?;
        tracing::info!(url = source_url, bytes = payload.bytes.len(), "fetched payload");

        let format = resolve_format(&source, &payload)?;
        tracing::info!(url = source_url, %format, "resolved format");

        let extractor = self
            .extractors
            .get(format)
            .ok_or_else(|| ExtractError::UnsupportedFormat {
                url: source_url.to_string(),
                format: format.to_string(),
            })?;

        let (raw, used_fallback) = match format {
            FormatTag::Pdf => self.extract_pdf(source_url, extractor, &payload.bytes)?,
            _ => {
                let text = extractor
                    .extract(&payload.bytes)
                    .map_err(|e| ExtractError::Unreadable {
                        url: source_url.to_string(),
                        format: format.to_string(),
                        message: e.message,
                    })?;
                (text, false)
            }
        };

        let text = normalize_whitespace(&raw);
        if text.is_empty() {
            return Err(ExtractError::EmptyDocument {
                url: source_url.to_string(),
                format: format.to_string(),
            });
        }

        tracing::info!(
            url = source_url,
            %format,
            chars = text.len(),
            used_fallback,
            "extraction complete"
        );
        Ok(ExtractionResult {
            text,
            used_fallback,
            format,
        })
    }

    /// Structured extraction with OCR as the fallback. A parse failure
    /// counts as empty text.
    fn extract_pdf(
        &self,
        url: &str,
        extractor: &dyn TextExtractor,
        bytes: &[u8],
    ) -> ExtractResult<(String, bool)> {
        let structured = match extractor.extract(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(url, error = %e, "PDF parse failed, treating as empty");
                String::new()
            }
        };

        let chars = structured.trim().chars().count();
        if chars > self.min_text_chars {
            return Ok((structured, false));
        }

        let Some(fallback) = &self.pdf_fallback else {
            tracing::warn!(url, chars, "insufficient PDF text and OCR is disabled");
            return Ok((structured, false));
        };

        tracing::warn!(
            url,
            chars,
            threshold = self.min_text_chars,
            "insufficient PDF text, running OCR"
        );
        let text = fallback
            .run(bytes)
            .map_err(|source| ExtractError::OcrFailed {
                url: url.to_string(),
                source,
            })?;
        Ok((text, true))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&ExtractConfig::default())
    }
}

/// Run the default pipeline (HTTP fetch, built-in extractors, OCR via
/// pdftoppm and tesseract) on `source_url`.
pub fn extract(source_url: &str) -> ExtractResult<ExtractionResult> {
    Pipeline::default().extract(source_url)
}
