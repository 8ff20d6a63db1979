//! URL classification: turn a shared link into something downloadable.
//!
//! Google Docs and Slides links are rewritten to their export endpoints (the
//! format is then known up front). Google Drive file links are rewritten to
//! the direct-download endpoint, whose filename only shows up in the response
//! headers. Everything else is fetched as-is.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::model::{FormatTag, ResolvedSource, SourceKind};

static RE_ABSOLUTE_HTTP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)https?://[^\s/?#]+").expect("static regex")
});

static RE_GOOGLE_DOCS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"docs\.google\.com/document/d/([a-zA-Z0-9_-]+)").expect("static regex")
});

static RE_GOOGLE_SLIDES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"docs\.google\.com/presentation/d/([a-zA-Z0-9_-]+)").expect("static regex")
});

static RE_GOOGLE_DRIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"drive\.google\.com/file/d/([a-zA-Z0-9_-]+)").expect("static regex")
});

/// Classify a source URL. Fails before any network traffic when the input
/// is not an absolute http(s) URL.
pub fn classify(source_url: &str) -> ExtractResult<ResolvedSource> {
    let trimmed = source_url.trim();
    if !RE_ABSOLUTE_HTTP.is_match(trimmed) {
        return Err(ExtractError::InvalidSource {
            url: source_url.to_string(),
        });
    }

    Ok(if let Some(id) = capture_id(&RE_GOOGLE_DOCS, trimmed) {
        ResolvedSource {
            source_url: trimmed.to_string(),
            download_url: format!("https://docs.google.com/document/d/{id}/export?format=docx"),
            known_format: Some(FormatTag::Docx),
            needs_header_sniff: false,
            kind: SourceKind::GoogleDocs,
        }
    } else if let Some(id) = capture_id(&RE_GOOGLE_SLIDES, trimmed) {
        ResolvedSource {
            source_url: trimmed.to_string(),
            download_url: format!("https://docs.google.com/presentation/d/{id}/export/pptx"),
            known_format: Some(FormatTag::Pptx),
            needs_header_sniff: false,
            kind: SourceKind::GoogleSlides,
        }
    } else if let Some(id) = capture_id(&RE_GOOGLE_DRIVE, trimmed) {
        ResolvedSource {
            source_url: trimmed.to_string(),
            download_url: format!("https://drive.google.com/uc?export=download&id={id}"),
            known_format: None,
            needs_header_sniff: true,
            kind: SourceKind::GoogleDrive,
        }
    } else {
        ResolvedSource {
            source_url: trimmed.to_string(),
            download_url: trimmed.to_string(),
            known_format: None,
            needs_header_sniff: false,
            kind: SourceKind::Direct,
        }
    })
}

fn capture_id<'a>(re: &Regex, url: &'a str) -> Option<&'a str> {
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Path component of an absolute URL, without query string or fragment.
pub fn url_path(url: &str) -> &str {
    let after_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let path_start = after_scheme
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(after_scheme.len());
    let rest = &after_scheme[path_start..];
    let path_end = rest.find(|c: char| matches!(c, '?' | '#')).unwrap_or(rest.len());
    &rest[..path_end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_and_non_http() {
        for input in ["/local/file.pdf", "", "file.pdf", "ftp://host/a.pdf", "http://"] {
            let err = classify(input).unwrap_err();
            assert!(
                matches!(err, ExtractError::InvalidSource { .. }),
                "{input:?} should be invalid"
            );
        }
    }

    #[test]
    fn accepts_uppercase_scheme() {
        let resolved = classify("HTTPS://example.com/notes.pdf").unwrap();
        assert_eq!(resolved.kind, SourceKind::Direct);
    }

    #[test]
    fn google_docs_rewritten_to_docx_export() {
        let resolved =
            classify("https://docs.google.com/document/d/1AbC_d-9/edit?usp=sharing.pdf").unwrap();
        assert_eq!(
            resolved.download_url,
            "https://docs.google.com/document/d/1AbC_d-9/export?format=docx"
        );
        assert_eq!(resolved.known_format, Some(FormatTag::Docx));
        assert!(!resolved.needs_header_sniff);
        assert_eq!(resolved.kind, SourceKind::GoogleDocs);
    }

    #[test]
    fn google_slides_rewritten_to_pptx_export() {
        let resolved = classify("https://docs.google.com/presentation/d/XyZ123/edit").unwrap();
        assert_eq!(
            resolved.download_url,
            "https://docs.google.com/presentation/d/XyZ123/export/pptx"
        );
        assert_eq!(resolved.known_format, Some(FormatTag::Pptx));
        assert!(!resolved.needs_header_sniff);
    }

    #[test]
    fn google_drive_needs_header_sniff() {
        let resolved = classify("https://drive.google.com/file/d/0B_xyz-1/view?usp=drive_link")
            .unwrap();
        assert_eq!(
            resolved.download_url,
            "https://drive.google.com/uc?export=download&id=0B_xyz-1"
        );
        assert_eq!(resolved.known_format, None);
        assert!(resolved.needs_header_sniff);
    }

    #[test]
    fn direct_links_pass_through() {
        let url = "https://cdn.example.edu/course/week1.PPTX?token=abc";
        let resolved = classify(url).unwrap();
        assert_eq!(resolved.download_url, url);
        assert_eq!(resolved.source_url, url);
        assert_eq!(resolved.known_format, None);
        assert!(!resolved.needs_header_sniff);
    }

    #[test]
    fn path_strips_query_and_fragment() {
        assert_eq!(url_path("https://h.io/a/b.pdf?x=1#top"), "/a/b.pdf");
        assert_eq!(url_path("https://h.io"), "");
        assert_eq!(url_path("https://h.io?q=a.pdf"), "");
        assert_eq!(url_path("http://h.io/dir/"), "/dir/");
    }
}
