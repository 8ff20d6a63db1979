//! Format resolution: pick the extractor for a fetched payload.
//!
//! Precedence: format implied by the URL shape, then the filename in
//! `content-disposition` (Drive downloads only), then the URL path suffix.

use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::model::{FetchedPayload, FormatTag, ResolvedSource};
use crate::extract::source::url_path;

/// Resolve the concrete format for a run.
pub fn resolve_format(
    source: &ResolvedSource,
    payload: &FetchedPayload,
) -> ExtractResult<FormatTag> {
    if let Some(format) = source.known_format {
        return Ok(format);
    }

    let suffix = if source.needs_header_sniff {
        payload
            .header("content-disposition")
            .and_then(disposition_filename)
            .and_then(|name| file_suffix(&name))
    } else {
        file_suffix(url_path(&source.download_url))
    };

    let Some(suffix) = suffix else {
        return Err(ExtractError::UnknownFormat {
            url: source.source_url.clone(),
        });
    };

    FormatTag::from_suffix(&suffix).ok_or_else(|| ExtractError::UnsupportedFormat {
        url: source.source_url.clone(),
        format: suffix,
    })
}

/// Lower-cased suffix of the last path segment, if it has one.
pub fn file_suffix(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, suffix) = segment.rsplit_once('.')?;
    let suffix = suffix.trim();
    if suffix.is_empty() {
        return None;
    }
    Some(suffix.to_ascii_lowercase())
}

/// Filename parameter of a `content-disposition` header value.
///
/// Accepts `filename="a b.pdf"`, `filename=a.pdf` and the RFC 5987 form
/// `filename*=UTF-8''a%20b.pdf`. `filename*` takes precedence over
/// `filename` (RFC 6266); otherwise the first non-empty value wins.
pub fn disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;
    for param in split_params(header) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // charset'language'percent-encoded-name
                let value = value.trim();
                let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
                let name = percent_decode(unquote(encoded).trim());
                if !name.trim().is_empty() {
                    return Some(name.trim().to_string());
                }
            }
            "filename" if plain.is_none() => {
                let name = unquote(value.trim());
                let name = name.trim();
                if !name.is_empty() {
                    plain = Some(name.to_string());
                }
            }
            _ => {}
        }
    }
    plain
}

/// Split on `;` outside double-quoted strings.
fn split_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&header[start..]);
    params
}

/// Strip surrounding double (or single) quotes and resolve `\"` escapes.
fn unquote(value: &str) -> std::borrow::Cow<'_, str> {
    if let Some(inner) = value.strip_prefix('"') {
        let inner = inner.strip_suffix('"').unwrap_or(inner);
        if inner.contains('\\') {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push(c);
                }
            }
            return out.into();
        }
        return inner.into();
    }
    value.trim_matches('\'').into()
}

fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let hex = [bytes[i + 1], bytes[i + 2]];
            if let Some(byte) = std::str::from_utf8(&hex)
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok())
            {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
