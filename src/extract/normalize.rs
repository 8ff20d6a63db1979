//! Final text normalization, applied once at the pipeline exit.

/// Collapse every whitespace run (newlines included) to a single space and
/// trim both ends. Idempotent.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
