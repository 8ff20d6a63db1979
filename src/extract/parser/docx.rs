//! DOCX raw-text extraction: `word/document.xml` out of the zip container,
//! one paragraph per `w:p`, paragraphs separated by blank lines.

use std::io::{Cursor, Read};

use crate::extract::error::ParseError;
use crate::extract::model::FormatTag;
use crate::extract::parser::TextExtractor;
use crate::extract::xml::{XmlElement, XmlNode, parse_document};

/// Maximum decompressed size of the main document part.
const MAX_PART_BYTES: u64 = 64 * 1024 * 1024;

const DOCUMENT_PART: &str = "word/document.xml";

/// Word document extractor.
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn format(&self) -> FormatTag {
        FormatTag::Docx
    }

    fn extract(&self, data: &[u8]) -> Result<String, ParseError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| ParseError::new(format!("not a zip container: {e}")))?;
        let part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| ParseError::new(format!("{DOCUMENT_PART}: {e}")))?;

        let mut xml = Vec::new();
        part.take(MAX_PART_BYTES + 1)
            .read_to_end(&mut xml)
            .map_err(|e| ParseError::new(format!("{DOCUMENT_PART}: {e}")))?;
        if xml.len() as u64 > MAX_PART_BYTES {
            return Err(ParseError::new(format!(
                "{DOCUMENT_PART} exceeds {MAX_PART_BYTES} bytes"
            )));
        }

        let root = parse_document(&xml)?;
        Ok(raw_text(&root))
    }
}

/// Paragraph texts joined with blank lines.
pub fn raw_text(root: &XmlElement) -> String {
    root.find_all("w:p")
        .into_iter()
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn paragraph_text(paragraph: &XmlElement) -> String {
    let mut out = String::new();
    collect_runs(paragraph, &mut out);
    out
}

fn collect_runs(el: &XmlElement, out: &mut String) {
    for child in el.elements() {
        match child.name.as_str() {
            "w:t" => {
                for node in &child.children {
                    if let XmlNode::Text(text) = node {
                        out.push_str(text);
                    }
                }
            }
            "w:tab" => out.push('\t'),
            "w:br" | "w:cr" => out.push('\n'),
            // Deleted text in tracked changes and field instructions are not content.
            "w:delText" | "w:instrText" => {}
            _ => collect_runs(child, out),
        }
    }
}
