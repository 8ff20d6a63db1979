//! PPTX text extraction.
//!
//! Slides are the `ppt/slides/slide*.xml` members of the archive, taken in
//! archive order. Every `a:t` run on a slide is collected in document order
//! and the runs are joined with spaces. Output is one `Slide N: ...` block
//! per slide, blocks separated by a blank line.

use std::io::{Cursor, Read};

use crate::extract::error::ParseError;
use crate::extract::model::FormatTag;
use crate::extract::parser::TextExtractor;
use crate::extract::xml::parse_document;

const SLIDE_PREFIX: &str = "ppt/slides/slide";
const TEXT_RUN: &str = "a:t";
const MAX_SLIDE_BYTES: u64 = 16 * 1024 * 1024;

/// PowerPoint extractor.
pub struct PptxExtractor;

impl TextExtractor for PptxExtractor {
    fn format(&self) -> FormatTag {
        FormatTag::Pptx
    }

    fn extract(&self, data: &[u8]) -> Result<String, ParseError> {
        let slides = slide_texts(data)?;
        if slides.iter().all(|s| s.trim().is_empty()) {
            // No slides, or slides without a single run: nothing to label.
            return Ok(String::new());
        }
        Ok(label_slides(&slides))
    }
}

/// Whether an archive member holds slide content.
pub fn is_slide_member(name: &str) -> bool {
    name.starts_with(SLIDE_PREFIX) && name.ends_with(".xml") && !name[SLIDE_PREFIX.len()..].contains('/')
}

/// Text of every slide in archive order.
pub fn slide_texts(data: &[u8]) -> Result<Vec<String>, ParseError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| ParseError::new(format!("not a zip container: {e}")))?;

    let mut slides = Vec::new();
    for index in 0..archive.len() {
        let member = archive
            .by_index(index)
            .map_err(|e| ParseError::new(format!("archive member {index}: {e}")))?;
        if !is_slide_member(member.name()) {
            continue;
        }
        let name = member.name().to_string();

        let mut xml = Vec::new();
        member
            .take(MAX_SLIDE_BYTES + 1)
            .read_to_end(&mut xml)
            .map_err(|e| ParseError::new(format!("{name}: {e}")))?;
        if xml.len() as u64 > MAX_SLIDE_BYTES {
            return Err(ParseError::new(format!(
                "{name} exceeds {MAX_SLIDE_BYTES} bytes"
            )));
        }

        let root = parse_document(&xml).map_err(|e| ParseError::new(format!("{name}: {e}")))?;
        let runs: Vec<String> = root
            .find_all(TEXT_RUN)
            .into_iter()
            .map(|run| run.text())
            .collect();
        slides.push(runs.join(" "));
    }
    Ok(slides)
}

/// `Slide 1: ...`, `Slide 2: ...`, separated by blank lines.
pub fn label_slides(slides: &[String]) -> String {
    slides
        .iter()
        .enumerate()
        .map(|(i, text)| format!("Slide {}: {}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
