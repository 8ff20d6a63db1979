//! Minimal XML element tree for OOXML parts.
//!
//! OOXML parts are small enough to hold in memory, and a tree keeps the
//! extractors simple: they walk elements by qualified name instead of
//! juggling reader events. Built on `quick-xml` events.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::extract::error::ParseError;

/// A child of an element: another element or a run of character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element with its qualified name (`a:t`, `w:p`, ...), attributes in
/// document order, and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Every descendant element named `name`, in document order. The
    /// element itself is included when it matches. Matches are not searched
    /// further: a match nested inside another match is not reported.
    pub fn find_all(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(el) = stack.pop() {
            if el.name == name {
                found.push(el);
                continue;
            }
            // Reverse so the leftmost child is visited first.
            stack.extend(el.elements().collect::<Vec<_>>().into_iter().rev());
        }
        found
    }

    /// Concatenated character data of this element and all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }
}

/// Parse a document and return its root element.
pub fn parse_document(xml: &[u8]) -> Result<XmlElement, ParseError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| ParseError::new(format!("xml at byte {}: {e}", reader.buffer_position())))?;
        match event {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let el = open_element(&start)?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| ParseError::new("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| ParseError::new(format!("bad character data: {e}")))?;
                push_text(&mut stack, &text);
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&raw));
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ParseError::new("unexpected end of document"));
    }
    root.ok_or_else(|| ParseError::new("document has no root element"))
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlElement, ParseError> {
    let mut el = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::new(format!("bad attribute: {e}")))?;
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::new(format!("bad attribute value: {e}")))?;
        el.attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok(el)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    el: XmlElement,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(el)),
        None if root.is_none() => *root = Some(el),
        None => return Err(ParseError::new("multiple root elements")),
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    // Character data outside the root (the newline after the declaration)
    // carries nothing.
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Text(text.to_string()));
    }
}
