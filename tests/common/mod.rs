//! Shared fixtures: in-memory documents, a one-shot HTTP responder, and
//! fake collaborators for offline pipeline runs.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use uniconnect_extract::config::OcrConfig;
use uniconnect_extract::extract::ocr::{OcrEngine, OcrError, OcrFallback, OcrResult, Rasterizer};
use uniconnect_extract::extract::{FetchError, FetchedPayload, Fetcher, ResolvedSource};

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

fn zip_of(members: &[(&str, String)]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in members {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf.into_inner()
}

/// A DOCX whose body holds one paragraph per entry.
pub fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    zip_of(&[
        ("[Content_Types].xml", "<Types/>".to_string()),
        ("word/document.xml", document),
    ])
}

/// A PPTX with one slide per entry; each slide holds the given text runs.
pub fn pptx(slides: &[&[&str]]) -> Vec<u8> {
    let mut members = vec![("[Content_Types].xml".to_string(), "<Types/>".to_string())];
    for (i, runs) in slides.iter().enumerate() {
        let body: String = runs
            .iter()
            .map(|r| format!("<a:p><a:r><a:t>{r}</a:t></a:r></a:p>"))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody>{body}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
        );
        members.push((format!("ppt/slides/slide{}.xml", i + 1), xml));
        members.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", i + 1),
            "<Relationships/>".to_string(),
        ));
    }
    let borrowed: Vec<(&str, String)> = members
        .iter()
        .map(|(name, xml)| (name.as_str(), xml.clone()))
        .collect();
    zip_of(&borrowed)
}

/// A one-page PDF with a text layer, one `Tj` per line, Courier 12pt.
pub fn pdf_with_text(lines: &[&str]) -> Vec<u8> {
    pdf_with_pages(&[lines])
}

/// A PDF with one page per entry, each page holding the given lines.
pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 700.into()]),
        ];
        for line in lines.iter() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// A canned HTTP response.
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: b"error".to_vec(),
        }
    }
}

/// Serve exactly one request on a fresh port. Returns the base URL
/// (`http://127.0.0.1:PORT`) and a receiver for the request line.
pub fn serve_once(reply: Reply) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        let request = String::from_utf8_lossy(&request);
        let _ = tx.send(request.lines().next().unwrap_or_default().to_string());

        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            reply.status,
            reason(reply.status),
            reply.body.len()
        );
        for (name, value) in &reply.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("\r\n");
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&reply.body);
        let _ = stream.flush();
    });

    (format!("http://{addr}"), rx)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

/// A base URL on which nothing listens.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Returns a fixed payload and records every download URL it is asked for.
#[derive(Clone, Default)]
pub struct RecordingFetcher {
    pub bytes: Vec<u8>,
    pub headers: BTreeMap<String, String>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl RecordingFetcher {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for RecordingFetcher {
    fn fetch(&self, source: &ResolvedSource) -> Result<FetchedPayload, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push(source.download_url.clone());
        Ok(FetchedPayload {
            bytes: self.bytes.clone(),
            headers: self.headers.clone(),
        })
    }
}

/// Writes `page-1.png` .. `page-N.png` and remembers the workspace.
pub struct FakeRasterizer {
    pub pages: usize,
    pub fail: bool,
    pub seen_dir: Arc<Mutex<Option<PathBuf>>>,
}

impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, pdf: &Path, out_dir: &Path, _dpi: u32) -> OcrResult<()> {
        assert!(pdf.starts_with(out_dir));
        *self.seen_dir.lock().unwrap() = Some(out_dir.to_path_buf());
        if self.fail {
            return Err(OcrError::ToolFailed {
                tool: "fake-rasterizer".into(),
                status: "exit status: 1".into(),
                stderr: "Syntax Error: Couldn't find trailer dictionary".into(),
            });
        }
        for page in 1..=self.pages {
            std::fs::write(out_dir.join(format!("page-{page}.png")), b"png").unwrap();
        }
        Ok(())
    }
}

/// Recognizes `page-N.png` as "text of page N".
pub struct PageEcho;

impl OcrEngine for PageEcho {
    fn recognize(&self, image: &Path, _language: &str) -> OcrResult<String> {
        let name = image.file_stem().unwrap().to_string_lossy().into_owned();
        let number = name.trim_start_matches("page-");
        Ok(format!("text of page {number}"))
    }
}

/// OCR fallback over fakes, with its workspace created under `root`.
/// Returns the fallback and a handle to the workspace path it used.
pub fn fake_ocr(
    pages: usize,
    fail: bool,
    root: &Path,
) -> (OcrFallback, Arc<Mutex<Option<PathBuf>>>) {
    let seen_dir = Arc::new(Mutex::new(None));
    let rasterizer = FakeRasterizer {
        pages,
        fail,
        seen_dir: seen_dir.clone(),
    };
    let fallback =
        OcrFallback::with_tools(Box::new(rasterizer), Box::new(PageEcho), &OcrConfig::default())
            .with_temp_root(root);
    (fallback, seen_dir)
}
