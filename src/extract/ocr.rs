//! OCR fallback for image-only PDFs.
//!
//! The PDF is written into a scoped temporary workspace, every page is
//! rasterized to `page-N.png`, each image is recognized, and the page texts
//! are joined with newlines in numeric page order. The workspace is a
//! [`tempfile::TempDir`], so it is removed when the run returns, whichever
//! way it returns.
//!
//! The rasterizer and the recognizer are traits so hosts can swap tools;
//! the defaults shell out to poppler's `pdftoppm` and `tesseract`.

use std::path::{Path, PathBuf};
use std::process::Command;

use miette::Diagnostic;
use rayon::prelude::*;
use thiserror::Error;

use crate::config::OcrConfig;

/// Name of the PDF copy inside the workspace.
const INPUT_FILE: &str = "input.pdf";
/// Prefix passed to the rasterizer; pages come out as `page-1.png`, ...
const PAGE_PREFIX: &str = "page";

/// Errors from the OCR fallback.
#[derive(Debug, Error, Diagnostic)]
pub enum OcrError {
    #[error("could not run `{tool}`")]
    #[diagnostic(
        code(uniconnect::ocr::tool_unavailable),
        help("Install poppler-utils and tesseract-ocr, or point the [ocr] commands at them.")
    )]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{tool}` exited with {status}: {stderr}")]
    #[diagnostic(code(uniconnect::ocr::tool_failed))]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("rasterizer produced no page images")]
    #[diagnostic(code(uniconnect::ocr::no_pages))]
    NoPages,

    #[error("OCR recognized no text")]
    #[diagnostic(
        code(uniconnect::ocr::no_text),
        help("The scan may be blank, too low in resolution, or in a language other than the configured model.")
    )]
    NoText,

    #[error("OCR workspace I/O: {context}")]
    #[diagnostic(code(uniconnect::ocr::workspace))]
    Workspace {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

pub type OcrResult<T> = std::result::Result<T, OcrError>;

/// Renders every page of a PDF to `<out_dir>/page-N.png`.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, pdf: &Path, out_dir: &Path, dpi: u32) -> OcrResult<()>;
}

/// Recognizes the text on one page image.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &Path, language: &str) -> OcrResult<String>;
}

/// `pdftoppm -png -r <dpi> <pdf> <out_dir>/page`.
pub struct PdftoppmRasterizer {
    pub command: String,
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf: &Path, out_dir: &Path, dpi: u32) -> OcrResult<()> {
        let mut cmd = Command::new(&self.command);
        cmd.arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(pdf)
            .arg(out_dir.join(PAGE_PREFIX));
        run_tool(&self.command, &mut cmd).map(|_| ())
    }
}

/// `tesseract <image> stdout -l <language>`.
pub struct TesseractEngine {
    pub command: String,
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &Path, language: &str) -> OcrResult<String> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(image).arg("stdout").arg("-l").arg(language);
        let stdout = run_tool(&self.command, &mut cmd)?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

fn run_tool(tool: &str, cmd: &mut Command) -> OcrResult<Vec<u8>> {
    let output = cmd.output().map_err(|source| OcrError::ToolUnavailable {
        tool: tool.to_string(),
        source,
    })?;
    if !output.status.success() {
        return Err(OcrError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}

/// Exclusively owned scratch directory for one OCR run. Removed on drop.
pub struct TempWorkspace {
    dir: tempfile::TempDir,
}

impl TempWorkspace {
    /// Create a uniquely named directory under `root` (or the system temp dir).
    pub fn create(prefix: &str, root: Option<&Path>) -> OcrResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| OcrError::Workspace {
            context: "creating temporary directory".into(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the PDF bytes into the workspace and return the file path.
    pub fn write_input(&self, pdf: &[u8]) -> OcrResult<PathBuf> {
        let path = self.path().join(INPUT_FILE);
        std::fs::write(&path, pdf).map_err(|source| OcrError::Workspace {
            context: format!("writing {}", path.display()),
            source,
        })?;
        Ok(path)
    }
}

/// Page number embedded in a rasterizer output name (`page-07.png` -> 7).
/// `None` for files that are not page images.
pub fn page_number(file_name: &str) -> Option<u32> {
    if !file_name.starts_with(PAGE_PREFIX) || !file_name.ends_with(".png") {
        return None;
    }
    let digits: String = file_name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Page images in `dir`, sorted by numeric page number.
pub fn ordered_page_images(dir: &Path) -> OcrResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| OcrError::Workspace {
        context: format!("listing {}", dir.display()),
        source,
    })?;

    let mut pages = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| OcrError::Workspace {
            context: format!("listing {}", dir.display()),
            source,
        })?;
        let name = entry.file_name();
        if let Some(number) = name.to_str().and_then(page_number) {
            pages.push((number, entry.path()));
        }
    }
    pages.sort();
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

/// Rasterize-then-recognize fallback for PDFs without a usable text layer.
pub struct OcrFallback {
    rasterizer: Box<dyn Rasterizer>,
    engine: Box<dyn OcrEngine>,
    dpi: u32,
    language: String,
    parallel: bool,
    temp_prefix: String,
    temp_root: Option<PathBuf>,
}

impl OcrFallback {
    /// Fallback using `pdftoppm` and `tesseract` as configured.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::with_tools(
            Box::new(PdftoppmRasterizer {
                command: config.rasterizer_command.clone(),
            }),
            Box::new(TesseractEngine {
                command: config.tesseract_command.clone(),
            }),
            config,
        )
    }

    /// Fallback using custom tools, with resolution, language and
    /// workspace settings taken from `config`.
    pub fn with_tools(
        rasterizer: Box<dyn Rasterizer>,
        engine: Box<dyn OcrEngine>,
        config: &OcrConfig,
    ) -> Self {
        Self {
            rasterizer,
            engine,
            dpi: config.dpi,
            language: config.language.clone(),
            parallel: config.parallel,
            temp_prefix: config.temp_prefix.clone(),
            temp_root: None,
        }
    }

    /// Create workspaces under `root` instead of the system temp dir.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Run OCR over every page of `pdf` and return the page texts joined
    /// with newlines, page 1 first.
    pub fn run(&self, pdf: &[u8]) -> OcrResult<String> {
        let workspace = TempWorkspace::create(&self.temp_prefix, self.temp_root.as_deref())?;
        tracing::debug!(path = %workspace.path().display(), "created OCR workspace");

        let input = workspace.write_input(pdf)?;
        self.rasterizer.rasterize(&input, workspace.path(), self.dpi)?;

        let pages = ordered_page_images(workspace.path())?;
        if pages.is_empty() {
            return Err(OcrError::NoPages);
        }
        tracing::debug!(pages = pages.len(), parallel = self.parallel, "recognizing pages");

        // Both branches keep page order; rayon's collect is order-preserving.
        let texts: Vec<String> = if self.parallel {
            pages
                .par_iter()
                .map(|page| self.recognize_page(page))
                .collect::<OcrResult<_>>()?
        } else {
            pages
                .iter()
                .map(|page| self.recognize_page(page))
                .collect::<OcrResult<_>>()?
        };

        let text = texts.join("\n");
        if text.trim().is_empty() {
            return Err(OcrError::NoText);
        }
        Ok(text)
    }

    fn recognize_page(&self, image: &Path) -> OcrResult<String> {
        let text = self.engine.recognize(image, &self.language)?;
        tracing::debug!(page = %image.display(), chars = text.len(), "recognized page");
        Ok(text)
    }
}
