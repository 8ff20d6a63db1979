//! TOML configuration for the extraction pipeline and the summarizer.
//!
//! Every field has a default, so an empty or partial file is valid. The
//! default location follows the XDG base directory layout:
//! `$XDG_CONFIG_HOME/uniconnect-extract/config.toml`.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "uniconnect-extract";
const CONFIG_FILE: &str = "config.toml";

/// Errors from loading, saving or validating configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(uniconnect::config::no_home),
        help("Set HOME or XDG_CONFIG_HOME, or pass --config explicitly.")
    )]
    NoHome,

    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(uniconnect::config::read),
        help("Ensure the config file is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(uniconnect::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(uniconnect::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config value `{field}`: {message}")]
    #[diagnostic(
        code(uniconnect::config::invalid),
        help("Fix the value or delete the key to fall back to the default.")
    )]
    Invalid { field: &'static str, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub summarize: SummarizeConfig,
}

/// `[fetch]`: the single GET per extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Overall request timeout, connect through last body byte.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    /// Bodies larger than this are refused.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// `[ocr]`: the PDF fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Structured PDF text with at most this many characters, after
    /// trimming, triggers OCR.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Tesseract language model.
    #[serde(default = "default_ocr_language")]
    pub language: String,
    #[serde(default = "default_rasterizer")]
    pub rasterizer_command: String,
    #[serde(default = "default_tesseract")]
    pub tesseract_command: String,
    /// Recognize pages on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_temp_prefix")]
    pub temp_prefix: String,
}

/// `[summarize]`: OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_summarize_timeout")]
    pub timeout_secs: u64,
}

fn default_fetch_timeout() -> u64 {
    30
}
fn default_max_bytes() -> u64 {
    100 * 1024 * 1024
}
fn default_user_agent() -> String {
    format!("uniconnect-extract/{}", env!("CARGO_PKG_VERSION"))
}
fn default_true() -> bool {
    true
}
fn default_min_text_chars() -> usize {
    50
}
fn default_dpi() -> u32 {
    300
}
fn default_ocr_language() -> String {
    "eng".into()
}
fn default_rasterizer() -> String {
    "pdftoppm".into()
}
fn default_tesseract() -> String {
    "tesseract".into()
}
fn default_temp_prefix() -> String {
    "uniconnect-ocr-".into()
}
fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    "llama-3.1-8b-instant".into()
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_summarize_timeout() -> u64 {
    60
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_bytes: default_max_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_text_chars: default_min_text_chars(),
            dpi: default_dpi(),
            language: default_ocr_language(),
            rasterizer_command: default_rasterizer(),
            tesseract_command: default_tesseract(),
            parallel: false,
            temp_prefix: default_temp_prefix(),
        }
    }
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_summarize_timeout(),
        }
    }
}

impl ExtractConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml().map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject values that would make the pipeline hang or never run.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.fetch.timeout_secs == 0 {
            return Err(invalid("fetch.timeout_secs", "must be greater than zero"));
        }
        if self.fetch.max_bytes == 0 {
            return Err(invalid("fetch.max_bytes", "must be greater than zero"));
        }
        if self.ocr.dpi == 0 {
            return Err(invalid("ocr.dpi", "must be greater than zero"));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(invalid("ocr.language", "must not be empty"));
        }
        if self.ocr.rasterizer_command.trim().is_empty() {
            return Err(invalid("ocr.rasterizer_command", "must not be empty"));
        }
        if self.ocr.tesseract_command.trim().is_empty() {
            return Err(invalid("ocr.tesseract_command", "must not be empty"));
        }
        if self.summarize.timeout_secs == 0 {
            return Err(invalid("summarize.timeout_secs", "must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.to_string(),
    }
}

/// `$XDG_CONFIG_HOME/uniconnect-extract/config.toml`, falling back to
/// `$HOME/.config/...`.
pub fn default_config_path() -> ConfigResult<PathBuf> {
    let config_home = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .map_err(|_| ConfigError::NoHome)?,
    };
    Ok(config_home.join(APP_DIR).join(CONFIG_FILE))
}
