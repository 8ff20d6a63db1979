//! uniconnect-extract CLI: document text extraction for shared study resources.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use uniconnect_extract::config::{ExtractConfig, default_config_path};
use uniconnect_extract::extract::{self, FormatTag, Pipeline};
use uniconnect_extract::summarize::{ChatCompletionsSummarizer, Summarizer};

#[derive(Parser)]
#[command(
    name = "uniconnect-extract",
    version,
    about = "Extract plain text from PDF, DOCX and PPTX links"
)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/uniconnect-extract/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a document and print its text.
    Extract {
        /// Direct link or Google Docs/Slides/Drive link.
        url: String,

        /// Print a JSON report instead of bare text.
        #[arg(long)]
        json: bool,

        /// Also ask the configured LLM to explain the text.
        #[arg(long)]
        summarize: bool,

        /// Never fall back to OCR for image-only PDFs.
        #[arg(long)]
        no_ocr: bool,
    },

    /// Show how a link will be downloaded, without fetching it.
    Classify {
        url: String,
    },

    /// Inspect or create the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Write the default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Serialize)]
struct Report<'a> {
    source: &'a str,
    format: FormatTag,
    used_fallback: bool,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    match cli.command {
        Commands::Extract {
            url,
            json,
            summarize,
            no_ocr,
        } => {
            let config = ExtractConfig::load_or_default(&config_path)?;
            let mut pipeline = Pipeline::new(&config);
            if no_ocr {
                pipeline = pipeline.without_ocr();
            }
            let result = pipeline.extract(&url)?;

            let summary = if summarize {
                let summarizer = ChatCompletionsSummarizer::from_env(config.summarize.clone())?;
                Some(summarizer.summarize(&result.text)?)
            } else {
                None
            };

            if json {
                let report = Report {
                    source: &url,
                    format: result.format,
                    used_fallback: result.used_fallback,
                    text: &result.text,
                    summary,
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).into_diagnostic()?
                );
            } else {
                println!("{}", result.text);
                if let Some(summary) = summary {
                    println!();
                    println!("{summary}");
                }
            }
        }

        Commands::Classify { url } => {
            let resolved = extract::classify(&url)?;
            println!("source:       {}", resolved.source_url);
            println!("kind:         {}", resolved.kind);
            println!("download url: {}", resolved.download_url);
            match resolved.known_format {
                Some(format) => println!("format:       {format}"),
                None if resolved.needs_header_sniff => {
                    println!("format:       (from content-disposition filename)")
                }
                None => println!("format:       (from URL path suffix)"),
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = ExtractConfig::load_or_default(&config_path)?;
                print!("{}", config.to_toml().into_diagnostic()?);
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    miette::bail!(
                        "{} already exists (use --force to overwrite)",
                        config_path.display()
                    );
                }
                ExtractConfig::default().save(&config_path)?;
                println!("Wrote {}", config_path.display());
            }
        },
    }

    Ok(())
}
