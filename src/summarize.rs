//! LLM summarization of extracted text.
//!
//! The pipeline never calls this; it is the capability the host applies to
//! an extraction result when a plain-language explanation is wanted. The
//! provided client speaks the OpenAI-compatible chat completions API
//! (Groq by default).

use miette::Diagnostic;
use thiserror::Error;

use crate::config::SummarizeConfig;

/// Errors from the summarization client.
#[derive(Debug, Error, Diagnostic)]
pub enum SummarizeError {
    #[error("API key not set: ${var} is empty or missing")]
    #[diagnostic(
        code(uniconnect::summarize::missing_api_key),
        help("Export {var}=<your key> or change summarize.api_key_env in the config.")
    )]
    MissingApiKey { var: String },

    #[error("summarization request failed: {message}")]
    #[diagnostic(
        code(uniconnect::summarize::request_failed),
        help("Check the API key, the base URL and your network connection.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse summarization response: {message}")]
    #[diagnostic(
        code(uniconnect::summarize::invalid_response),
        help("The endpoint returned an unexpected response format.")
    )]
    InvalidResponse { message: String },
}

pub type SummarizeResult<T> = std::result::Result<T, SummarizeError>;

/// Turns text into a natural-language explanation.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> SummarizeResult<String>;
}

/// The single user message sent for `text`.
pub fn explain_prompt(text: &str) -> String {
    format!("{text}\n\nExplain the above text in easy-to-understand language.")
}

/// Client for `POST {base_url}/chat/completions`.
pub struct ChatCompletionsSummarizer {
    config: SummarizeConfig,
    api_key: String,
}

impl ChatCompletionsSummarizer {
    pub fn new(config: SummarizeConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
        }
    }

    /// Read the API key from the environment variable named in the config.
    pub fn from_env(config: SummarizeConfig) -> SummarizeResult<Self> {
        match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(config, key)),
            _ => Err(SummarizeError::MissingApiKey {
                var: config.api_key_env.clone(),
            }),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "user", "content": explain_prompt(text) }
            ],
        })
    }
}

impl Summarizer for ChatCompletionsSummarizer {
    fn summarize(&self, text: &str) -> SummarizeResult<String> {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build();

        let body = serde_json::to_string(&self.request_body(text)).map_err(|e| {
            SummarizeError::RequestFailed {
                message: format!("JSON serialize error: {e}"),
            }
        })?;

        tracing::debug!(model = %self.config.model, chars = text.len(), "requesting summary");
        let resp = match agent
            .post(&self.endpoint())
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_string(&body)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let detail = resp.into_string().unwrap_or_default();
                return Err(SummarizeError::RequestFailed {
                    message: format!("HTTP {code}: {}", detail.trim()),
                });
            }
            Err(ureq::Error::Transport(t)) => {
                return Err(SummarizeError::RequestFailed {
                    message: t.to_string(),
                });
            }
        };

        let resp_str = resp
            .into_string()
            .map_err(|e| SummarizeError::InvalidResponse {
                message: e.to_string(),
            })?;
        parse_completion(&resp_str)
    }
}

/// `choices[0].message.content`, or an empty string when the field is absent.
pub fn parse_completion(body: &str) -> SummarizeResult<String> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| SummarizeError::InvalidResponse {
            message: e.to_string(),
        })?;
    Ok(json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("")
        .to_string())
}
