//! Content fetching: one GET per extraction run.
//!
//! Uses `ureq` for synchronous HTTP requests. The agent enforces a timeout
//! and the body read is capped so a hostile or misconfigured host cannot
//! block a run forever or exhaust memory.

use std::collections::BTreeMap;
use std::io::Read;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::extract::error::FetchError;
use crate::extract::model::{FetchedPayload, ResolvedSource};

/// Retrieves the raw bytes behind a resolved source.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, source: &ResolvedSource) -> Result<FetchedPayload, FetchError>;
}

/// `ureq`-backed fetcher. Follows redirects, which Google export and
/// download endpoints rely on.
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .redirects(10)
            .build();
        Self {
            agent,
            max_bytes: config.max_bytes,
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, source: &ResolvedSource) -> Result<FetchedPayload, FetchError> {
        let response = match self.agent.get(&source.download_url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => return Err(FetchError::Status { status }),
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Transport {
                    message: transport.to_string(),
                });
            }
        };

        let mut headers = BTreeMap::new();
        for name in response.headers_names() {
            if let Some(value) = response.header(&name) {
                headers.insert(name.to_ascii_lowercase(), value.to_string());
            }
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|source| FetchError::Body { source })?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }

        Ok(FetchedPayload { bytes, headers })
    }
}
