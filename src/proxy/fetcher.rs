//! List fetcher for downloading candidate endpoints from providers
//!
//! Every retrieval is bounded by a local deadline. A source that answers with
//! anything but `200 OK`, fails on the network, or misses the deadline yields a
//! [`FetchReport`] carrying the cause instead of an error for the whole run.

use crate::error::FetchError;
use crate::proxy::models::{CandidateEndpoint, TimeoutBound};
use crate::proxy::sources::ProxySource;
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

/// Default deadline for one list retrieval in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default user agent for list retrieval
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Outcome of fetching a single source
#[derive(Debug)]
pub struct FetchReport {
    /// Name of the source that was fetched
    pub source: String,
    /// Candidates on success, the cause otherwise
    pub outcome: std::result::Result<HashSet<CandidateEndpoint>, FetchError>,
}

impl FetchReport {
    pub fn success(source: String, candidates: HashSet<CandidateEndpoint>) -> Self {
        Self {
            source,
            outcome: Ok(candidates),
        }
    }

    pub fn failure(source: String, error: FetchError) -> Self {
        Self {
            source,
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Candidates contributed to the run, empty for a failed source
    pub fn into_candidates(self) -> HashSet<CandidateEndpoint> {
        self.outcome.unwrap_or_default()
    }
}

/// Retrieves the candidate list of one source
#[async_trait]
pub trait FetchList: Send + Sync {
    async fn fetch(&self, source: &ProxySource, bound: TimeoutBound) -> FetchReport;
}

/// Configuration for the list fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Local deadline for each retrieval
    pub timeout: Duration,
    /// User agent sent to providers
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// HTTP list fetcher shared by all sources of a run
#[derive(Debug, Clone)]
pub struct ListFetcher {
    config: FetcherConfig,
    client: Client,
}

impl ListFetcher {
    /// Create a new list fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    /// Create a new list fetcher with custom configuration
    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { config, client })
    }

    async fn retrieve(&self, url: &str) -> std::result::Result<String, FetchError> {
        let request = async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if status != StatusCode::OK {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                });
            }
            Ok(response.text().await?)
        };

        match tokio::time::timeout(self.config.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.config.timeout)),
        }
    }

    /// Split a listing into normalized candidates, skipping blank lines
    pub fn parse_candidates(content: &str) -> HashSet<CandidateEndpoint> {
        content.lines().filter_map(CandidateEndpoint::parse).collect()
    }
}

#[async_trait]
impl FetchList for ListFetcher {
    async fn fetch(&self, source: &ProxySource, bound: TimeoutBound) -> FetchReport {
        let url = source.url(bound);

        match self.retrieve(&url).await {
            Ok(content) => {
                let candidates = Self::parse_candidates(&content);
                info!(
                    source = %source.name,
                    kind = %source.kind,
                    count = candidates.len(),
                    "fetched proxy list"
                );
                FetchReport::success(source.name.clone(), candidates)
            }
            Err(e) => {
                warn!(
                    source = %source.name,
                    kind = %source.kind,
                    error = %e,
                    "failed to fetch proxy list"
                );
                FetchReport::failure(source.name.clone(), e)
            }
        }
    }
}
