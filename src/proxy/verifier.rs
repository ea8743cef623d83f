//! Proxy verifier routing a test request through each candidate

use crate::error::VerifyError;
use crate::proxy::geo::{CountryLookup, GeoLocator};
use crate::proxy::models::{Anonymity, CandidateEndpoint, ProxyKind, VerifiedProxy};
use async_trait::async_trait;
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default deadline for one verification request in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default service echoing the caller's address and location
const DEFAULT_TEST_URL: &str = "http://ip-api.com/json";

/// Text that marks a response as having seen proxy usage.
///
/// This is a heuristic over the echo service's output format, not a protocol
/// guarantee.
const DEFAULT_DISCLOSURE_TOKEN: &str = "proxy";

/// Country reported when neither the response nor the geo database has one
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Configuration for proxy verifier
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Deadline for each verification request
    pub timeout: Duration,
    /// URL requested through the proxy
    pub test_url: String,
    /// Substring of the response that marks the proxy as anonymous rather than elite
    pub disclosure_token: String,
    /// Path to MMDB file for country fallback (optional)
    pub mmdb_path: Option<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            test_url: DEFAULT_TEST_URL.to_string(),
            disclosure_token: DEFAULT_DISCLOSURE_TOKEN.to_string(),
            mmdb_path: None,
        }
    }
}

impl VerifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_test_url(mut self, url: String) -> Self {
        self.test_url = url;
        self
    }

    pub fn with_disclosure_token(mut self, token: String) -> Self {
        self.disclosure_token = token;
        self
    }

    pub fn with_mmdb_path(mut self, path: String) -> Self {
        self.mmdb_path = Some(path);
        self
    }
}

/// Body of the echo service as seen through a proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    Success {
        country: Option<String>,
        disclosed: bool,
    },
    Malformed,
}

impl ParsedResponse {
    /// Parse a JSON object body and look for the disclosure token in its text
    pub fn parse(body: &str, disclosure_token: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(_) => return ParsedResponse::Malformed,
        };
        let Some(object) = value.as_object() else {
            return ParsedResponse::Malformed;
        };

        let country = object
            .get("country")
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .map(String::from);
        let disclosed = value.to_string().contains(disclosure_token);

        ParsedResponse::Success { country, disclosed }
    }
}

impl From<bool> for Anonymity {
    fn from(disclosed: bool) -> Self {
        if disclosed {
            Anonymity::Anonymous
        } else {
            Anonymity::Elite
        }
    }
}

/// Confirms one candidate, `None` when it does not work
#[async_trait]
pub trait VerifyProxy: Send + Sync {
    async fn verify(&self, endpoint: &CandidateEndpoint, kind: ProxyKind) -> Option<VerifiedProxy>;
}

/// Proxy verifier issuing one request per candidate, without retry
#[derive(Debug, Clone)]
pub struct ProxyVerifier {
    config: VerifierConfig,
    country_lookup: Option<Arc<dyn CountryLookup>>,
}

impl ProxyVerifier {
    /// Create a new proxy verifier with default configuration
    pub fn new() -> Self {
        Self {
            config: VerifierConfig::default(),
            country_lookup: None,
        }
    }

    /// Create a new proxy verifier with custom configuration.
    ///
    /// An unreadable MMDB path disables the country fallback.
    pub fn with_config(config: VerifierConfig) -> Self {
        let country_lookup = config.mmdb_path.as_ref().and_then(|path| {
            GeoLocator::from_path(path)
                .map_err(|e| tracing::warn!(path = %path, error = %e, "geo database unavailable"))
                .ok()
                .map(|geo| Arc::new(geo) as Arc<dyn CountryLookup>)
        });

        Self {
            config,
            country_lookup,
        }
    }

    /// Resolve the country from the proxy host when the response has none
    pub fn with_country_lookup(mut self, lookup: Arc<dyn CountryLookup>) -> Self {
        self.country_lookup = Some(lookup);
        self
    }

    /// Probe a candidate and report why it failed
    pub async fn probe(
        &self,
        endpoint: &CandidateEndpoint,
        kind: ProxyKind,
    ) -> Result<VerifiedProxy, VerifyError> {
        let client = self.create_client(endpoint, kind)?;

        let request = async {
            let start = Instant::now();
            let response = client.get(&self.config.test_url).send().await?;
            let latency = start.elapsed();

            let status = response.status();
            if status != StatusCode::OK {
                return Err(VerifyError::Status {
                    status: status.as_u16(),
                });
            }
            let body = response.text().await?;
            Ok((latency, body))
        };

        let (latency, body) = match tokio::time::timeout(self.config.timeout, request).await {
            Ok(result) => result?,
            Err(_) => return Err(VerifyError::Timeout(self.config.timeout)),
        };

        match ParsedResponse::parse(&body, &self.config.disclosure_token) {
            ParsedResponse::Success { country, disclosed } => {
                let country = country
                    .or_else(|| {
                        self.country_lookup
                            .as_ref()
                            .and_then(|lookup| lookup.country(endpoint.host()))
                    })
                    .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());

                Ok(VerifiedProxy::new(
                    endpoint.clone(),
                    country,
                    latency.as_secs_f64(),
                    Anonymity::from(disclosed),
                ))
            }
            ParsedResponse::Malformed => Err(VerifyError::Malformed),
        }
    }

    /// Create a reqwest client routed through the candidate.
    ///
    /// Every scheme of the test URL goes through the proxy; an HTTP proxy
    /// tunnels `https://` with CONNECT.
    fn create_client(
        &self,
        endpoint: &CandidateEndpoint,
        kind: ProxyKind,
    ) -> Result<Client, VerifyError> {
        let reqwest_proxy = ReqwestProxy::all(endpoint.url(kind))
            .map_err(|e| VerifyError::Client(e.to_string()))?;

        Client::builder()
            .proxy(reqwest_proxy)
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| VerifyError::Client(e.to_string()))
    }
}

impl Default for ProxyVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerifyProxy for ProxyVerifier {
    async fn verify(&self, endpoint: &CandidateEndpoint, kind: ProxyKind) -> Option<VerifiedProxy> {
        self.probe(endpoint, kind).await.ok()
    }
}
