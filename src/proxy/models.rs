//! Proxy data models

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transport scheme a relay endpoint speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    #[default]
    Http,
    Socks4,
    Socks5,
}

impl ProxyKind {
    pub const ALL: [ProxyKind; 3] = [ProxyKind::Http, ProxyKind::Socks4, ProxyKind::Socks5];

    /// Label used in menus and summaries
    pub fn label(&self) -> &'static str {
        match self {
            ProxyKind::Http => "HTTP",
            ProxyKind::Socks4 => "SOCKS4",
            ProxyKind::Socks5 => "SOCKS5",
        }
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyKind::Http => write!(f, "http"),
            ProxyKind::Socks4 => write!(f, "socks4"),
            ProxyKind::Socks5 => write!(f, "socks5"),
        }
    }
}

impl FromStr for ProxyKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(ProxyKind::Http),
            "socks4" => Ok(ProxyKind::Socks4),
            "socks5" => Ok(ProxyKind::Socks5),
            _ => Err(InputError::UnknownKind(s.to_string())),
        }
    }
}

/// An unverified `host:port` taken from a list provider.
///
/// Two candidates are the same proxy exactly when their normalized text is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateEndpoint(String);

impl CandidateEndpoint {
    /// Normalize one line of a provider listing, `None` for blank lines
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(Self(line.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host part, without the port
    pub fn host(&self) -> &str {
        match self.0.rsplit_once(':') {
            Some((host, _)) => host.trim_start_matches('[').trim_end_matches(']'),
            None => &self.0,
        }
    }

    /// Proxy URL for the given transport scheme
    pub fn url(&self, kind: ProxyKind) -> String {
        format!("{}://{}", kind, self.0)
    }
}

impl fmt::Display for CandidateEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Staleness hint sent to list providers, in seconds.
///
/// This is a parameter of the remote service, not the local request deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeoutBound(u32);

impl TimeoutBound {
    pub const MIN: u32 = 5;
    pub const MAX: u32 = 60;
    pub const DEFAULT: u32 = 10;

    pub fn new(secs: i64) -> Result<Self, InputError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&secs) {
            Ok(Self(secs as u32))
        } else {
            Err(InputError::TimeoutOutOfRange(secs))
        }
    }

    /// Parse user input, falling back to the default on anything invalid
    pub fn parse_or_default(input: &str) -> (Self, Option<InputError>) {
        let input = input.trim();
        let parsed = input
            .parse::<i64>()
            .map_err(|_| InputError::NotANumber(input.to_string()))
            .and_then(Self::new);

        match parsed {
            Ok(bound) => (bound, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn secs(&self) -> u32 {
        self.0
    }
}

impl Default for TimeoutBound {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl FromStr for TimeoutBound {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs: i64 = s
            .trim()
            .parse()
            .map_err(|_| InputError::NotANumber(s.to_string()))?;
        Self::new(secs)
    }
}

impl fmt::Display for TimeoutBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a proxy disclosed that the request went through a proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anonymity {
    Elite,
    Anonymous,
}

impl fmt::Display for Anonymity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anonymity::Elite => write!(f, "Elite"),
            Anonymity::Anonymous => write!(f, "Anonymous"),
        }
    }
}

/// A candidate confirmed reachable by a live request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedProxy {
    pub endpoint: CandidateEndpoint,
    pub country: String,
    pub latency_seconds: f64,
    pub anonymity: Anonymity,
}

impl VerifiedProxy {
    pub fn new(
        endpoint: CandidateEndpoint,
        country: String,
        latency_seconds: f64,
        anonymity: Anonymity,
    ) -> Self {
        Self {
            endpoint,
            country,
            latency_seconds,
            anonymity,
        }
    }
}

impl fmt::Display for VerifiedProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {:.2}s, {})",
            self.endpoint, self.country, self.latency_seconds, self.anonymity
        )
    }
}
