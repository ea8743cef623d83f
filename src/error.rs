//! Failure reasons for the individual tasks of a pipeline run
//!
//! None of these are fatal. A `FetchError` turns into an empty candidate set
//! for one source, a `VerifyError` excludes one candidate, and an `InputError`
//! is answered with a default or a re-prompt.

use std::time::Duration;
use thiserror::Error;

/// Why a list source contributed no candidates
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Why a candidate endpoint was not confirmed
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid proxy address: {0}")]
    Client(String),

    #[error("request through proxy failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("response body is not a JSON object")]
    Malformed,
}

/// Rejected user or file input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown proxy kind: {0} (expected http, socks4 or socks5)")]
    UnknownKind(String),

    #[error("timeout bound {0} is outside 5..=60")]
    TimeoutOutOfRange(i64),

    #[error("not a number: {0}")]
    NotANumber(String),

    #[error("line {line}: expected `<kind> <name> <url-template>`")]
    MalformedSourceLine { line: usize },
}
