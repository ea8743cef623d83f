//! Proxy module for collecting and verifying public proxies
//!
//! This module provides functionality for:
//! - Looking up the list providers registered for a proxy kind
//! - Fetching candidate endpoints from every provider concurrently
//! - Merging the candidates into one set without duplicates
//! - Probing each candidate with a live request and keeping the ones that work

pub mod dedup;
pub mod fetcher;
pub mod geo;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod verifier;

pub use dedup::Deduplicator;
pub use fetcher::{FetchList, FetchReport, FetcherConfig, ListFetcher};
pub use geo::{CountryLookup, GeoLocator};
pub use models::{Anonymity, CandidateEndpoint, ProxyKind, TimeoutBound, VerifiedProxy};
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use sources::{ProxySource, SourceRegistry};
pub use verifier::{ParsedResponse, ProxyVerifier, VerifierConfig, VerifyProxy};
