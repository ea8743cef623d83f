//! Fetch, merge and verify pipeline for one proxy kind
//!
//! A run has two concurrent stages separated by a full barrier: all sources of
//! the kind are fetched and merged before the first candidate is probed. Each
//! task returns its own result and the stage combines them only after every
//! task finished, so no state is shared between tasks.

use crate::proxy::dedup::Deduplicator;
use crate::proxy::fetcher::{FetchList, FetchReport};
use crate::proxy::models::{ProxyKind, TimeoutBound, VerifiedProxy};
use crate::proxy::sources::SourceRegistry;
use crate::proxy::verifier::VerifyProxy;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tracing::info;

/// Default number of probes in flight
const DEFAULT_CONCURRENCY: usize = 256;

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of verification probes in flight
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// What happened during one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub kind: ProxyKind,
    pub bound: TimeoutBound,
    /// Number of sources queried
    pub sources_queried: usize,
    /// Names of sources that contributed nothing because they failed
    pub sources_failed: Vec<String>,
    /// Number of unique candidates probed
    pub candidates: usize,
    /// Confirmed proxies, in no particular order
    pub verified: Vec<VerifiedProxy>,
    pub elapsed: Duration,
}

/// Orchestrates the fetch and verification stages
pub struct Pipeline<F, V> {
    registry: SourceRegistry,
    fetcher: F,
    verifier: V,
    config: PipelineConfig,
}

impl<F, V> Pipeline<F, V>
where
    F: FetchList,
    V: VerifyProxy,
{
    pub fn new(registry: SourceRegistry, fetcher: F, verifier: V) -> Self {
        Self::with_config(registry, fetcher, verifier, PipelineConfig::default())
    }

    pub fn with_config(
        registry: SourceRegistry,
        fetcher: F,
        verifier: V,
        config: PipelineConfig,
    ) -> Self {
        Self {
            registry,
            fetcher,
            verifier,
            config,
        }
    }

    /// Fetch, merge and verify, returning the confirmed proxies
    pub async fn run(&self, kind: ProxyKind, bound: TimeoutBound) -> Vec<VerifiedProxy> {
        self.run_with_summary(kind, bound).await.verified
    }

    /// Same as [`Pipeline::run`], with counts for reporting
    pub async fn run_with_summary(&self, kind: ProxyKind, bound: TimeoutBound) -> RunSummary {
        let start = Instant::now();
        let sources = self.registry.sources_for(kind);
        info!(%kind, %bound, sources = sources.len(), "fetching proxy lists");

        let reports: Vec<FetchReport> =
            join_all(sources.iter().map(|source| self.fetcher.fetch(source, bound))).await;

        let sources_failed: Vec<String> = reports
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.source.clone())
            .collect();

        let candidates = Deduplicator::merge(reports.into_iter().map(FetchReport::into_candidates));
        let candidate_count = candidates.len();
        info!(%kind, candidates = candidate_count, "verifying candidates");

        let verified: Vec<VerifiedProxy> = stream::iter(candidates)
            .map(|endpoint| async move { self.verifier.verify(&endpoint, kind).await })
            .buffer_unordered(self.config.concurrency)
            .filter_map(|result| async move { result })
            .collect()
            .await;

        let elapsed = start.elapsed();
        info!(
            %kind,
            sources = sources.len(),
            failed_sources = sources_failed.len(),
            candidates = candidate_count,
            verified = verified.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "run complete"
        );

        RunSummary {
            kind,
            bound,
            sources_queried: sources.len(),
            sources_failed,
            candidates: candidate_count,
            verified,
            elapsed,
        }
    }
}
