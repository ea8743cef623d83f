//! Proxy Scraper - public proxy collector and verifier
//!
//! Downloads candidate proxies from several public list providers, probes
//! each one with a live request and keeps the ones that answer, annotated
//! with country, latency and anonymity.

pub mod error;
pub mod proxy;
pub mod shell;
pub mod sink;

pub use proxy::*;

use std::path::PathBuf;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Pipeline wired with the network fetcher and verifier
pub type ProxyPipeline = Pipeline<ListFetcher, ProxyVerifier>;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving result files
    pub output_dir: PathBuf,
    /// Extra sources appended to the built-in catalog
    pub sources_file: Option<PathBuf>,
    pub fetcher: FetcherConfig,
    pub verifier: VerifierConfig,
    pub pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("proxies"),
            sources_file: None,
            fetcher: FetcherConfig::default(),
            verifier: VerifierConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    /// Source catalog: built-in providers plus the optional sources file
    pub fn registry(&self) -> Result<SourceRegistry> {
        let mut registry = SourceRegistry::builtin();
        if let Some(path) = &self.sources_file {
            let added = registry.load_file(path)?;
            tracing::info!(path = %path.display(), added, "loaded extra sources");
        }
        Ok(registry)
    }

    /// Build the network pipeline described by this configuration
    pub fn build_pipeline(&self) -> Result<ProxyPipeline> {
        let fetcher = ListFetcher::with_config(self.fetcher.clone())?;
        let verifier = ProxyVerifier::with_config(self.verifier.clone());
        Ok(Pipeline::with_config(
            self.registry()?,
            fetcher,
            verifier,
            self.pipeline.clone(),
        ))
    }
}
