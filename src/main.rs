use anyhow::Result;
use clap::{Parser, Subcommand};
use proxy_scraper::{
    shell::Shell,
    sink::{FileSink, ResultSink},
    Config, FetcherConfig, PipelineConfig, ProxyKind, TimeoutBound, VerifierConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

/// Collects public proxy lists and verifies every candidate through a live request
#[derive(Parser)]
#[command(name = "proxy-scraper")]
#[command(about = "Collects public proxy lists and verifies every candidate through a live request")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory for result files
    #[arg(short, long, env = "PROXY_SCRAPER_OUTPUT", default_value = "proxies", global = true)]
    output_dir: PathBuf,

    /// Extra sources, one `<kind> <name> <url-template>` per line
    #[arg(short = 'f', long, env = "PROXY_SCRAPER_SOURCES", global = true)]
    sources_file: Option<PathBuf>,

    /// Maximum number of verification requests in flight
    #[arg(short = 'n', long, default_value = "256", global = true)]
    concurrency: usize,

    /// Deadline in seconds for downloading one proxy list
    #[arg(long, default_value = "10", global = true)]
    fetch_timeout: u64,

    /// Deadline in seconds for one verification request
    #[arg(long, default_value = "5", global = true)]
    verify_timeout: u64,

    /// URL requested through each proxy
    #[arg(long, default_value = "http://ip-api.com/json", global = true)]
    test_url: String,

    /// MMDB file used for the country when the test URL reports none
    #[arg(long, env = "PROXY_SCRAPER_MMDB", global = true)]
    mmdb: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menu
    Interactive,
    /// Fetch and verify one proxy kind, then exit
    Run {
        /// Proxy kind (http, socks4, socks5)
        #[arg(short = 't', long, default_value = "http")]
        kind: String,
        /// Staleness bound passed to providers, 5-60 seconds
        #[arg(long, default_value = "10")]
        timeout: String,
    },
    /// List the configured proxy sources
    Sources {
        /// Only show sources of this kind
        #[arg(short = 't', long)]
        kind: Option<String>,
    },
}

impl Cli {
    fn config(&self) -> Config {
        let mut verifier = VerifierConfig::new()
            .with_timeout(Duration::from_secs(self.verify_timeout))
            .with_test_url(self.test_url.clone());
        if let Some(path) = &self.mmdb {
            verifier = verifier.with_mmdb_path(path.clone());
        }

        Config {
            output_dir: self.output_dir.clone(),
            sources_file: self.sources_file.clone(),
            fetcher: FetcherConfig::new().with_timeout(Duration::from_secs(self.fetch_timeout)),
            verifier,
            pipeline: PipelineConfig::new().with_concurrency(self.concurrency),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command {
        Some(Commands::Interactive) | None => {
            let pipeline = Arc::new(config.build_pipeline()?);
            let sink = FileSink::new(&config.output_dir);
            let input = BufReader::new(tokio::io::stdin());
            Shell::new(pipeline, sink, input).run().await?;
        }
        Some(Commands::Run { kind, timeout }) => {
            let kind: ProxyKind = kind.parse()?;
            let (bound, invalid) = TimeoutBound::parse_or_default(&timeout);
            if let Some(e) = invalid {
                eprintln!("{e}, using default of {} seconds", TimeoutBound::DEFAULT);
            }

            let pipeline = config.build_pipeline()?;
            let summary = pipeline.run_with_summary(kind, bound).await;

            let mut sink = FileSink::new(&config.output_dir);
            sink.record(kind, &summary.verified)?;

            println!(
                "Verified {} of {} {} candidates in {:.1}s",
                summary.verified.len(),
                summary.candidates,
                kind,
                summary.elapsed.as_secs_f64()
            );
            for name in &summary.sources_failed {
                println!("  source unavailable: {name}");
            }
            for proxy in &summary.verified {
                println!("  {proxy}");
            }
            if let Some(saved) = sink.last_saved() {
                println!("Saved to {:?}", saved.list);
            }
        }
        Some(Commands::Sources { kind }) => {
            let kinds = match kind {
                Some(kind) => vec![kind.parse::<ProxyKind>()?],
                None => ProxyKind::ALL.to_vec(),
            };

            let registry = config.registry()?;
            for kind in kinds {
                println!("{}:", kind.label());
                for source in registry.sources_for(kind) {
                    println!("  {:<12} {}", source.name, source.url_template);
                }
            }
        }
    }

    Ok(())
}
