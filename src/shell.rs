//! Interactive menu for choosing a proxy kind and running the pipeline

use crate::proxy::{FetchList, Pipeline, ProxyKind, RunSummary, TimeoutBound, VerifyProxy};
use crate::sink::ResultSink;
use crate::Result;
use crossterm::style::Stylize;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::error;

const BANNER: &str = r#"
    ╔══════════════════════════════════════════════╗
    ║                Proxy Scraper                 ║
    ║                                              ║
    ║  - Multi-source proxy lists                  ║
    ║  - Live verification                         ║
    ║  - Country, latency and anonymity details    ║
    ╚══════════════════════════════════════════════╝
"#;

/// Entry selected in the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Kind(ProxyKind),
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Kind(ProxyKind::Http)),
            "2" => Some(MenuChoice::Kind(ProxyKind::Socks4)),
            "3" => Some(MenuChoice::Kind(ProxyKind::Socks5)),
            "4" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Menu loop over a line based input
pub struct Shell<F, V, S, R> {
    pipeline: Arc<Pipeline<F, V>>,
    sink: S,
    input: R,
}

impl<F, V, S, R> Shell<F, V, S, R>
where
    F: FetchList + 'static,
    V: VerifyProxy + 'static,
    S: ResultSink,
    R: AsyncBufRead + Unpin,
{
    pub fn new(pipeline: Arc<Pipeline<F, V>>, sink: S, input: R) -> Self {
        Self {
            pipeline,
            sink,
            input,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run until the user picks Exit or the input ends.
    ///
    /// A failing run is reported and the menu is shown again.
    pub async fn run(&mut self) -> Result<()> {
        println!("{}", BANNER.cyan());

        loop {
            println!("{}", "\nSelect proxy type:".yellow());
            for (idx, kind) in ProxyKind::ALL.iter().enumerate() {
                println!("[{}] {}", idx + 1, kind.label());
            }
            println!("[4] Exit");

            let Some(line) = self.prompt("Enter your choice (1-4): ").await? else {
                break;
            };

            let kind = match MenuChoice::parse(&line) {
                Some(MenuChoice::Exit) => break,
                Some(MenuChoice::Kind(kind)) => kind,
                None => {
                    println!("{}", "Invalid choice!".red());
                    continue;
                }
            };

            let Some(line) = self
                .prompt(&format!(
                    "Enter timeout in seconds ({}-{}): ",
                    TimeoutBound::MIN,
                    TimeoutBound::MAX
                ))
                .await?
            else {
                break;
            };
            let (bound, invalid) = TimeoutBound::parse_or_default(&line);
            if invalid.is_some() {
                println!(
                    "{}",
                    format!(
                        "Invalid timeout! Using default of {} seconds",
                        TimeoutBound::DEFAULT
                    )
                    .red()
                );
            }

            println!("{}", "\nFetching and verifying proxies...".cyan());
            match self.run_once(kind, bound).await {
                Ok(summary) => {
                    println!(
                        "{}",
                        format!(
                            "\nFound {} valid {} proxies! ({} candidates, {}/{} sources failed)",
                            summary.verified.len(),
                            kind,
                            summary.candidates,
                            summary.sources_failed.len(),
                            summary.sources_queried
                        )
                        .green()
                    );
                }
                Err(e) => {
                    error!(error = %e, "run failed");
                    println!("{}", format!("An error occurred: {e:#}").red());
                }
            }

            if self.prompt("\nPress Enter to continue...").await?.is_none() {
                break;
            }
        }

        Ok(())
    }

    /// Run the pipeline in its own task so a panic stays contained, then record
    async fn run_once(&mut self, kind: ProxyKind, bound: TimeoutBound) -> Result<RunSummary> {
        let pipeline = Arc::clone(&self.pipeline);
        let summary = tokio::spawn(async move { pipeline.run_with_summary(kind, bound).await })
            .await
            .map_err(|e| anyhow::anyhow!("pipeline task aborted: {e}"))?;

        self.sink.record(kind, &summary.verified)?;
        Ok(summary)
    }

    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        print!("{}", text.white());
        io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
