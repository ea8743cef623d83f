//! Persistence of verified proxies

use crate::proxy::{ProxyKind, VerifiedProxy};
use crate::Result;
use anyhow::Context;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Receives the final result of a run
pub trait ResultSink {
    fn record(&mut self, kind: ProxyKind, results: &[VerifiedProxy]) -> Result<()>;
}

/// Files written for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFiles {
    pub list: PathBuf,
    pub details: Option<PathBuf>,
}

/// Writes `<kind>_proxies_<timestamp>.txt` with one endpoint per line and,
/// when there is anything to describe, a `.json` file with the full metadata.
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
    last_saved: Option<SavedFiles>,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            last_saved: None,
        }
    }

    /// Files written by the most recent `record` call
    pub fn last_saved(&self) -> Option<&SavedFiles> {
        self.last_saved.as_ref()
    }

    /// Timestamped file stem, suffixed when a run in the same millisecond
    /// already took it
    fn unused_stem(&self, kind: ProxyKind) -> String {
        let base = format!(
            "{}_proxies_{}",
            kind,
            Local::now().format("%Y%m%d_%H%M%S_%3f")
        );

        let taken = |stem: &str| {
            self.output_dir.join(format!("{stem}.txt")).exists()
                || self.output_dir.join(format!("{stem}.json")).exists()
        };
        if !taken(&base) {
            return base;
        }
        let mut n = 1u32;
        loop {
            let stem = format!("{base}_{n}");
            if !taken(&stem) {
                return stem;
            }
            n += 1;
        }
    }

    fn save(&self, kind: ProxyKind, results: &[VerifiedProxy]) -> Result<SavedFiles> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("creating output directory {}", self.output_dir.display())
        })?;

        let stem = self.unused_stem(kind);

        let list = self.output_dir.join(format!("{stem}.txt"));
        let content: String = results
            .iter()
            .map(|p| format!("{}\n", p.endpoint))
            .collect();
        fs::write(&list, content).with_context(|| format!("writing {}", list.display()))?;

        let details = if results.is_empty() {
            None
        } else {
            let path = self.output_dir.join(format!("{stem}.json"));
            let json = serde_json::to_string_pretty(results)?;
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            Some(path)
        };

        Ok(SavedFiles { list, details })
    }
}

impl ResultSink for FileSink {
    fn record(&mut self, kind: ProxyKind, results: &[VerifiedProxy]) -> Result<()> {
        let saved = self.save(kind, results)?;
        info!(
            %kind,
            count = results.len(),
            path = %saved.list.display(),
            "saved verified proxies"
        );
        self.last_saved = Some(saved);
        Ok(())
    }
}
