//! Catalog of public proxy list providers

use crate::error::InputError;
use crate::proxy::models::{ProxyKind, TimeoutBound};
use crate::Result;
use anyhow::Context;
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;

/// Placeholder substituted with the timeout bound in address templates
pub const TIMEOUT_PLACEHOLDER: &str = "{timeout}";

static BUILTIN_SOURCES: Lazy<Vec<ProxySource>> = Lazy::new(|| {
    vec![
        ProxySource::new(
            "proxyscrape",
            "https://api.proxyscrape.com/v2/?request=getproxies&protocol=http&timeout={timeout}&country=all&ssl=all&anonymity=all",
            ProxyKind::Http,
        ),
        ProxySource::new(
            "proxyscan",
            "https://www.proxyscan.io/download?type=http&timeout={timeout}",
            ProxyKind::Http,
        ),
        ProxySource::new(
            "proxylist",
            "https://www.proxy-list.download/api/v1/get?type=http&timeout={timeout}",
            ProxyKind::Http,
        ),
        ProxySource::new(
            "proxyscrape",
            "https://api.proxyscrape.com/v2/?request=getproxies&protocol=socks4&timeout={timeout}&country=all",
            ProxyKind::Socks4,
        ),
        ProxySource::new(
            "proxyscan",
            "https://www.proxyscan.io/download?type=socks4&timeout={timeout}",
            ProxyKind::Socks4,
        ),
        ProxySource::new(
            "proxyscrape",
            "https://api.proxyscrape.com/v2/?request=getproxies&protocol=socks5&timeout={timeout}&country=all",
            ProxyKind::Socks5,
        ),
        ProxySource::new(
            "proxyscan",
            "https://www.proxyscan.io/download?type=socks5&timeout={timeout}",
            ProxyKind::Socks5,
        ),
    ]
});

/// A provider publishing a newline separated list of `host:port` entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySource {
    /// Name of the provider
    pub name: String,
    /// Retrieval address, may contain `{timeout}`
    pub url_template: String,
    /// Kind of proxies the list contains
    pub kind: ProxyKind,
}

impl ProxySource {
    pub fn new(name: &str, url_template: &str, kind: ProxyKind) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
            kind,
        }
    }

    /// Request address with the timeout bound filled in
    pub fn url(&self, bound: TimeoutBound) -> String {
        self.url_template
            .replace(TIMEOUT_PLACEHOLDER, &bound.secs().to_string())
    }
}

/// Fixed set of sources, grouped by kind in registration order
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<ProxySource>,
}

impl SourceRegistry {
    /// Registry without any source
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the built-in providers
    pub fn builtin() -> Self {
        Self {
            sources: BUILTIN_SOURCES.clone(),
        }
    }

    pub fn with_source(mut self, source: ProxySource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn extend(&mut self, sources: impl IntoIterator<Item = ProxySource>) {
        self.sources.extend(sources);
    }

    /// Sources serving the given kind, in registration order
    pub fn sources_for(&self, kind: ProxyKind) -> Vec<ProxySource> {
        self.sources
            .iter()
            .filter(|s| s.kind == kind)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> &[ProxySource] {
        &self.sources
    }

    /// Parse a sources file.
    ///
    /// One source per line as `<kind> <name> <url-template>`. Blank lines and
    /// lines starting with `#` are skipped.
    pub fn parse_sources(content: &str) -> std::result::Result<Vec<ProxySource>, InputError> {
        let mut sources = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let malformed = || InputError::MalformedSourceLine { line: idx + 1 };
            let mut parts = trimmed.split_whitespace();
            let (Some(kind), Some(name), Some(url), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Err(malformed());
            };

            let kind: ProxyKind = kind.parse().map_err(|_| malformed())?;
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(malformed());
            }
            sources.push(ProxySource::new(name, url, kind));
        }

        Ok(sources)
    }

    /// Load a sources file and append its entries
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sources file {}", path.display()))?;
        let sources = Self::parse_sources(&content)
            .with_context(|| format!("parsing sources file {}", path.display()))?;
        let count = sources.len();
        self.extend(sources);
        Ok(count)
    }
}
