//! Offline country lookup for proxy hosts using an MMDB database
//!
//! Used only when the verification response carries no country.

use crate::Result;
use maxminddb::{geoip2, Reader};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// Resolves the country of a proxy host without a network request
pub trait CountryLookup: Send + Sync + std::fmt::Debug {
    fn country(&self, host: &str) -> Option<String>;
}

/// Country resolver backed by a MaxMind (or compatible) database
#[derive(Clone)]
pub struct GeoLocator {
    reader: Arc<Reader<Vec<u8>>>,
}

impl GeoLocator {
    /// Open an MMDB file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    fn lookup_country(&self, ip: IpAddr) -> Result<Option<String>> {
        let lookup_result = self.reader.lookup(ip)?;
        let country: Option<geoip2::Country> = lookup_result.decode()?;

        Ok(country.and_then(|c| {
            c.country
                .names
                .english
                .map(String::from)
                .or_else(|| c.country.iso_code.map(String::from))
        }))
    }

    fn parse_ip(host: &str) -> Option<IpAddr> {
        host.parse().ok()
    }
}

impl CountryLookup for GeoLocator {
    /// English country name for a host, `None` for hostnames and unknown addresses
    fn country(&self, host: &str) -> Option<String> {
        let ip = Self::parse_ip(host)?;
        self.lookup_country(ip).ok().flatten()
    }
}

impl std::fmt::Debug for GeoLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoLocator").finish_non_exhaustive()
    }
}
