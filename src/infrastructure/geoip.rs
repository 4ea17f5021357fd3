//! Country resolution for click analytics.
//!
//! Backed by a local MaxMind GeoLite2 database (City or Country editions
//! both work; only the country record is read). Lookups run inside the
//! click worker, never on the redirect path, and resolve to `None` whenever
//! no database is configured or an address is not covered.

use maxminddb::Reader;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolves an IP address to an ISO 3166-1 alpha-2 country code.
pub trait GeoResolver: Send + Sync {
    fn country(&self, ip: IpAddr) -> Option<String>;
}

/// MaxMind-backed resolver reading a local `.mmdb` file.
pub struct MaxMindResolver {
    reader: Reader<Vec<u8>>,
}

impl MaxMindResolver {
    /// Loads the database from disk.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when the file is missing or not a valid
    /// MaxMind database.
    pub fn open(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self { reader })
    }
}

impl GeoResolver for MaxMindResolver {
    fn country(&self, ip: IpAddr) -> Option<String> {
        let result = self.reader.lookup(ip).ok()?;
        let record: maxminddb::geoip2::Country = result.decode().ok()??;
        record.country.iso_code.map(String::from)
    }
}

/// Resolver used when no database is configured; every lookup misses.
pub struct DisabledGeo;

impl GeoResolver for DisabledGeo {
    fn country(&self, _ip: IpAddr) -> Option<String> {
        None
    }
}

/// Picks the resolver for the configured database path.
///
/// A missing or unreadable database downgrades to [`DisabledGeo`] with a
/// warning instead of failing startup; clicks are still recorded, just
/// without a country.
pub fn from_path(path: Option<&str>) -> Arc<dyn GeoResolver> {
    match path {
        Some(path) => match MaxMindResolver::open(path) {
            Ok(resolver) => {
                info!("GeoIP: using MaxMind database at {}", path);
                Arc::new(resolver)
            }
            Err(e) => {
                warn!("GeoIP: failed to load MaxMind database at {}: {}", path, e);
                Arc::new(DisabledGeo)
            }
        },
        None => {
            debug!("GeoIP: no database configured, clicks carry no country");
            Arc::new(DisabledGeo)
        }
    }
}
