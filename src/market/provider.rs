//! Market data provider boundary
//!
//! The engine never fetches anything itself: it accepts a [`MarketSnapshot`]
//! as a plain value. Implementations of [`MarketDataProvider`] own whatever
//! fetch, parse, and caching policy they need behind this trait.

use super::data::{MarketSnapshot, UserPosition};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by market data providers
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The queried address has no stake or pledge with the protocol.
    /// Surfaced explicitly rather than defaulting to a zero-filled position.
    #[error("address {address:?} is not participating in the farm")]
    NotParticipating { address: String },

    #[error("failed to read market data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse market data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Supplier of market snapshots and user positions
pub trait MarketDataProvider {
    /// Fetch the current market snapshot
    fn snapshot(&self) -> Result<MarketSnapshot, ProviderError>;

    /// Fetch the position held by the given address
    fn user_position(&self, address: &str) -> Result<UserPosition, ProviderError>;
}

/// Provider backed by JSON documents on disk.
///
/// The snapshot file holds a single [`MarketSnapshot`]; the positions file
/// holds an address -> [`UserPosition`] map.
#[derive(Debug, Clone)]
pub struct FileProvider {
    snapshot_path: PathBuf,
    positions_path: PathBuf,
}

impl FileProvider {
    pub fn new<P: AsRef<Path>>(snapshot_path: P, positions_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
            positions_path: positions_path.as_ref().to_path_buf(),
        }
    }
}

impl MarketDataProvider for FileProvider {
    fn snapshot(&self) -> Result<MarketSnapshot, ProviderError> {
        let reader = BufReader::new(File::open(&self.snapshot_path)?);
        let mut snapshot: MarketSnapshot = serde_json::from_reader(reader)?;
        if snapshot.fetched_at.is_none() {
            snapshot.fetched_at = Some(Utc::now());
        }
        Ok(snapshot)
    }

    fn user_position(&self, address: &str) -> Result<UserPosition, ProviderError> {
        let reader = BufReader::new(File::open(&self.positions_path)?);
        let positions: HashMap<String, UserPosition> = serde_json::from_reader(reader)?;
        positions
            .get(address)
            .cloned()
            .ok_or_else(|| ProviderError::NotParticipating {
                address: address.to_string(),
            })
    }
}

/// TTL cache wrapped around any provider.
///
/// Entries are keyed by request parameters (the snapshot has one key; user
/// positions are keyed by address) and refreshed once older than the TTL.
/// `invalidate` drops everything for manual refresh.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    snapshot: Mutex<Option<(DateTime<Utc>, MarketSnapshot)>>,
    positions: Mutex<HashMap<String, (DateTime<Utc>, UserPosition)>>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            snapshot: Mutex::new(None),
            positions: Mutex::new(HashMap::new()),
        }
    }

    /// Drop all cached entries
    pub fn invalidate(&self) {
        *self.snapshot.lock().unwrap() = None;
        self.positions.lock().unwrap().clear();
        info!("market data cache invalidated");
    }

    fn fresh(&self, fetched: DateTime<Utc>) -> bool {
        Utc::now() - fetched < self.ttl
    }
}

impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    fn snapshot(&self) -> Result<MarketSnapshot, ProviderError> {
        let mut cached = self.snapshot.lock().unwrap();
        if let Some((fetched, snapshot)) = cached.as_ref() {
            if self.fresh(*fetched) {
                debug!("snapshot cache hit (fetched {})", fetched);
                return Ok(snapshot.clone());
            }
        }

        let snapshot = self.inner.snapshot()?;
        info!("snapshot cache refreshed");
        *cached = Some((Utc::now(), snapshot.clone()));
        Ok(snapshot)
    }

    fn user_position(&self, address: &str) -> Result<UserPosition, ProviderError> {
        let mut cached = self.positions.lock().unwrap();
        if let Some((fetched, position)) = cached.get(address) {
            if self.fresh(*fetched) {
                debug!("position cache hit for {}", address);
                return Ok(position.clone());
            }
        }

        let position = self.inner.user_position(address)?;
        cached.insert(address.to_string(), (Utc::now(), position.clone()));
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts fetches so cache behavior is observable
    struct CountingProvider {
        fetches: AtomicUsize,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl MarketDataProvider for CountingProvider {
        fn snapshot(&self) -> Result<MarketSnapshot, ProviderError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut prices = HashMap::new();
            prices.insert("yLUNA".to_string(), 80.0);
            Ok(MarketSnapshot::new(prices, 1_000_000.0, 10_000.0, 50_000.0))
        }

        fn user_position(&self, address: &str) -> Result<UserPosition, ProviderError> {
            if address == "terra1known" {
                Ok(UserPosition::new(500.0, 500.0))
            } else {
                Err(ProviderError::NotParticipating {
                    address: address.to_string(),
                })
            }
        }
    }

    #[test]
    fn test_cache_serves_fresh_entries() {
        let provider = CachedProvider::new(CountingProvider::new(), Duration::minutes(10));

        let first = provider.snapshot().unwrap();
        let second = provider.snapshot().unwrap();
        assert_eq!(first.total_staked_base, second.total_staked_base);
        assert_eq!(provider.inner.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let provider = CachedProvider::new(CountingProvider::new(), Duration::minutes(10));

        provider.snapshot().unwrap();
        provider.invalidate();
        provider.snapshot().unwrap();
        assert_eq!(provider.inner.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_expired_entries_refetch() {
        // Zero TTL: every read goes to the inner provider
        let provider = CachedProvider::new(CountingProvider::new(), Duration::zero());

        provider.snapshot().unwrap();
        provider.snapshot().unwrap();
        assert_eq!(provider.inner.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_not_participating_surfaced() {
        let provider = CachedProvider::new(CountingProvider::new(), Duration::minutes(10));

        assert!(provider.user_position("terra1known").is_ok());
        let err = provider.user_position("terra1unknown").unwrap_err();
        assert!(matches!(err, ProviderError::NotParticipating { .. }));
    }
}
