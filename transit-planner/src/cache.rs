//! Caching layer for SWU API responses.
//!
//! Each planning call memoizes its own lookups, but concurrent and back-to-back
//! requests hit the same busy stops. A short TTL cache in front of the client
//! absorbs that without serving departures noticeably out of date. Failed
//! fetches are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::departures::{DepartureSource, SourceError};
use crate::domain::{Departure, StopId};
use crate::swu::SwuClient;

/// Which passage feed an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Departures,
    Arrivals,
}

/// Cache key: (stop, feed, requested limit).
type BoardKey = (StopId, Feed, usize);

/// Cached feed entry.
type BoardEntry = Arc<Vec<Departure>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Cache for passage feed responses.
pub struct BoardCache {
    boards: MokaCache<BoardKey, BoardEntry>,
}

impl BoardCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { boards }
    }

    pub async fn get(&self, key: &BoardKey) -> Option<BoardEntry> {
        self.boards.get(key).await
    }

    pub async fn insert(&self, key: BoardKey, entry: BoardEntry) {
        self.boards.insert(key, entry).await;
    }

    /// Approximate number of cached entries.
    pub fn entry_count(&self) -> u64 {
        self.boards.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.boards.invalidate_all();
    }

    /// Serve `key` from cache, or fetch and remember it on success.
    async fn get_or_fetch<F, Fut>(&self, key: BoardKey, fetch: F) -> Result<BoardEntry, SourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Departure>, SourceError>>,
    {
        if let Some(cached) = self.get(&key).await {
            trace!(stop = %key.0, feed = ?key.1, "Cache hit");
            return Ok(cached);
        }

        let entry = Arc::new(fetch().await?);
        self.insert(key, entry.clone()).await;
        trace!(stop = %key.0, feed = ?key.1, entries = self.entry_count(), "Cached feed");
        Ok(entry)
    }
}

/// Any departure source with caching.
///
/// Wraps a source (normally [`SwuClient`]) and caches its feed responses.
pub struct CachedSource<S> {
    source: S,
    cache: BoardCache,
}

/// The production client with caching.
pub type CachedSwuClient = CachedSource<SwuClient>;

impl<S: DepartureSource> CachedSource<S> {
    /// Create a new cached client.
    pub fn new(source: S, cache_config: &CacheConfig) -> Self {
        Self {
            source,
            cache: BoardCache::new(cache_config),
        }
    }

    /// Access the underlying source for operations that bypass cache.
    pub fn inner(&self) -> &S {
        &self.source
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}

impl<S: DepartureSource + Sync> DepartureSource for CachedSource<S> {
    async fn departures_from(
        &self,
        stop: StopId,
        limit: usize,
    ) -> Result<Vec<Departure>, SourceError> {
        let entry = self
            .cache
            .get_or_fetch((stop, Feed::Departures, limit), || {
                self.source.departures_from(stop, limit)
            })
            .await?;
        Ok(entry.as_ref().clone())
    }

    async fn arrivals_at(&self, stop: StopId, limit: usize) -> Result<Vec<Departure>, SourceError> {
        let entry = self
            .cache
            .get_or_fetch((stop, Feed::Arrivals, limit), || {
                self.source.arrivals_at(stop, limit)
            })
            .await?;
        Ok(entry.as_ref().clone())
    }
}
