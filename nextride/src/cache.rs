//! Caching layer for departure sources.
//!
//! Public transit APIs ask clients to keep request rates low. Boards are
//! cached per stop for a short TTL; failures are never cached, so an empty
//! or unreachable stop is asked again on the next query.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{DepartureQueryResult, SourceKind, StopCode};
use crate::source::{DepartureSource, SourceError};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 1000,
        }
    }
}

/// A departure source with a per-stop result cache.
pub struct CachedSource<S> {
    inner: S,
    boards: MokaCache<StopCode, Arc<DepartureQueryResult>>,
}

impl<S: DepartureSource> CachedSource<S> {
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, boards }
    }

    /// Access the underlying source for calls that bypass the cache.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.boards.invalidate_all();
    }
}

impl<S: DepartureSource> DepartureSource for CachedSource<S> {
    fn kind(&self) -> SourceKind {
        self.inner.kind()
    }

    async fn fetch(&self, stop: &StopCode) -> Result<DepartureQueryResult, SourceError> {
        if let Some(cached) = self.boards.get(stop).await {
            trace!(stop = %stop, "cache hit");
            return Ok(cached.as_ref().clone());
        }

        let result = self.inner.fetch(stop).await?;
        self.boards
            .insert(stop.clone(), Arc::new(result.clone()))
            .await;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Departure, TransportType};
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        answer: Result<(), SourceError>,
    }

    impl Counting {
        fn new(answer: Result<(), SourceError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer,
            }
        }
    }

    impl DepartureSource for Counting {
        fn kind(&self) -> SourceKind {
            SourceKind::Realtime
        }

        async fn fetch(&self, stop: &StopCode) -> Result<DepartureQueryResult, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()?;
            Ok(DepartureQueryResult {
                stop_name: "Spaarne".to_string(),
                stop_code: stop.clone(),
                departures: vec![Departure {
                    line: "3".to_string(),
                    destination: "Centrum".to_string(),
                    transport: TransportType::Bus,
                    scheduled_time: Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap(),
                    delay_minutes: 0,
                    is_realtime: true,
                    platform: None,
                    cancelled: false,
                }],
                source: SourceKind::Realtime,
            })
        }
    }

    fn code(s: &str) -> StopCode {
        StopCode::parse(s).unwrap()
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(30));
        assert_eq!(config.max_capacity, 1000);
    }

    #[tokio::test]
    async fn repeated_fetch_served_from_cache() {
        let cached = CachedSource::new(Counting::new(Ok(())), &CacheConfig::default());

        let first = cached.fetch(&code("hlmspa")).await.unwrap();
        let second = cached.fetch(&code("hlmspa")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.kind(), SourceKind::Realtime);
    }

    #[tokio::test]
    async fn stops_cached_separately() {
        let cached = CachedSource::new(Counting::new(Ok(())), &CacheConfig::default());

        cached.fetch(&code("hlmspa")).await.unwrap();
        cached.fetch(&code("hlmcen")).await.unwrap();

        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_not_cached() {
        let cached = CachedSource::new(Counting::new(Err(SourceError::NoData)), &CacheConfig::default());

        assert_eq!(cached.fetch(&code("hlmspa")).await, Err(SourceError::NoData));
        assert_eq!(cached.fetch(&code("hlmspa")).await, Err(SourceError::NoData));

        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cached = CachedSource::new(Counting::new(Ok(())), &CacheConfig::default());

        cached.fetch(&code("hlmspa")).await.unwrap();
        cached.invalidate_all();
        cached.fetch(&code("hlmspa")).await.unwrap();

        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    }
}
