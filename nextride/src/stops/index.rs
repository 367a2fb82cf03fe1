//! In-memory stop index with nearest-neighbour queries.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::domain::{Coordinate, RankedStop, Stop, StopCode};

use super::client::StopCatalogSource;
use super::error::CatalogError;

/// The loaded catalog. Immutable once built.
#[derive(Debug)]
struct Catalog {
    stops: Vec<Stop>,
    by_code: HashMap<StopCode, usize>,
}

impl Catalog {
    fn new(stops: Vec<Stop>) -> Self {
        let by_code = stops
            .iter()
            .enumerate()
            .map(|(i, s)| (s.code.clone(), i))
            .collect();
        Self { stops, by_code }
    }
}

/// Catalog of known stops, fetched once per process.
///
/// The first call to [`load`](Self::load) fetches the catalog; every later
/// call returns the outcome of that first fetch, success or failure.
/// Concurrent first calls share a single fetch.
pub struct StopIndex<C> {
    source: C,
    catalog: OnceCell<Result<Arc<Catalog>, CatalogError>>,
}

impl<C: StopCatalogSource> StopIndex<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            catalog: OnceCell::new(),
        }
    }

    /// Fetch the catalog if it has not been fetched yet.
    ///
    /// Returns the number of stops loaded. A failed load is sticky: the
    /// same error is returned on every later call and no fetch is retried.
    pub async fn load(&self) -> Result<usize, CatalogError> {
        let outcome = self
            .catalog
            .get_or_init(|| async {
                match self.source.fetch_all().await {
                    Ok(stops) => {
                        info!(count = stops.len(), "stop catalog loaded");
                        Ok(Arc::new(Catalog::new(stops)))
                    }
                    Err(e) => {
                        error!("stop catalog load failed: {e}");
                        Err(e)
                    }
                }
            })
            .await;

        outcome.as_ref().map(|c| c.stops.len()).map_err(Clone::clone)
    }

    fn loaded(&self) -> Result<&Catalog, CatalogError> {
        match self.catalog.get() {
            None => Err(CatalogError::NotLoaded),
            Some(Ok(catalog)) => Ok(catalog),
            Some(Err(e)) => Err(e.clone()),
        }
    }

    /// Up to `max_results` stops within `max_radius_km` of `origin`,
    /// closest first. Empty when nothing is within range.
    pub fn nearest(
        &self,
        origin: Coordinate,
        max_results: usize,
        max_radius_km: f64,
    ) -> Result<Vec<RankedStop>, CatalogError> {
        let catalog = self.loaded()?;
        Ok(rank_nearest(&catalog.stops, origin, max_results, max_radius_km))
    }

    /// Look up a single stop by code.
    pub fn get(&self, code: &StopCode) -> Result<Option<Stop>, CatalogError> {
        let catalog = self.loaded()?;
        Ok(catalog.by_code.get(code).map(|&i| catalog.stops[i].clone()))
    }

    /// Case-insensitive substring search on stop name and town, ordered by
    /// name.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<Stop>, CatalogError> {
        let catalog = self.loaded()?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches: Vec<&Stop> = catalog
            .stops
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&needle)
                    || s.town
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(&needle))
                    || s.display_name().to_lowercase().contains(&needle)
            })
            .collect();

        matches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
        Ok(matches.into_iter().take(limit).cloned().collect())
    }

    /// Number of stops, or `None` before a successful load.
    pub fn stop_count(&self) -> Option<usize> {
        self.loaded().ok().map(|c| c.stops.len())
    }
}

/// Rank stops by haversine distance from `origin`.
///
/// Stops farther than `max_radius_km` are excluded; ties are broken by
/// stop code so the result is deterministic.
pub fn rank_nearest(
    stops: &[Stop],
    origin: Coordinate,
    max_results: usize,
    max_radius_km: f64,
) -> Vec<RankedStop> {
    let mut ranked: Vec<RankedStop> = stops
        .iter()
        .filter_map(|stop| {
            let distance_km = origin.distance_km(&stop.location);
            (distance_km <= max_radius_km).then(|| RankedStop {
                stop: stop.clone(),
                distance_km,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.stop.code.cmp(&b.stop.code))
    });
    ranked.truncate(max_results);
    ranked
}

/// A catalog source serving a fixed list of stops.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    stops: Vec<Stop>,
}

impl StaticCatalog {
    pub fn new(stops: Vec<Stop>) -> Self {
        Self { stops }
    }
}

impl StopCatalogSource for StaticCatalog {
    async fn fetch_all(&self) -> Result<Vec<Stop>, CatalogError> {
        Ok(self.stops.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn stop(code: &str, name: &str, town: Option<&str>, lat: f64, lon: f64) -> Stop {
        Stop {
            code: StopCode::parse(code).unwrap(),
            name: name.to_string(),
            town: town.map(str::to_string),
            location: Coordinate::new(lat, lon).unwrap(),
        }
    }

    fn haarlem_stops() -> Vec<Stop> {
        vec![
            stop("hlmspa", "Spaarne", Some("Haarlem"), 52.3810, 4.6410),
            stop("hlmcen", "Station", Some("Haarlem"), 52.3873, 4.6383),
            stop("hlmgrm", "Grote Markt", Some("Haarlem"), 52.3812, 4.6365),
            stop("asdcs", "Centraal Station", Some("Amsterdam"), 52.3791, 4.9003),
        ]
    }

    /// Counts fetches; optionally fails.
    struct CountingCatalog {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StopCatalogSource for CountingCatalog {
        async fn fetch_all(&self) -> Result<Vec<Stop>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(CatalogError::Unavailable {
                    message: "connection refused".to_string(),
                })
            } else {
                Ok(haarlem_stops())
            }
        }
    }

    #[tokio::test]
    async fn load_is_idempotent() {
        let index = StopIndex::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            fail: false,
        });

        assert_eq!(index.load().await, Ok(4));
        assert_eq!(index.load().await, Ok(4));
        assert_eq!(index.load().await, Ok(4));
        assert_eq!(index.source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(index.stop_count(), Some(4));
    }

    #[tokio::test]
    async fn failed_load_is_sticky() {
        let index = StopIndex::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            fail: true,
        });

        let first = index.load().await;
        assert!(matches!(first, Err(CatalogError::Unavailable { .. })));
        assert_eq!(index.load().await, first);
        assert_eq!(index.source.calls.load(Ordering::SeqCst), 1);

        let origin = Coordinate::new(52.38, 4.64).unwrap();
        assert_eq!(index.nearest(origin, 5, 10.0), Err(first.unwrap_err()));
    }

    #[test]
    fn query_before_load_is_not_loaded() {
        let index = StopIndex::new(StaticCatalog::new(haarlem_stops()));
        let origin = Coordinate::new(52.38, 4.64).unwrap();
        assert_eq!(index.nearest(origin, 5, 10.0), Err(CatalogError::NotLoaded));
        assert_eq!(index.stop_count(), None);
    }

    #[tokio::test]
    async fn nearest_orders_by_distance_within_radius() {
        let index = StopIndex::new(StaticCatalog::new(haarlem_stops()));
        index.load().await.unwrap();

        let origin = Coordinate::new(52.3811, 4.6400).unwrap();
        let ranked = index.nearest(origin, 10, 2.0).unwrap();
        let codes: Vec<_> = ranked.iter().map(|r| r.stop.code.as_str()).collect();

        // Amsterdam is ~18 km away and excluded.
        assert_eq!(codes, ["hlmspa", "hlmgrm", "hlmcen"]);
        assert!(ranked[0].distance_km < 0.1);
    }

    #[tokio::test]
    async fn nearest_empty_when_nothing_in_radius() {
        let index = StopIndex::new(StaticCatalog::new(haarlem_stops()));
        index.load().await.unwrap();

        let utrecht = Coordinate::new(52.0894, 5.1100).unwrap();
        assert_eq!(index.nearest(utrecht, 10, 10.0), Ok(vec![]));
    }

    #[test]
    fn ties_broken_by_code() {
        let stops = vec![
            stop("b", "B", None, 52.0, 4.0),
            stop("a", "A", None, 52.0, 4.0),
            stop("c", "C", None, 52.0, 4.0),
        ];
        let origin = Coordinate::new(52.0, 4.0).unwrap();
        let codes: Vec<_> = rank_nearest(&stops, origin, 2, 1.0)
            .into_iter()
            .map(|r| r.stop.code.to_string())
            .collect();
        assert_eq!(codes, ["a", "b"]);
    }

    #[tokio::test]
    async fn get_by_code() {
        let index = StopIndex::new(StaticCatalog::new(haarlem_stops()));
        index.load().await.unwrap();

        let found = index.get(&StopCode::parse("hlmcen").unwrap()).unwrap();
        assert_eq!(found.map(|s| s.name), Some("Station".to_string()));
        assert_eq!(index.get(&StopCode::parse("nope").unwrap()), Ok(None));
    }

    #[tokio::test]
    async fn search_matches_name_and_town() {
        let index = StopIndex::new(StaticCatalog::new(haarlem_stops()));
        index.load().await.unwrap();

        let names: Vec<_> = index
            .search("station", 10)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Centraal Station", "Station"]);

        let haarlem = index.search("HAARLEM", 2).unwrap();
        assert_eq!(haarlem.len(), 2);
        assert_eq!(haarlem[0].name, "Grote Markt");

        assert_eq!(index.search("haarlem spaarne", 10).unwrap().len(), 0);
        assert_eq!(index.search("haarlem, spaarne", 10).unwrap().len(), 1);
        assert!(index.search("  ", 10).unwrap().is_empty());
    }
}
