//! The departure query entry point.

use std::fmt;

use tracing::{debug, info};

use crate::domain::{Coordinate, DepartureQueryResult, StopCode};
use crate::geolocate::{Geolocator, locate_within};
use crate::source::DepartureSource;
use crate::stops::{StopCatalogSource, StopIndex};

use super::config::ResolverConfig;
use super::error::QueryError;
use super::fallback::FallbackResolver;
use super::gate::QueryTicket;
use super::normalize::normalize;

/// What to find departures for.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTarget {
    /// Wherever the geolocator says we are.
    CurrentLocation,
    Coordinates(Coordinate),
    SavedStop(StopCode),
}

/// Phases reported while a query runs, for loading indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Locating,
    SearchingStops,
    LoadingDepartures,
}

impl fmt::Display for QueryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryPhase::Locating => f.write_str("locating"),
            QueryPhase::SearchingStops => f.write_str("searching stops"),
            QueryPhase::LoadingDepartures => f.write_str("loading departures"),
        }
    }
}

/// Receives phase transitions. `()` ignores them.
pub trait QueryProgress {
    fn phase(&self, phase: QueryPhase);
}

impl QueryProgress for () {
    fn phase(&self, _phase: QueryPhase) {}
}

impl<F: Fn(QueryPhase)> QueryProgress for F {
    fn phase(&self, phase: QueryPhase) {
        self(phase)
    }
}

/// Locates stops and resolves their departures.
pub struct DepartureService<G, C, R, S> {
    geolocator: G,
    index: StopIndex<C>,
    resolver: FallbackResolver<R, S>,
    config: ResolverConfig,
}

impl<G, C, R, S> DepartureService<G, C, R, S>
where
    G: Geolocator,
    C: StopCatalogSource,
    R: DepartureSource,
    S: DepartureSource,
{
    pub fn new(
        geolocator: G,
        index: StopIndex<C>,
        realtime: R,
        scheduled: S,
        config: ResolverConfig,
    ) -> Self {
        let resolver = FallbackResolver::new(realtime, scheduled, &config);
        Self {
            geolocator,
            index,
            resolver,
            config,
        }
    }

    pub fn index(&self) -> &StopIndex<C> {
        &self.index
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve departures for `target`.
    ///
    /// Reports each phase to `progress` as it starts. Abandons the query
    /// with [`QueryError::Superseded`] once `ticket` goes stale.
    pub async fn resolve<P: QueryProgress + Sync>(
        &self,
        target: QueryTarget,
        progress: &P,
        ticket: &QueryTicket,
    ) -> Result<DepartureQueryResult, QueryError> {
        debug!(?target, ticket = ticket.id(), "query started");

        match target {
            QueryTarget::CurrentLocation => {
                progress.phase(QueryPhase::Locating);
                let position = locate_within(&self.geolocator, self.config.locate_timeout()).await?;
                ensure_current(ticket)?;
                self.resolve_near(position, progress, ticket).await
            }
            QueryTarget::Coordinates(position) => {
                self.resolve_near(position, progress, ticket).await
            }
            QueryTarget::SavedStop(code) => self.resolve_saved(code, progress, ticket).await,
        }
    }

    async fn resolve_near<P: QueryProgress + Sync>(
        &self,
        position: Coordinate,
        progress: &P,
        ticket: &QueryTicket,
    ) -> Result<DepartureQueryResult, QueryError> {
        progress.phase(QueryPhase::SearchingStops);
        self.index.load().await?;
        let candidates = self.index.nearest(
            position,
            self.config.max_candidates,
            self.config.max_radius_km,
        )?;

        if candidates.is_empty() {
            info!(%position, radius_km = self.config.max_radius_km, "no stops nearby");
            return Err(QueryError::NoStopsNearby {
                radius_km: self.config.max_radius_km,
            });
        }
        debug!(count = candidates.len(), "candidate stops");
        ensure_current(ticket)?;

        progress.phase(QueryPhase::LoadingDepartures);
        let result = self.resolver.resolve(&candidates, ticket).await?;
        Ok(normalize(result, self.config.display_limit))
    }

    async fn resolve_saved<P: QueryProgress + Sync>(
        &self,
        code: StopCode,
        progress: &P,
        ticket: &QueryTicket,
    ) -> Result<DepartureQueryResult, QueryError> {
        progress.phase(QueryPhase::SearchingStops);
        self.index.load().await?;
        let stop = self
            .index
            .get(&code)?
            .ok_or(QueryError::UnknownStop(code))?;
        ensure_current(ticket)?;

        progress.phase(QueryPhase::LoadingDepartures);
        let result = self.resolver.resolve_stop(&stop, ticket).await?;
        Ok(normalize(result, self.config.display_limit))
    }
}

fn ensure_current(ticket: &QueryTicket) -> Result<(), QueryError> {
    if ticket.is_current() {
        Ok(())
    } else {
        Err(QueryError::Superseded)
    }
}
