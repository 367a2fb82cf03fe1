//! Real-time first, scheduled second departure resolution.
//!
//! Candidates are tried strictly in order, one call at a time: real-time on
//! each candidate, then scheduled on the closest. The first non-empty board
//! wins. Empty and unavailable answers move on to the next step; a
//! malformed payload stops the chain.

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use crate::domain::{DepartureQueryResult, RankedStop, Stop};
use crate::source::{DepartureSource, SourceError};

use super::config::ResolverConfig;
use super::error::QueryError;
use super::gate::QueryTicket;
use super::hint::service_hint;

/// Resolution progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Real-time on the candidate at this index.
    Realtime(usize),
    /// Scheduled on the closest candidate.
    Scheduled,
}

/// Runs the fallback chain over a real-time and a scheduled source.
#[derive(Debug, Clone)]
pub struct FallbackResolver<R, S> {
    realtime: R,
    scheduled: S,
    max_candidates: usize,
    max_radius_km: f64,
    fetch_timeout: Duration,
    timezone: Tz,
}

impl<R: DepartureSource, S: DepartureSource> FallbackResolver<R, S> {
    pub fn new(realtime: R, scheduled: S, config: &ResolverConfig) -> Self {
        Self {
            realtime,
            scheduled,
            max_candidates: config.max_candidates,
            max_radius_km: config.max_radius_km,
            fetch_timeout: config.fetch_timeout(),
            timezone: config.timezone,
        }
    }

    /// Resolve departures for ranked candidates, closest first.
    pub async fn resolve(
        &self,
        candidates: &[RankedStop],
        ticket: &QueryTicket,
    ) -> Result<DepartureQueryResult, QueryError> {
        let stops: Vec<&Stop> = candidates.iter().map(|c| &c.stop).collect();
        self.resolve_stops(&stops, ticket, Utc::now()).await
    }

    /// Resolve departures for a single stop.
    pub async fn resolve_stop(
        &self,
        stop: &Stop,
        ticket: &QueryTicket,
    ) -> Result<DepartureQueryResult, QueryError> {
        self.resolve_stops(&[stop], ticket, Utc::now()).await
    }

    async fn resolve_stops(
        &self,
        candidates: &[&Stop],
        ticket: &QueryTicket,
        now: DateTime<Utc>,
    ) -> Result<DepartureQueryResult, QueryError> {
        let candidates = &candidates[..candidates.len().min(self.max_candidates)];
        let Some(closest) = candidates.first() else {
            return Err(QueryError::NoStopsNearby {
                radius_km: self.max_radius_km,
            });
        };

        let mut step = Step::Realtime(0);
        let mut last_error: Option<String> = None;

        loop {
            if !ticket.is_current() {
                info!(ticket = ticket.id(), "query superseded, abandoning");
                return Err(QueryError::Superseded);
            }

            let (source_result, stop) = match step {
                Step::Realtime(i) => {
                    let stop = candidates[i];
                    (self.attempt(&self.realtime, stop).await, stop)
                }
                Step::Scheduled => (self.attempt(&self.scheduled, closest).await, *closest),
            };

            let kind = match step {
                Step::Realtime(_) => self.realtime.kind(),
                Step::Scheduled => self.scheduled.kind(),
            };

            match source_result {
                Ok(result) => {
                    if !ticket.is_current() {
                        info!(ticket = ticket.id(), "query superseded, dropping result");
                        return Err(QueryError::Superseded);
                    }
                    info!(
                        stop = %stop.code,
                        source = %kind,
                        count = result.departures.len(),
                        "departures found"
                    );
                    return Ok(result);
                }
                Err(SourceError::NoData) => {
                    debug!(stop = %stop.code, source = %kind, "no departures");
                }
                Err(SourceError::Unavailable(message)) => {
                    warn!(stop = %stop.code, source = %kind, "source unavailable: {message}");
                    last_error = Some(format!("{kind} {}: {message}", stop.code));
                }
                Err(SourceError::Malformed(message)) => {
                    error!(stop = %stop.code, source = %kind, "malformed payload: {message}");
                    return Err(QueryError::MalformedPayload {
                        kind,
                        stop: stop.code.clone(),
                        message,
                    });
                }
            }

            step = match step {
                Step::Realtime(i) if i + 1 < candidates.len() => Step::Realtime(i + 1),
                Step::Realtime(_) => Step::Scheduled,
                Step::Scheduled => {
                    let hint = service_hint(&now.with_timezone(&self.timezone));
                    info!(candidates = candidates.len(), "no departures from any source");
                    return Err(QueryError::NoDeparturesAvailable {
                        candidates_tried: candidates.len(),
                        hint,
                        last_error,
                    });
                }
            };
        }
    }

    /// One source call under the fetch deadline. An empty board counts as
    /// no data.
    async fn attempt<D: DepartureSource>(
        &self,
        source: &D,
        stop: &Stop,
    ) -> Result<DepartureQueryResult, SourceError> {
        match tokio::time::timeout(self.fetch_timeout, source.fetch(&stop.code)).await {
            Ok(Ok(result)) if result.departures.is_empty() => Err(SourceError::NoData),
            Ok(result) => result,
            Err(_) => Err(SourceError::Unavailable("timed out".to_string())),
        }
    }
}
