//! Ordering and truncation of departure boards.

use crate::domain::{Departure, DepartureQueryResult};

/// Sort chronologically, ties by line, then keep the first `limit`.
pub fn normalize(mut result: DepartureQueryResult, limit: usize) -> DepartureQueryResult {
    sort_departures(&mut result.departures);
    result.departures.truncate(limit);
    result
}

/// Sort by departure time, then line. Stable; no deduplication.
pub fn sort_departures(departures: &mut [Departure]) {
    departures.sort_by(|a, b| {
        a.scheduled_time
            .cmp(&b.scheduled_time)
            .then_with(|| a.line.cmp(&b.line))
    });
}
