//! User-facing query errors.

use crate::domain::{SourceKind, StopCode};
use crate::geolocate::LocateError;
use crate::stops::CatalogError;

/// Terminal outcome of a departure query that produced no result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("could not determine location: {0}")]
    Location(#[from] LocateError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("no stops within {radius_km} km")]
    NoStopsNearby { radius_km: f64 },

    #[error("unknown stop: {0}")]
    UnknownStop(StopCode),

    /// Every candidate and the scheduled fallback came up empty.
    #[error(
        "no departures found at {candidates_tried} nearby stops. {hint}{}",
        last_error_suffix(.last_error)
    )]
    NoDeparturesAvailable {
        candidates_tried: usize,
        hint: String,
        /// The last transport-level failure, if any.
        last_error: Option<String>,
    },

    /// A provider returned data of the wrong shape.
    #[error("{kind} source returned a malformed payload for {stop}: {message}")]
    MalformedPayload {
        kind: SourceKind,
        stop: StopCode,
        message: String,
    },

    /// A newer query started in the same session.
    #[error("query superseded by a newer one")]
    Superseded,
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(" (last error: {e})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = QueryError::NoDeparturesAvailable {
            candidates_tried: 10,
            hint: "Night service; most lines do not run until morning.".to_string(),
            last_error: None,
        };
        assert_eq!(
            err.to_string(),
            "no departures found at 10 nearby stops. Night service; most lines do not run until morning."
        );

        let err = QueryError::NoDeparturesAvailable {
            candidates_tried: 10,
            hint: "Evening service; fewer lines are running.".to_string(),
            last_error: Some("scheduled hlmspa: HTTP 502".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "no departures found at 10 nearby stops. Evening service; fewer lines are running. (last error: scheduled hlmspa: HTTP 502)"
        );

        let err: QueryError = LocateError::PermissionDenied.into();
        assert_eq!(
            err.to_string(),
            "could not determine location: location permission denied"
        );

        let err: QueryError = CatalogError::NotLoaded.into();
        assert_eq!(err.to_string(), "stop catalog not loaded");
    }
}
