//! Device position lookup.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::Coordinate;

/// Why a position could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location lookup timed out")]
    Timeout,

    #[error("location unavailable")]
    Unavailable,
}

/// A one-shot position provider. Implementations do not retry.
pub trait Geolocator: Send + Sync {
    fn locate(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Coordinate, LocateError>> + Send;
}

/// Run `geolocator` with a hard deadline.
///
/// An implementation that ignores its timeout argument is still cut off
/// and reported as [`LocateError::Timeout`].
pub async fn locate_within<G: Geolocator>(
    geolocator: &G,
    timeout: Duration,
) -> Result<Coordinate, LocateError> {
    match tokio::time::timeout(timeout, geolocator.locate(timeout)).await {
        Ok(Ok(position)) => {
            debug!(%position, "located");
            Ok(position)
        }
        Ok(Err(e)) => {
            warn!("location failed: {e}");
            Err(e)
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "location timed out");
            Err(LocateError::Timeout)
        }
    }
}

/// A geolocator reporting a configured position.
///
/// Stands in for device GPS on a server: the position is the configured
/// home location, or `Unavailable` when none is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinate>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinate>) -> Self {
        Self { position }
    }
}

impl Geolocator for FixedGeolocator {
    async fn locate(&self, _timeout: Duration) -> Result<Coordinate, LocateError> {
        self.position.ok_or(LocateError::Unavailable)
    }
}
