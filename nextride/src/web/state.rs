//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedSource;
use crate::geolocate::FixedGeolocator;
use crate::realtime::RealtimeClient;
use crate::resolver::DepartureService;
use crate::schedule::ScheduleClient;
use crate::stops::StopCatalogClient;

/// The departure service as wired for the server.
pub type Service =
    DepartureService<FixedGeolocator, StopCatalogClient, CachedSource<RealtimeClient>, ScheduleClient>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Stop lookup and departure resolution
    pub service: Arc<Service>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(service: Service) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
