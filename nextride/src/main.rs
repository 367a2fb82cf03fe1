use std::error::Error;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nextride::cache::CachedSource;
use nextride::config::AppConfig;
use nextride::geolocate::FixedGeolocator;
use nextride::realtime::RealtimeClient;
use nextride::resolver::DepartureService;
use nextride::schedule::ScheduleClient;
use nextride::stops::{StopCatalogClient, StopIndex};
use nextride::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nextride=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let realtime = CachedSource::new(RealtimeClient::new(config.realtime.clone())?, &config.cache);
    let scheduled = ScheduleClient::new(config.schedule.clone())?;
    if !scheduled.is_configured() {
        warn!("NEXTRIDE_SCHEDULE_URL not set; timetable fallback disabled");
    }
    if config.home.is_none() {
        warn!("NEXTRIDE_HOME_LAT/LON not set; /api/departures needs lat and lon");
    }

    let index = StopIndex::new(StopCatalogClient::new(config.catalog.clone())?);
    let service = DepartureService::new(
        FixedGeolocator::new(config.home),
        index,
        realtime,
        scheduled,
        config.resolver.clone(),
    );
    let state = AppState::new(service);

    // Warm the stop catalog without delaying startup; queries load it on
    // demand if this has not finished.
    let warm = state.clone();
    // The index logs the outcome itself.
    tokio::spawn(async move {
        let _ = warm.service.index().load().await;
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "nextride listening");
    axum::serve(listener, app).await?;

    Ok(())
}
