//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::domain::{Coordinate, DepartureQueryResult, StopCode};
use crate::resolver::{MAX_RADIUS_KM, QueryError, QueryPhase, QueryTarget, QueryTicket};
use crate::stops::CatalogError;

use super::dto::*;
use super::state::AppState;

const DEFAULT_NEARBY_LIMIT: usize = 10;
const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops/nearby", get(nearby_stops))
        .route("/api/stops/search", get(search_stops))
        .route("/api/stops/:code/departures", get(stop_departures))
        .route("/api/departures", get(departures))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Stops near a position, closest first.
async fn nearby_stops(
    State(state): State<AppState>,
    Query(req): Query<NearbyRequest>,
) -> Result<Json<NearbyResponse>, AppError> {
    let (origin, limit, radius_km) = nearby_params(&req, state.service.config().max_radius_km)?;

    let index = state.service.index();
    index.load().await?;
    let stops = index
        .nearest(origin, limit, radius_km)?
        .iter()
        .map(StopResult::from_ranked)
        .collect();

    Ok(Json(NearbyResponse { stops }))
}

/// Search stops by name or town.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchRequest>,
) -> Result<Json<StopSearchResponse>, AppError> {
    let (query, limit) = search_params(&req)?;

    let index = state.service.index();
    index.load().await?;
    let stops = index
        .search(&query, limit)?
        .iter()
        .map(StopResult::from_stop)
        .collect();

    Ok(Json(StopSearchResponse { query, stops }))
}

/// Departures near the given position, or near the server's own position.
async fn departures(
    State(state): State<AppState>,
    Query(req): Query<DeparturesRequest>,
) -> Result<Json<DeparturesResponse>, AppError> {
    let target = departures_target(&req)?;
    let result = run_query(&state, target).await?;
    Ok(Json(board_response(&state, &result, req.selected)))
}

/// Departures at a saved stop.
async fn stop_departures(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(req): Query<StopDeparturesRequest>,
) -> Result<Json<DeparturesResponse>, AppError> {
    let code = StopCode::parse(&code).map_err(|e| AppError::BadRequest {
        message: format!("Invalid stop code: {e}"),
    })?;

    let result = run_query(&state, QueryTarget::SavedStop(code)).await?;
    Ok(Json(board_response(&state, &result, req.selected)))
}

async fn run_query(
    state: &AppState,
    target: QueryTarget,
) -> Result<DepartureQueryResult, AppError> {
    // Each request is its own session, so nothing can supersede it.
    let ticket = QueryTicket::unguarded();
    let progress = |phase: QueryPhase| debug!(%phase, "query phase");

    Ok(state.service.resolve(target, &progress, &ticket).await?)
}

fn board_response(
    state: &AppState,
    result: &DepartureQueryResult,
    selected: Option<usize>,
) -> DeparturesResponse {
    DeparturesResponse::from_result(
        result,
        selected,
        Utc::now(),
        state.service.config().timezone,
    )
}

fn coordinate(lat: f64, lon: f64) -> Result<Coordinate, AppError> {
    Coordinate::new(lat, lon).map_err(|e| AppError::BadRequest {
        message: format!("Invalid coordinates: {e}"),
    })
}

fn limit(requested: Option<usize>, default: usize) -> Result<usize, AppError> {
    match requested.unwrap_or(default) {
        n if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        n => Err(AppError::BadRequest {
            message: format!("limit must be between 1 and {MAX_LIMIT}, got {n}"),
        }),
    }
}

fn nearby_params(
    req: &NearbyRequest,
    default_radius_km: f64,
) -> Result<(Coordinate, usize, f64), AppError> {
    let origin = coordinate(req.lat, req.lon)?;
    let limit = limit(req.limit, DEFAULT_NEARBY_LIMIT)?;

    let radius_km = req.radius_km.unwrap_or(default_radius_km);
    if !(radius_km > 0.0 && radius_km <= MAX_RADIUS_KM) {
        return Err(AppError::BadRequest {
            message: format!("radius_km must be in (0, {MAX_RADIUS_KM}], got {radius_km}"),
        });
    }

    Ok((origin, limit, radius_km))
}

fn search_params(req: &StopSearchRequest) -> Result<(String, usize), AppError> {
    let query = req.query.trim();
    let chars = query.chars().count();
    if !(2..=100).contains(&chars) {
        return Err(AppError::BadRequest {
            message: "query must be between 2 and 100 characters".to_string(),
        });
    }

    Ok((query.to_string(), limit(req.limit, DEFAULT_SEARCH_LIMIT)?))
}

fn departures_target(req: &DeparturesRequest) -> Result<QueryTarget, AppError> {
    match (req.lat, req.lon) {
        (Some(lat), Some(lon)) => Ok(QueryTarget::Coordinates(coordinate(lat, lon)?)),
        (None, None) => Ok(QueryTarget::CurrentLocation),
        _ => Err(AppError::BadRequest {
            message: "lat and lon must be given together".to_string(),
        }),
    }
}

/// Application error type.
#[derive(Debug, PartialEq)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    BadGateway { message: String },
    Unavailable { message: String },
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::BadGateway { message }
            | AppError::Unavailable { message } => message,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Unparseable { .. } => AppError::BadGateway {
                message: e.to_string(),
            },
            CatalogError::Unavailable { .. } | CatalogError::NotLoaded => AppError::Unavailable {
                message: e.to_string(),
            },
        }
    }
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::NoStopsNearby { .. }
            | QueryError::UnknownStop(_)
            | QueryError::NoDeparturesAvailable { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            QueryError::MalformedPayload { .. } => AppError::BadGateway {
                message: e.to_string(),
            },
            QueryError::Catalog(e) => e.into(),
            QueryError::Location(_) | QueryError::Superseded => AppError::Unavailable {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, "{}", self.message());
        } else {
            warn!(%status, "{}", self.message());
        }

        let body = Json(ErrorResponse {
            error: self.message().to_string(),
        });
        (status, body).into_response()
    }
}
