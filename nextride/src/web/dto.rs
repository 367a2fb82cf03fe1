//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::display::{DetailView, MenuItem, detail_view, menu_items};
use crate::domain::{
    Departure, DepartureQueryResult, RankedStop, SourceKind, Stop, StopCode, TransportType,
};

/// Request for stops near a position.
#[derive(Debug, Deserialize)]
pub struct NearbyRequest {
    pub lat: f64,
    pub lon: f64,

    /// Maximum number of stops (defaults to 10)
    pub limit: Option<usize>,

    /// Search radius in kilometres (defaults to the configured radius)
    pub radius_km: Option<f64>,
}

/// Request to search stops by name.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    pub query: String,

    /// Maximum number of stops (defaults to 20)
    pub limit: Option<usize>,
}

/// Request for departures near a position.
///
/// Without `lat`/`lon` the server's configured position is used.
#[derive(Debug, Deserialize)]
pub struct DeparturesRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,

    /// Index of the departure to show in detail
    pub selected: Option<usize>,
}

/// Request for departures at a saved stop.
#[derive(Debug, Deserialize)]
pub struct StopDeparturesRequest {
    /// Index of the departure to show in detail
    pub selected: Option<usize>,
}

/// A stop in search results.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub code: String,
    pub name: String,
    pub town: Option<String>,

    /// Name qualified with the town
    pub display_name: String,

    pub latitude: f64,
    pub longitude: f64,

    /// Distance from the query position, for nearby searches
    pub distance_km: Option<f64>,
}

/// Response for nearby stops.
#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub stops: Vec<StopResult>,
}

/// Response for stop search.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    pub query: String,
    pub stops: Vec<StopResult>,
}

/// A departure in a board response.
#[derive(Debug, Serialize)]
pub struct DepartureResult {
    pub line: String,
    pub destination: String,
    pub transport: TransportType,

    /// Departure instant, RFC 3339
    pub departure_time: String,

    /// Local clock time, HH:MM
    pub local_time: String,

    pub delay_minutes: i64,
    pub is_realtime: bool,
    pub platform: Option<String>,
    pub cancelled: bool,
}

/// Response for a departure board.
#[derive(Debug, Serialize)]
pub struct DeparturesResponse {
    pub stop_name: String,
    pub stop_code: StopCode,
    pub source: SourceKind,
    pub departures: Vec<DepartureResult>,
    pub menu: Vec<MenuItem>,

    /// Present when a valid `selected` index was requested
    pub detail: Option<DetailView>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StopResult {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            code: stop.code.to_string(),
            name: stop.name.clone(),
            town: stop.town.clone(),
            display_name: stop.display_name(),
            latitude: stop.location.latitude(),
            longitude: stop.location.longitude(),
            distance_km: None,
        }
    }

    pub fn from_ranked(ranked: &RankedStop) -> Self {
        Self {
            distance_km: Some((ranked.distance_km * 1000.0).round() / 1000.0),
            ..Self::from_stop(&ranked.stop)
        }
    }
}

impl DepartureResult {
    pub fn from_departure(departure: &Departure, tz: Tz) -> Self {
        Self {
            line: departure.line.clone(),
            destination: departure.destination.clone(),
            transport: departure.transport,
            departure_time: departure.scheduled_time.to_rfc3339(),
            local_time: departure
                .scheduled_time
                .with_timezone(&tz)
                .format("%H:%M")
                .to_string(),
            delay_minutes: departure.delay_minutes,
            is_realtime: departure.is_realtime,
            platform: departure.platform.clone(),
            cancelled: departure.cancelled,
        }
    }
}

impl DeparturesResponse {
    pub fn from_result(
        result: &DepartureQueryResult,
        selected: Option<usize>,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Self {
        Self {
            stop_name: result.stop_name.clone(),
            stop_code: result.stop_code.clone(),
            source: result.source,
            departures: result
                .departures
                .iter()
                .map(|d| DepartureResult::from_departure(d, tz))
                .collect(),
            menu: menu_items(result, now, tz),
            detail: selected.and_then(|i| detail_view(result, i, now, tz)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Europe::Amsterdam;

    fn make_stop() -> Stop {
        Stop {
            code: StopCode::parse("hlmspa").unwrap(),
            name: "Spaarne".to_string(),
            town: Some("Haarlem".to_string()),
            location: Coordinate::new(52.381, 4.641).unwrap(),
        }
    }

    fn now() -> DateTime<Utc> {
        Amsterdam
            .with_ymd_and_hms(2024, 3, 15, 10, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn make_result() -> DepartureQueryResult {
        let dep = |line: &str, mins: i64, delay: i64| Departure {
            line: line.to_string(),
            destination: "Schalkwijk".to_string(),
            transport: TransportType::Bus,
            scheduled_time: now() + Duration::minutes(mins),
            delay_minutes: delay,
            is_realtime: true,
            platform: Some("55000310".to_string()),
            cancelled: false,
        };
        DepartureQueryResult {
            stop_name: "Spaarne".to_string(),
            stop_code: StopCode::parse("hlmspa").unwrap(),
            departures: vec![dep("3", 5, 2), dep("3", 20, 0)],
            source: SourceKind::Realtime,
        }
    }

    #[test]
    fn stop_result_from_stop() {
        let result = StopResult::from_stop(&make_stop());

        assert_eq!(result.code, "hlmspa");
        assert_eq!(result.display_name, "Haarlem, Spaarne");
        assert_eq!(result.latitude, 52.381);
        assert_eq!(result.distance_km, None);
    }

    #[test]
    fn stop_result_rounds_distance() {
        let ranked = RankedStop {
            stop: make_stop(),
            distance_km: 0.123456,
        };
        assert_eq!(StopResult::from_ranked(&ranked).distance_km, Some(0.123));
    }

    #[test]
    fn departure_result_fields() {
        let result = make_result();
        let dto = DepartureResult::from_departure(&result.departures[0], Amsterdam);

        assert_eq!(dto.line, "3");
        assert_eq!(dto.local_time, "10:05");
        assert_eq!(dto.departure_time, "2024-03-15T09:05:00+00:00");
        assert_eq!(dto.delay_minutes, 2);
        assert_eq!(dto.platform.as_deref(), Some("55000310"));
    }

    #[test]
    fn departures_response_with_detail() {
        let response = DeparturesResponse::from_result(&make_result(), Some(0), now(), Amsterdam);

        assert_eq!(response.stop_name, "Spaarne");
        assert_eq!(response.source, SourceKind::Realtime);
        assert_eq!(response.departures.len(), 2);
        assert_eq!(response.menu.len(), 2);
        assert_eq!(response.menu[0].subtitle, "10:05 · 5 min · +2");

        let detail = response.detail.unwrap();
        assert_eq!(detail.next.unwrap().time, "10:20");
    }

    #[test]
    fn departures_response_ignores_bad_selection() {
        let response = DeparturesResponse::from_result(&make_result(), Some(9), now(), Amsterdam);
        assert!(response.detail.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["source"], "realtime");
        assert_eq!(json["stop_code"], "hlmspa");
        assert!(json["detail"].is_null());
    }
}
