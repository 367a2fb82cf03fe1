//! Scheduled backend response DTOs.

use serde::Deserialize;

/// Response from `GET /api/stops/{code}/departures`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleResponse {
    pub stop_code: Option<String>,
    /// Server generation time, informational only.
    pub timestamp: Option<String>,
    pub count: Option<u32>,
    pub departures: Vec<ScheduledEntry>,
}

/// One timetabled departure.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledEntry {
    /// GTFS wall-clock time, "HH:MM:SS"; hours may exceed 23.
    pub departure_time: String,
    pub arrival_time: Option<String>,

    /// Short route name; the backend substitutes "N/A" when the feed has
    /// none.
    #[serde(default)]
    pub route_short_name: String,
    #[serde(default)]
    pub route_long_name: String,

    pub trip_headsign: Option<String>,
    pub trip_short_name: Option<String>,

    /// "Tram", "Metro", "Train", "Bus", "Ferry", or a less common mode.
    pub mode: Option<String>,

    pub stop_name: Option<String>,
}
