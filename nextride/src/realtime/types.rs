//! OVapi real-time response DTOs.
//!
//! These types map directly to the `GET /stopareacode/{code}` JSON. The
//! response nests stop area → timing point (one per platform) → passes
//! keyed by an opaque pass id. OVapi omits fields freely, so nearly
//! everything is optional.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Response from `GET /stopareacode/{code}`: stop area code → timing
/// point code → timing point data.
pub type StopAreaResponse = BTreeMap<String, BTreeMap<String, TimingPointData>>;

/// Live data for one timing point (platform).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimingPointData {
    /// Metadata about the timing point itself.
    pub stop: Option<TimingPointStop>,

    /// Upcoming vehicle passes, keyed by pass id. Empty outside service
    /// hours.
    #[serde(default)]
    pub passes: BTreeMap<String, Pass>,
}

/// Timing point metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimingPointStop {
    pub timing_point_code: Option<String>,
    pub timing_point_name: Option<String>,
    pub timing_point_town: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One upcoming vehicle pass at a timing point.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pass {
    /// Public line number shown on the vehicle, e.g. "3" or "N30".
    pub line_public_number: Option<String>,

    /// Long line name, used when the public number is missing.
    pub line_name: Option<String>,

    /// Destination, truncated by the provider to 50 characters.
    #[serde(rename = "DestinationName50")]
    pub destination_name_50: Option<String>,

    /// Predicted departure (ISO 8601, usually without offset).
    pub expected_departure_time: Option<String>,

    /// Timetabled departure (ISO 8601, usually without offset).
    pub target_departure_time: Option<String>,

    /// "BUS", "TRAM", "METRO", "TRAIN", "BOAT".
    pub transport_type: Option<String>,

    pub trip_stop_status: Option<TripStopStatus>,
}

/// Progress of a trip relative to this timing point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TripStopStatus {
    Planned,
    Driving,
    Arrived,
    Passed,
    Cancel,
    Offroute,
    Unknown,
    #[serde(other)]
    Other,
}
