//! The normalized departure model shared by every source.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::StopCode;

/// Kind of vehicle serving a departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Bus,
    Tram,
    Metro,
    Train,
    Ferry,
    Unknown,
}

impl TransportType {
    /// Map a provider tag to a transport type.
    ///
    /// Accepts both the real-time provider's upper-case tags (`BUS`, `BOAT`)
    /// and the scheduled backend's mode names (`Bus`, `Ferry`). Anything
    /// unrecognized becomes `Unknown`.
    ///
    /// ```
    /// use nextride::domain::TransportType;
    ///
    /// assert_eq!(TransportType::from_tag("TRAM"), TransportType::Tram);
    /// assert_eq!(TransportType::from_tag("Ferry"), TransportType::Ferry);
    /// assert_eq!(TransportType::from_tag("BOAT"), TransportType::Ferry);
    /// assert_eq!(TransportType::from_tag("Gondola"), TransportType::Unknown);
    /// ```
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "bus" => TransportType::Bus,
            "tram" => TransportType::Tram,
            "metro" | "subway" => TransportType::Metro,
            "train" | "rail" => TransportType::Train,
            "ferry" | "boat" => TransportType::Ferry,
            _ => TransportType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Bus => "bus",
            TransportType::Tram => "tram",
            TransportType::Metro => "metro",
            TransportType::Train => "train",
            TransportType::Ferry => "ferry",
            TransportType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which source produced a query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Realtime,
    Scheduled,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Realtime => f.write_str("realtime"),
            SourceKind::Scheduled => f.write_str("scheduled"),
        }
    }
}

/// One upcoming departure, independent of which provider reported it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Departure {
    /// Public line number, e.g. "3" or "N30".
    pub line: String,

    pub destination: String,

    pub transport: TransportType,

    /// Best known departure instant: the live prediction for real-time
    /// departures, the timetable time otherwise.
    pub scheduled_time: DateTime<Utc>,

    /// Minutes behind timetable; 0 when the source has no delay concept.
    pub delay_minutes: i64,

    pub is_realtime: bool,

    /// Timing point / platform within the stop area.
    pub platform: Option<String>,

    pub cancelled: bool,
}

/// Departures for one stop, as produced by a single source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureQueryResult {
    pub stop_name: String,
    pub stop_code: StopCode,
    pub departures: Vec<Departure>,
    pub source: SourceKind,
}
