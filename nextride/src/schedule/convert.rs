//! Conversion from backend timetable entries to normalized departures.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::domain::{
    Departure, DepartureQueryResult, ServiceTime, SourceKind, StopCode, TransportType,
    anchor_service_time,
};
use crate::source::SourceError;

use super::types::{ScheduleResponse, ScheduledEntry};

/// Placeholder the backend uses for a missing short route name.
const NO_SHORT_NAME: &str = "N/A";

/// Reason a timetable entry was left out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid time: {0}")]
    InvalidTime(String),
}

/// Convert a backend response, anchoring times relative to `now`.
pub fn convert_schedule(
    response: &ScheduleResponse,
    requested: &StopCode,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<DepartureQueryResult, SourceError> {
    let departures: Vec<Departure> = response
        .departures
        .iter()
        .filter_map(|entry| match convert_entry(entry, now, tz) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!(stop = %requested, "skipping timetable entry: {e}");
                None
            }
        })
        .collect();

    if departures.is_empty() {
        return Err(SourceError::NoData);
    }

    let stop_name = response
        .departures
        .iter()
        .find_map(|e| e.stop_name.as_deref().filter(|n| !n.is_empty()))
        .unwrap_or(requested.as_str())
        .to_string();

    Ok(DepartureQueryResult {
        stop_name,
        stop_code: requested.clone(),
        departures,
        source: SourceKind::Scheduled,
    })
}

/// Convert a single entry.
pub fn convert_entry(
    entry: &ScheduledEntry,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<Departure, ConversionError> {
    let time = ServiceTime::parse(&entry.departure_time)
        .map_err(|_| ConversionError::InvalidTime(entry.departure_time.clone()))?;
    let scheduled_time = anchor_service_time(time, now, tz)
        .ok_or_else(|| ConversionError::InvalidTime(entry.departure_time.clone()))?;

    let short = entry.route_short_name.trim();
    let line = if short.is_empty() || short == NO_SHORT_NAME {
        entry.route_long_name.trim()
    } else {
        short
    };
    if line.is_empty() {
        return Err(ConversionError::MissingField("route_short_name"));
    }

    let destination = entry
        .trip_headsign
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    let transport = entry
        .mode
        .as_deref()
        .map(TransportType::from_tag)
        .unwrap_or(TransportType::Unknown);

    Ok(Departure {
        line: line.to_string(),
        destination,
        transport,
        scheduled_time,
        delay_minutes: 0,
        is_realtime: false,
        platform: None,
        cancelled: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use chrono_tz::Europe::Amsterdam;

    fn entry(time: &str, short: &str, long: &str) -> ScheduledEntry {
        ScheduledEntry {
            departure_time: time.to_string(),
            arrival_time: None,
            route_short_name: short.to_string(),
            route_long_name: long.to_string(),
            trip_headsign: Some("Schalkwijk".to_string()),
            trip_short_name: None,
            mode: Some("Bus".to_string()),
            stop_name: Some("Spaarne".to_string()),
        }
    }

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Amsterdam
            .with_ymd_and_hms(2024, 3, day, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn code() -> StopCode {
        StopCode::parse("hlmspa").unwrap()
    }

    #[test]
    fn scheduled_entry_fields() {
        let dep = convert_entry(&entry("10:30:00", "3", "Haarlem - Schalkwijk"), at(15, 10, 0), Amsterdam)
            .unwrap();

        assert_eq!(dep.line, "3");
        assert_eq!(dep.destination, "Schalkwijk");
        assert_eq!(dep.transport, TransportType::Bus);
        assert_eq!(dep.scheduled_time, at(15, 10, 30));
        assert_eq!(dep.delay_minutes, 0);
        assert!(!dep.is_realtime);
        assert!(!dep.cancelled);
        assert_eq!(dep.platform, None);
    }

    #[test]
    fn late_evening_rolls_early_morning_to_tomorrow() {
        // 23:50 now; the backend already lists 00:10 departures.
        let dep = convert_entry(&entry("00:10:00", "N30", ""), at(15, 23, 50), Amsterdam).unwrap();
        assert_eq!(dep.scheduled_time, at(16, 0, 10));
    }

    #[test]
    fn past_midnight_service_time() {
        let dep = convert_entry(&entry("25:10:00", "N30", ""), at(15, 22, 0), Amsterdam).unwrap();
        let local = dep.scheduled_time.with_timezone(&Amsterdam);
        assert_eq!(local.date_naive().to_string(), "2024-03-16");
        assert_eq!(local.hour(), 1);
        assert_eq!(local.minute(), 10);
    }

    #[test]
    fn placeholder_short_name_uses_long_name() {
        let dep = convert_entry(&entry("10:30:00", "N/A", "Sneltram"), at(15, 10, 0), Amsterdam).unwrap();
        assert_eq!(dep.line, "Sneltram");

        let dep = convert_entry(&entry("10:30:00", "", "Sneltram"), at(15, 10, 0), Amsterdam).unwrap();
        assert_eq!(dep.line, "Sneltram");

        assert_eq!(
            convert_entry(&entry("10:30:00", "N/A", ""), at(15, 10, 0), Amsterdam),
            Err(ConversionError::MissingField("route_short_name"))
        );
    }

    #[test]
    fn unknown_mode_and_missing_headsign() {
        let mut e = entry("10:30:00", "3", "");
        e.mode = Some("Cable Car".to_string());
        e.trip_headsign = None;
        let dep = convert_entry(&e, at(15, 10, 0), Amsterdam).unwrap();
        assert_eq!(dep.transport, TransportType::Unknown);
        assert_eq!(dep.destination, "Unknown");
    }

    #[test]
    fn invalid_time_skipped() {
        let response = ScheduleResponse {
            stop_code: Some("hlmspa".to_string()),
            timestamp: None,
            count: Some(2),
            departures: vec![entry("garbage", "3", ""), entry("10:45:00", "50", "")],
        };

        let result = convert_schedule(&response, &code(), at(15, 10, 0), Amsterdam).unwrap();
        assert_eq!(result.departures.len(), 1);
        assert_eq!(result.departures[0].line, "50");
        assert_eq!(result.stop_name, "Spaarne");
        assert_eq!(result.source, SourceKind::Scheduled);
    }

    #[test]
    fn empty_list_is_no_data() {
        let response = ScheduleResponse {
            stop_code: Some("hlmspa".to_string()),
            timestamp: None,
            count: Some(0),
            departures: vec![],
        };
        assert_eq!(
            convert_schedule(&response, &code(), at(15, 10, 0), Amsterdam),
            Err(SourceError::NoData)
        );
    }
}
