//! Conversion from OVapi DTOs to normalized departures.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::domain::{
    Departure, DepartureQueryResult, SourceKind, StopCode, TransportType,
    parse_provider_timestamp,
};
use crate::source::SourceError;

use super::types::{Pass, StopAreaResponse, TripStopStatus};

/// Reason a single pass was left out of the board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Neither an expected nor a target time could be read.
    #[error("no usable departure time")]
    NoTime,

    /// The vehicle has already left this timing point.
    #[error("vehicle already passed")]
    AlreadyPassed,
}

/// Flatten a stop area response into a single board.
///
/// Passes from every timing point are collected; the timing point code
/// becomes the departure's platform. Passes that cannot be converted are
/// logged and skipped. An empty result is [`SourceError::NoData`].
pub fn convert_stop_area(
    response: &StopAreaResponse,
    requested: &StopCode,
    tz: Tz,
) -> Result<DepartureQueryResult, SourceError> {
    let mut departures = Vec::new();
    let mut stop_name: Option<String> = None;

    for timing_points in response.values() {
        for (timing_point_code, data) in timing_points {
            if stop_name.is_none() {
                stop_name = data
                    .stop
                    .as_ref()
                    .and_then(|s| s.timing_point_name.clone())
                    .filter(|n| !n.is_empty());
            }

            for (pass_id, pass) in &data.passes {
                match convert_pass(pass, timing_point_code, tz) {
                    Ok(departure) => departures.push(departure),
                    Err(ConversionError::AlreadyPassed) => {
                        debug!(pass_id, "skipping pass: vehicle already passed");
                    }
                    Err(e) => {
                        warn!(pass_id, stop = %requested, "skipping pass: {e}");
                    }
                }
            }
        }
    }

    if departures.is_empty() {
        return Err(SourceError::NoData);
    }

    Ok(DepartureQueryResult {
        stop_name: stop_name.unwrap_or_else(|| requested.to_string()),
        stop_code: requested.clone(),
        departures,
        source: SourceKind::Realtime,
    })
}

/// Convert a single pass.
///
/// The departure time is the expected time when present, otherwise the
/// target time. Delay is the rounded difference in minutes when both are
/// present, otherwise zero.
pub fn convert_pass(
    pass: &Pass,
    timing_point_code: &str,
    tz: Tz,
) -> Result<Departure, ConversionError> {
    if pass.trip_stop_status == Some(TripStopStatus::Passed) {
        return Err(ConversionError::AlreadyPassed);
    }

    let non_blank = |s: &Option<String>| {
        s.as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    };
    let line = non_blank(&pass.line_public_number)
        .or_else(|| non_blank(&pass.line_name))
        .ok_or(ConversionError::MissingField("LinePublicNumber"))?;

    let expected = parse_optional_time(pass.expected_departure_time.as_deref(), tz);
    let target = parse_optional_time(pass.target_departure_time.as_deref(), tz);

    let scheduled_time = expected.or(target).ok_or(ConversionError::NoTime)?;
    let delay_minutes = match (expected, target) {
        (Some(expected), Some(target)) => delay_minutes(expected, target),
        _ => 0,
    };

    let destination = pass
        .destination_name_50
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    let transport = pass
        .transport_type
        .as_deref()
        .map(TransportType::from_tag)
        .unwrap_or(TransportType::Unknown);

    Ok(Departure {
        line,
        destination,
        transport,
        scheduled_time,
        delay_minutes,
        is_realtime: true,
        platform: Some(timing_point_code.to_string()),
        cancelled: pass.trip_stop_status == Some(TripStopStatus::Cancel),
    })
}

/// Parse an optional provider timestamp; unreadable values count as absent.
fn parse_optional_time(value: Option<&str>, tz: Tz) -> Option<DateTime<Utc>> {
    let value = value?;
    match parse_provider_timestamp(value, tz) {
        Ok(t) => Some(t),
        Err(e) => {
            debug!(value, "ignoring unreadable timestamp: {e}");
            None
        }
    }
}

/// Whole minutes between prediction and timetable, rounded to nearest.
fn delay_minutes(expected: DateTime<Utc>, target: DateTime<Utc>) -> i64 {
    let millis = expected.signed_duration_since(target).num_milliseconds();
    (millis as f64 / 60_000.0).round() as i64
}
