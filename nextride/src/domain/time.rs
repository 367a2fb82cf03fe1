//! Provider time handling.
//!
//! The real-time provider reports ISO 8601 timestamps, usually without an
//! offset (Dutch local time). The scheduled backend reports bare GTFS
//! wall-clock times ("HH:MM:SS", hours may exceed 23 for trips running past
//! midnight). Both are turned into absolute UTC instants here.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A timetable wall-clock time relative to the start of a service day.
///
/// GTFS allows hours beyond 23: "25:10:00" is 01:10 on the following
/// calendar day. Hours up to 47 are accepted.
///
/// # Examples
///
/// ```
/// use nextride::domain::ServiceTime;
///
/// let t = ServiceTime::parse("14:30:00").unwrap();
/// assert_eq!(t.to_string(), "14:30:00");
///
/// let late = ServiceTime::parse("25:10:00").unwrap();
/// assert_eq!(late.day_offset(), 1);
///
/// assert!(ServiceTime::parse("14:3").is_err());
/// assert!(ServiceTime::parse("14:61:00").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime {
    seconds: u32,
}

impl ServiceTime {
    const MAX_HOUR: u32 = 47;

    /// Parse "HH:MM:SS" or "HH:MM".
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        let bytes = s.as_bytes();

        if bytes.len() != 5 && bytes.len() != 8 {
            return Err(TimeError::new("expected HH:MM:SS or HH:MM format"));
        }
        if bytes[2] != b':' || (bytes.len() == 8 && bytes[5] != b':') {
            return Err(TimeError::new("expected colon separators"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > Self::MAX_HOUR {
            return Err(TimeError::new("hour must be 0-47"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let second = if bytes.len() == 8 {
            parse_two_digits(&bytes[6..8])
                .ok_or_else(|| TimeError::new("invalid second digits"))?
        } else {
            0
        };
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }

        Ok(Self {
            seconds: hour * 3600 + minute * 60 + second,
        })
    }

    /// Whole days past the service day this time falls on.
    pub fn day_offset(&self) -> u32 {
        self.seconds / 86_400
    }

    pub fn seconds_since_midnight(&self) -> u32 {
        self.seconds
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({self})")
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.seconds / 3600,
            (self.seconds / 60) % 60,
            self.seconds % 60
        )
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// A timetable time this far behind `now` is taken to mean tomorrow.
///
/// Late at night the backend already lists the first departures of the next
/// morning; anchored to today they would appear almost a day in the past.
const ROLLOVER_THRESHOLD_HOURS: i64 = 12;

/// Anchor a wall-clock timetable time to an absolute instant.
///
/// The time is placed on today's date in `tz`. If that instant is more than
/// 12 hours before `now`, it is moved to tomorrow instead.
///
/// Returns `None` only if the local time cannot be represented at all.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Timelike};
/// use chrono_tz::Europe::Amsterdam;
/// use nextride::domain::{ServiceTime, anchor_service_time};
///
/// // 23:30 in Amsterdam; a 00:15 departure is tomorrow's.
/// let now = Amsterdam
///     .with_ymd_and_hms(2024, 3, 15, 23, 30, 0)
///     .unwrap()
///     .with_timezone(&chrono::Utc);
/// let t = ServiceTime::parse("00:15:00").unwrap();
/// let at = anchor_service_time(t, now, Amsterdam).unwrap().with_timezone(&Amsterdam);
/// assert_eq!(at.date_naive().to_string(), "2024-03-16");
/// assert_eq!(at.hour(), 0);
/// ```
pub fn anchor_service_time(time: ServiceTime, now: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let today = now.with_timezone(&tz).date_naive();
    let naive = today.and_hms_opt(0, 0, 0)? + Duration::seconds(i64::from(time.seconds));

    let anchored = resolve_local(naive, tz)?;
    if now.signed_duration_since(anchored) > Duration::hours(ROLLOVER_THRESHOLD_HOURS) {
        return resolve_local(naive + Duration::days(1), tz);
    }

    Some(anchored)
}

/// Parse a provider timestamp.
///
/// Timestamps carrying an offset (`2024-03-15T10:30:00+01:00`, `...Z`) are
/// taken as-is; bare local timestamps (`2024-03-15T10:30:00`) are read in
/// `tz`.
pub fn parse_provider_timestamp(s: &str, tz: Tz) -> Result<DateTime<Utc>, TimeError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| TimeError::new("expected ISO 8601 timestamp"))?;

    resolve_local(naive, tz).ok_or_else(|| TimeError::new("local time does not exist"))
}

/// Resolve a local wall-clock time in `tz`.
///
/// Ambiguous times (clocks going back) take the earlier instant; times in a
/// DST gap (clocks going forward) are shifted forward by an hour.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}
