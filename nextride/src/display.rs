//! Presentation shapes for departure boards.
//!
//! Pure formatting: a compact menu list and a detail view for one selected
//! departure. Clock times are shown in the provider's local time zone.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::{Departure, DepartureQueryResult, SourceKind, TransportType};

/// One row of the departure menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// `line destination`
    pub label: String,
    /// Clock time, countdown and delay.
    pub subtitle: String,
}

/// The following departure of the same line and destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextDeparture {
    pub time: String,
    pub countdown: String,
}

/// Everything known about one selected departure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub label: String,
    pub stop_name: String,
    pub time: String,
    pub countdown: String,
    pub delay: Option<String>,
    pub platform: Option<String>,
    pub transport: TransportType,
    pub is_realtime: bool,
    pub cancelled: bool,
    pub source: SourceKind,
    pub next: Option<NextDeparture>,
}

/// Menu rows, one per departure, in board order.
pub fn menu_items(result: &DepartureQueryResult, now: DateTime<Utc>, tz: Tz) -> Vec<MenuItem> {
    result
        .departures
        .iter()
        .map(|d| MenuItem {
            label: label(d),
            subtitle: subtitle(d, now, tz),
        })
        .collect()
}

/// Detail view for the departure at `index`, or `None` if out of range.
pub fn detail_view(
    result: &DepartureQueryResult,
    index: usize,
    now: DateTime<Utc>,
    tz: Tz,
) -> Option<DetailView> {
    let selected = result.departures.get(index)?;

    let next = result.departures[index + 1..]
        .iter()
        .find(|d| d.line == selected.line && d.destination == selected.destination)
        .map(|d| NextDeparture {
            time: clock_time(d.scheduled_time, now, tz),
            countdown: countdown(d, now),
        });

    Some(DetailView {
        label: label(selected),
        stop_name: result.stop_name.clone(),
        time: clock_time(selected.scheduled_time, now, tz),
        countdown: countdown(selected, now),
        delay: delay(selected),
        platform: selected.platform.clone(),
        transport: selected.transport,
        is_realtime: selected.is_realtime,
        cancelled: selected.cancelled,
        source: result.source,
        next,
    })
}

fn label(d: &Departure) -> String {
    format!("{} {}", d.line, d.destination)
}

fn subtitle(d: &Departure, now: DateTime<Utc>, tz: Tz) -> String {
    let mut parts = vec![clock_time(d.scheduled_time, now, tz), countdown(d, now)];
    if let Some(delay) = delay(d) {
        parts.push(delay);
    }
    parts.join(" · ")
}

/// Local `HH:MM`, prefixed `tomorrow` when on a later local day than now.
pub fn clock_time(at: DateTime<Utc>, now: DateTime<Utc>, tz: Tz) -> String {
    let local = at.with_timezone(&tz);
    let hhmm = local.format("%H:%M").to_string();
    if local.date_naive() > now.with_timezone(&tz).date_naive() {
        format!("tomorrow {hhmm}")
    } else {
        hhmm
    }
}

fn countdown(d: &Departure, now: DateTime<Utc>) -> String {
    if d.cancelled {
        "cancelled".to_string()
    } else {
        relative_time(d.scheduled_time, now)
    }
}

/// `now`, `N min` or `Hh MMm` until `at`.
///
/// ```
/// use chrono::{Duration, Utc};
/// use nextride::display::relative_time;
///
/// let now = Utc::now();
/// assert_eq!(relative_time(now - Duration::minutes(1), now), "now");
/// assert_eq!(relative_time(now + Duration::minutes(7), now), "7 min");
/// assert_eq!(relative_time(now + Duration::minutes(125), now), "2h 05m");
/// ```
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = at.signed_duration_since(now).num_minutes();
    match minutes {
        m if m <= 0 => "now".to_string(),
        m if m < 60 => format!("{m} min"),
        m => format!("{}h {:02}m", m / 60, m % 60),
    }
}

/// `+N` / `-N` for a non-zero real-time delay.
fn delay(d: &Departure) -> Option<String> {
    match d.delay_minutes {
        0 => None,
        _ if !d.is_realtime => None,
        m if m > 0 => Some(format!("+{m}")),
        m => Some(m.to_string()),
    }
}
