//! Time-of-day hints for empty departure boards.

use chrono::{Datelike, TimeZone, Timelike, Weekday};

/// Explain a lack of departures in terms of the local service pattern.
///
/// Weekends and nights have sparse service; evenings are thinner than
/// daytime. Outside those, no particular reason is known.
///
/// ```
/// use chrono::TimeZone;
/// use chrono_tz::Europe::Amsterdam;
/// use nextride::resolver::service_hint;
///
/// // Saturday 02:00.
/// let t = Amsterdam.with_ymd_and_hms(2024, 3, 16, 2, 0, 0).unwrap();
/// assert!(service_hint(&t).contains("weekend night"));
/// ```
pub fn service_hint<Z: TimeZone>(local: &chrono::DateTime<Z>) -> String {
    let weekend = matches!(local.weekday(), Weekday::Sat | Weekday::Sun);
    let hour = local.hour();
    let night = hour < 6 || hour >= 23;
    let evening = (20..23).contains(&hour);

    let hint = match (weekend, night, evening) {
        (true, true, _) => {
            "Reduced weekend night service; there may be no departures until morning."
        }
        (true, false, _) => "Reduced weekend service; departures may be infrequent.",
        (false, true, _) => "Night service; most lines do not run until morning.",
        (false, false, true) => "Evening service; departures may be infrequent.",
        (false, false, false) => "No departures found nearby right now. Try again later.",
    };
    hint.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Amsterdam;

    // 2024-03-15 is a Friday.
    fn at(day: u32, hour: u32) -> chrono::DateTime<chrono_tz::Tz> {
        Amsterdam.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn weekday_daytime_is_generic() {
        assert!(service_hint(&at(15, 12)).contains("Try again later"));
    }

    #[test]
    fn weekday_evening() {
        assert!(service_hint(&at(15, 20)).starts_with("Evening"));
        assert!(service_hint(&at(15, 22)).starts_with("Evening"));
    }

    #[test]
    fn weekday_night() {
        assert!(service_hint(&at(15, 23)).starts_with("Night"));
        assert!(service_hint(&at(15, 0)).starts_with("Night"));
        assert!(service_hint(&at(15, 5)).starts_with("Night"));
        assert!(!service_hint(&at(15, 6)).starts_with("Night"));
    }

    #[test]
    fn weekend() {
        assert!(service_hint(&at(16, 12)).contains("weekend service"));
        assert!(service_hint(&at(17, 21)).contains("weekend service"));
        assert!(service_hint(&at(17, 23)).contains("weekend night"));
    }
}
