//! Resolver configuration.

use std::time::Duration;

use chrono_tz::Tz;

/// Upper bound on any search radius.
pub const MAX_RADIUS_KM: f64 = 50.0;

/// Tuning for stop search and departure resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum number of nearby stops tried for real-time data.
    pub max_candidates: usize,

    /// Stops farther away than this are never candidates.
    pub max_radius_km: f64,

    /// Maximum number of departures returned.
    pub display_limit: usize,

    /// Deadline for a single source call (seconds).
    pub fetch_timeout_secs: u64,

    /// Deadline for a position fix (seconds).
    pub locate_timeout_secs: u64,

    /// Provider time zone, used for hints and display.
    pub timezone: Tz,
}

impl ResolverConfig {
    pub fn with_max_candidates(mut self, n: usize) -> Self {
        self.max_candidates = n;
        self
    }

    pub fn with_max_radius_km(mut self, km: f64) -> Self {
        self.max_radius_km = km;
        self
    }

    pub fn with_display_limit(mut self, n: usize) -> Self {
        self.display_limit = n;
        self
    }

    pub fn with_fetch_timeout(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    pub fn with_locate_timeout(mut self, secs: u64) -> Self {
        self.locate_timeout_secs = secs;
        self
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    /// Returns the fetch timeout as a Duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Returns the locate timeout as a Duration.
    pub fn locate_timeout(&self) -> Duration {
        Duration::from_secs(self.locate_timeout_secs)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_candidates: 10,
            max_radius_km: 10.0,
            display_limit: 10,
            fetch_timeout_secs: 10,
            locate_timeout_secs: 10,
            timezone: chrono_tz::Europe::Amsterdam,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ResolverConfig::default();

        assert_eq!(config.max_candidates, 10);
        assert_eq!(config.max_radius_km, 10.0);
        assert_eq!(config.display_limit, 10);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.locate_timeout(), Duration::from_secs(10));
        assert_eq!(config.timezone, chrono_tz::Europe::Amsterdam);
    }

    #[test]
    fn custom_config() {
        let config = ResolverConfig::default()
            .with_max_candidates(3)
            .with_max_radius_km(0.5)
            .with_display_limit(5)
            .with_fetch_timeout(2)
            .with_locate_timeout(30)
            .with_timezone(chrono_tz::Europe::Brussels);

        assert_eq!(config.max_candidates, 3);
        assert_eq!(config.max_radius_km, 0.5);
        assert_eq!(config.display_limit, 5);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(2));
        assert_eq!(config.locate_timeout(), Duration::from_secs(30));
        assert_eq!(config.timezone, chrono_tz::Europe::Brussels);
    }
}
