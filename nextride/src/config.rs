//! Application configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `NEXTRIDE_BIND` | `127.0.0.1:3000` |
//! | `NEXTRIDE_OVAPI_URL` | `http://v0.ovapi.nl` |
//! | `NEXTRIDE_SCHEDULE_URL` | unset (scheduled source disabled) |
//! | `NEXTRIDE_TIMEZONE` | `Europe/Amsterdam` |
//! | `NEXTRIDE_MAX_CANDIDATES` | `10` |
//! | `NEXTRIDE_RADIUS_KM` | `10` (at most 50) |
//! | `NEXTRIDE_DISPLAY_LIMIT` | `10` |
//! | `NEXTRIDE_FETCH_TIMEOUT_SECS` | `10` |
//! | `NEXTRIDE_HOME_LAT`, `NEXTRIDE_HOME_LON` | unset |
//! | `NEXTRIDE_USER_AGENT` | `nextride/<version>` |

use std::net::SocketAddr;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::cache::CacheConfig;
use crate::domain::Coordinate;
use crate::realtime::RealtimeConfig;
use crate::resolver::{MAX_RADIUS_KM, ResolverConfig};
use crate::schedule::ScheduleConfig;
use crate::stops::CatalogClientConfig;

/// Default listen address.
const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// An environment variable held an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}: {message}")]
pub struct ConfigError {
    pub var: &'static str,
    pub message: String,
}

/// Complete configuration for the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub realtime: RealtimeConfig,
    pub schedule: ScheduleConfig,
    pub catalog: CatalogClientConfig,
    pub resolver: ResolverConfig,
    pub cache: CacheConfig,
    /// Position reported by the server-side geolocator.
    pub home: Option<Coordinate>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's
    /// value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind = parse_or(&get, "NEXTRIDE_BIND", || {
            SocketAddr::from_str(DEFAULT_BIND).map_err(|e| e.to_string())
        })?;

        let timezone: Tz = match get("NEXTRIDE_TIMEZONE") {
            Some(name) => name.parse().map_err(|e| ConfigError {
                var: "NEXTRIDE_TIMEZONE",
                message: format!("{e}"),
            })?,
            None => chrono_tz::Europe::Amsterdam,
        };

        let defaults = ResolverConfig::default();
        let resolver = ResolverConfig::default()
            .with_timezone(timezone)
            .with_max_candidates(parse_or(&get, "NEXTRIDE_MAX_CANDIDATES", || {
                Ok(defaults.max_candidates)
            })?)
            .with_max_radius_km(parse_or(&get, "NEXTRIDE_RADIUS_KM", || {
                Ok(defaults.max_radius_km)
            })?)
            .with_display_limit(parse_or(&get, "NEXTRIDE_DISPLAY_LIMIT", || {
                Ok(defaults.display_limit)
            })?)
            .with_fetch_timeout(parse_or(&get, "NEXTRIDE_FETCH_TIMEOUT_SECS", || {
                Ok(defaults.fetch_timeout_secs)
            })?);

        if !(resolver.max_radius_km > 0.0 && resolver.max_radius_km <= MAX_RADIUS_KM) {
            return Err(ConfigError {
                var: "NEXTRIDE_RADIUS_KM",
                message: format!("must be in (0, {MAX_RADIUS_KM}]"),
            });
        }
        if resolver.max_candidates == 0 {
            return Err(ConfigError {
                var: "NEXTRIDE_MAX_CANDIDATES",
                message: "must be at least 1".to_string(),
            });
        }

        let mut realtime = RealtimeConfig::new()
            .with_timezone(timezone)
            .with_timeout(resolver.fetch_timeout_secs);
        let mut schedule = ScheduleConfig::new()
            .with_timezone(timezone)
            .with_timeout(resolver.fetch_timeout_secs);
        let mut catalog = CatalogClientConfig::new();

        if let Some(url) = get("NEXTRIDE_OVAPI_URL") {
            realtime = realtime.with_base_url(url.clone());
            catalog = catalog.with_base_url(url);
        }
        if let Some(url) = get("NEXTRIDE_SCHEDULE_URL") {
            schedule = schedule.with_base_url(url);
        }
        if let Some(agent) = get("NEXTRIDE_USER_AGENT") {
            realtime = realtime.with_user_agent(agent.clone());
            schedule = schedule.with_user_agent(agent.clone());
            catalog = catalog.with_user_agent(agent);
        }

        let home = match (get("NEXTRIDE_HOME_LAT"), get("NEXTRIDE_HOME_LON")) {
            (None, None) => None,
            (Some(lat), Some(lon)) => {
                let lat: f64 = parse_value("NEXTRIDE_HOME_LAT", &lat)?;
                let lon: f64 = parse_value("NEXTRIDE_HOME_LON", &lon)?;
                Some(Coordinate::new(lat, lon).map_err(|e| ConfigError {
                    var: "NEXTRIDE_HOME_LAT",
                    message: e.to_string(),
                })?)
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(ConfigError {
                    var: "NEXTRIDE_HOME_LAT",
                    message: "NEXTRIDE_HOME_LAT and NEXTRIDE_HOME_LON must be set together"
                        .to_string(),
                });
            }
        };

        Ok(Self {
            bind,
            realtime,
            schedule,
            catalog,
            resolver,
            cache: CacheConfig::default(),
            home,
        })
    }
}

fn parse_value<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError {
        var,
        message: format!("{value:?}: {e}"),
    })
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: impl FnOnce() -> Result<T, String>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(var) {
        Some(value) => parse_value(var, &value),
        None => default().map_err(|message| ConfigError { var, message }),
    }
}
