//! OVapi real-time HTTP client.
//!
//! Queries live passes for a stop area and normalizes them into the
//! shared departure model.

use std::time::Duration;

use chrono_tz::Tz;
use tracing::debug;

use crate::domain::{DepartureQueryResult, SourceKind, StopCode};
use crate::source::{DepartureSource, SourceError, classify_json_error};

use super::convert::convert_stop_area;
use super::types::StopAreaResponse;

/// Default base URL for OVapi.
pub const DEFAULT_BASE_URL: &str = "http://v0.ovapi.nl";

/// Default user agent sent to public transit APIs.
pub const DEFAULT_USER_AGENT: &str = concat!("nextride/", env!("CARGO_PKG_VERSION"));

/// Configuration for the real-time client.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Base URL for the API (defaults to production OVapi)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Time zone used for timestamps without an offset
    pub timezone: Tz,
}

impl RealtimeConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timezone: chrono_tz::Europe::Amsterdam,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// OVapi client.
#[derive(Debug, Clone)]
pub struct RealtimeClient {
    http: reqwest::Client,
    base_url: String,
    timezone: Tz,
}

impl RealtimeClient {
    pub fn new(config: RealtimeConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timezone: config.timezone,
        })
    }

    /// Fetch and decode the stop area document for `stop`.
    async fn get_stop_area(
        &self,
        stop: &StopCode,
    ) -> Result<StopAreaResponse, SourceError> {
        let body = self.get_body(stop).await?;
        if is_empty_body(&body) {
            return Err(SourceError::NoData);
        }
        serde_json::from_str(&body).map_err(|e| classify_json_error(&e, &body))
    }

    async fn get_body(&self, stop: &StopCode) -> Result<String, SourceError> {
        let url = format!("{}/stopareacode/{}", self.base_url, stop.as_str());

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(format!("request failed: {e}")))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(stop = %stop, "stop area unknown to real-time feed");
            return Err(SourceError::NoData);
        }

        if !status.is_success() {
            return Err(SourceError::Unavailable(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Unavailable(format!("reading body failed: {e}")))
    }
}

impl DepartureSource for RealtimeClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Realtime
    }

    async fn fetch(&self, stop: &StopCode) -> Result<DepartureQueryResult, SourceError> {
        let response = self.get_stop_area(stop).await?;
        convert_stop_area(&response, stop, self.timezone)
    }
}

/// OVapi answers `[]` or `{}` for stop areas it does not track.
fn is_empty_body(body: &str) -> bool {
    matches!(body.trim(), "" | "[]" | "{}" | "null")
}
