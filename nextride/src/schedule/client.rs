//! HTTP client for the scheduled departures backend.

use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;
use tracing::debug;

use crate::domain::{DepartureQueryResult, SourceKind, StopCode};
use crate::realtime::DEFAULT_USER_AGENT;
use crate::source::{DepartureSource, SourceError, classify_json_error};

use super::convert::convert_schedule;
use super::types::ScheduleResponse;

/// Default number of departures requested from the backend.
const DEFAULT_LIMIT: u32 = 20;

/// Configuration for the scheduled client.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Base URL of the backend; `None` disables the scheduled source.
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Departures requested per stop
    pub limit: u32,
    pub user_agent: String,
    /// Time zone the timetable's wall-clock times are in
    pub timezone: Tz,
}

impl ScheduleConfig {
    /// Create an unconfigured (disabled) scheduled source config.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
            limit: DEFAULT_LIMIT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timezone: chrono_tz::Europe::Amsterdam,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
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

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Scheduled departures client.
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    http: reqwest::Client,
    base_url: Option<String>,
    limit: u32,
    timezone: Tz,
}

impl ScheduleClient {
    pub fn new(config: ScheduleConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url: config
                .base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            limit: config.limit,
            timezone: config.timezone,
        })
    }

    /// Whether a backend URL is configured.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Fetch and decode the timetable response for `stop`.
    async fn get_departures(
        &self,
        stop: &StopCode,
    ) -> Result<ScheduleResponse, SourceError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| SourceError::Unavailable("scheduled source not configured".to_string()))?;

        let url = format!("{}/api/stops/{}/departures", base_url, stop.as_str());

        let response = self
            .http
            .get(&url)
            .query(&[("limit", self.limit.to_string())])
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(format!("request failed: {e}")))?;

        let status = response.status();

        // The backend answers 404 both for unknown stops and for stops with
        // nothing left today.
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(stop = %stop, "no scheduled departures");
            return Err(SourceError::NoData);
        }

        if !status.is_success() {
            return Err(SourceError::Unavailable(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Unavailable(format!("reading body failed: {e}")))?;

        serde_json::from_str(&body).map_err(|e| classify_json_error(&e, &body))
    }
}

impl DepartureSource for ScheduleClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Scheduled
    }

    async fn fetch(&self, stop: &StopCode) -> Result<DepartureQueryResult, SourceError> {
        let response = self.get_departures(stop).await?;
        convert_schedule(&response, stop, Utc::now(), self.timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = ScheduleConfig::new()
            .with_base_url("http://localhost:5000")
            .with_timeout(5)
            .with_limit(15)
            .with_user_agent("test-agent");

        assert_eq!(config.base_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.limit, 15);
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn config_defaults() {
        let config = ScheduleConfig::default();

        assert_eq!(config.base_url, None);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.limit, DEFAULT_LIMIT);
        assert_eq!(config.timezone, chrono_tz::Europe::Amsterdam);
    }

    #[test]
    fn client_creation() {
        let client = ScheduleClient::new(ScheduleConfig::new().with_base_url("http://x/")).unwrap();
        assert!(client.is_configured());
        assert_eq!(client.base_url.as_deref(), Some("http://x"));
        assert_eq!(client.kind(), SourceKind::Scheduled);
    }

    #[tokio::test]
    async fn unconfigured_is_unavailable() {
        let client = ScheduleClient::new(ScheduleConfig::new()).unwrap();
        assert!(!client.is_configured());

        let stop = StopCode::parse("hlmspa").unwrap();
        assert!(matches!(
            client.fetch(&stop).await,
            Err(SourceError::Unavailable(_))
        ));
    }
}
