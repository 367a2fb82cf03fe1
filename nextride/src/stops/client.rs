//! Bulk stop catalog client.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{Coordinate, Stop, StopCode};
use crate::realtime::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

use super::error::CatalogError;

/// Anything that can produce the full stop catalog in one call.
pub trait StopCatalogSource: Send + Sync {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Stop>, CatalogError>> + Send;
}

/// Response from `GET /stopareacode`: stop area code → metadata.
pub type StopAreaListResponse = BTreeMap<String, StopAreaDto>;

/// Minimal DTO for a stop area.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopAreaDto {
    pub timing_point_name: Option<String>,
    pub timing_point_town: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Configuration for the catalog client.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL for the API (defaults to production OVapi)
    pub base_url: String,
    /// Request timeout in seconds; the catalog is large
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl CatalogClientConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the OVapi stop area list.
#[derive(Debug, Clone)]
pub struct StopCatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl StopCatalogClient {
    pub fn new(config: CatalogClientConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl StopCatalogSource for StopCatalogClient {
    async fn fetch_all(&self) -> Result<Vec<Stop>, CatalogError> {
        let url = format!("{}/stopareacode", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable {
                message: e.to_string(),
            })?;
        let status = response.status();

        if !status.is_success() {
            return Err(CatalogError::Unavailable {
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| CatalogError::Unavailable {
            message: e.to_string(),
        })?;

        let areas: StopAreaListResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Unparseable {
                message: e.to_string(),
            })?;

        let stops = build_stops(areas);
        info!(count = stops.len(), "fetched stop catalog");
        Ok(stops)
    }
}

/// Convert stop area DTOs to stops, skipping unusable entries.
fn build_stops(areas: StopAreaListResponse) -> Vec<Stop> {
    areas
        .into_iter()
        .filter_map(|(code, dto)| match build_stop(&code, dto) {
            Ok(stop) => Some(stop),
            Err(reason) => {
                warn!(code, "skipping catalog entry: {reason}");
                None
            }
        })
        .collect()
}

fn build_stop(code: &str, dto: StopAreaDto) -> Result<Stop, String> {
    let code = StopCode::parse(code).map_err(|e| e.to_string())?;

    let (Some(lat), Some(lon)) = (dto.latitude, dto.longitude) else {
        return Err("missing coordinates".to_string());
    };
    let location = Coordinate::new(lat, lon).map_err(|e| e.to_string())?;

    let name = dto
        .timing_point_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| code.to_string());

    Ok(Stop {
        code,
        name,
        town: dto.timing_point_town.filter(|t| !t.trim().is_empty()),
        location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = CatalogClientConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_with_base_url() {
        let config = CatalogClientConfig::new().with_base_url("http://localhost:8080");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn build_stops_skips_invalid_entries() {
        let json = r#"{
            "hlmspa": {"TimingPointName": "Spaarne", "TimingPointTown": "Haarlem",
                       "Latitude": 52.381, "Longitude": 4.641},
            "nocoords": {"TimingPointName": "Somewhere"},
            "badlat": {"TimingPointName": "Nowhere", "Latitude": 123.0, "Longitude": 4.0},
            "bad code": {"TimingPointName": "Spaces", "Latitude": 52.0, "Longitude": 4.0},
            "asdcs": {"Latitude": 52.379, "Longitude": 4.900}
        }"#;
        let areas: StopAreaListResponse = serde_json::from_str(json).unwrap();

        let stops = build_stops(areas);
        let codes: Vec<_> = stops.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, ["asdcs", "hlmspa"]);

        let spaarne = &stops[1];
        assert_eq!(spaarne.name, "Spaarne");
        assert_eq!(spaarne.town.as_deref(), Some("Haarlem"));

        // No name: fall back to the code.
        assert_eq!(stops[0].name, "asdcs");
        assert_eq!(stops[0].town, None);
    }
}
