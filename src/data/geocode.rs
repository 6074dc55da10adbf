//! Reverse geocoding: turn a coordinate into a locality name.
//!
//! Lookups are best-effort. Callers treat any error or empty result as "no
//! name" and fall back to the formatted coordinate.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::Coordinate;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("pointcast/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur during a reverse lookup
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Reverse geocode request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Reverse geocode returned status {0}")]
    Status(u16),
}

/// Resolves a coordinate to a human-readable locality
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Returns the locality for `coordinate`, or `None` when there is none
    async fn locality(&self, coordinate: Coordinate) -> Result<Option<String>, GeocodeError>;
}

/// Geocoder that never resolves a name; labels fall back to coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

#[async_trait]
impl ReverseGeocoder for NoGeocoder {
    async fn locality(&self, _coordinate: Coordinate) -> Result<Option<String>, GeocodeError> {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// Most specific place name present, city first
    fn place(self) -> Option<String> {
        self.city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .or(self.county)
            .or(self.state)
            .or(self.country)
            .filter(|name| !name.trim().is_empty())
    }
}

/// OpenStreetMap Nominatim reverse geocoder (no API key required)
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to create geocoding client: {}", e);
                Client::new()
            });
        Self {
            client,
            base_url: NOMINATIM_URL.to_string(),
        }
    }

    /// Point the geocoder at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn locality(&self, coordinate: Coordinate) -> Result<Option<String>, GeocodeError> {
        let url = format!(
            "{}?lat={}&lon={}&format=json&addressdetails=1&zoom=10",
            self.base_url, coordinate.latitude, coordinate.longitude
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body: NominatimResponse = response.json().await?;
        let place = body.address.and_then(NominatimAddress::place);

        tracing::debug!(?place, %coordinate, "reverse geocoded");
        Ok(place)
    }
}
