//! Windy point-forecast API client
//!
//! This module sends the point-forecast request for a coordinate and returns
//! the raw, index-aligned time series. Reshaping the series into display
//! values happens in [`crate::forecast`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Coordinate;

/// Point-forecast endpoint of the Windy API
pub const WINDY_POINT_FORECAST_URL: &str = "https://api.windy.com/api/point-forecast/v2";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Forecast model requested from the provider
const MODEL: &str = "gfs";

/// Surface parameters requested from the provider
const PARAMETERS: [&str; 7] = ["temp", "rh", "wind", "ptype", "lclouds", "mclouds", "hclouds"];

/// Vertical level requested from the provider
const LEVEL: &str = "surface";

/// Errors that can occur when requesting a forecast
#[derive(Debug, Error)]
pub enum RequestError {
    /// Latitude or longitude is NaN or infinite
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(Coordinate),

    /// The provider answered with a non-success status
    #[error(
        "HTTP {}: {} - {body}",
        .status.as_u16(),
        .status.canonical_reason().unwrap_or("Unknown")
    )]
    Rejected { status: StatusCode, body: String },

    /// Network-level failure (DNS, connect, timeout, reset)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not a forecast object
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// JSON body of a point-forecast request
#[derive(Debug, Clone, Serialize)]
pub struct PointForecastRequest<'a> {
    pub lat: f64,
    pub lon: f64,
    pub model: &'static str,
    pub parameters: &'static [&'static str],
    pub levels: [&'static str; 1],
    pub key: &'a str,
}

impl<'a> PointForecastRequest<'a> {
    pub fn new(coordinate: Coordinate, key: &'a str) -> Self {
        Self {
            lat: coordinate.latitude,
            lon: coordinate.longitude,
            model: MODEL,
            parameters: &PARAMETERS,
            levels: [LEVEL],
            key,
        }
    }
}

/// Raw point-forecast payload
///
/// Every series is index-aligned with `ts`. All fields are optional here so
/// that a missing series is reported by the aggregator as a malformed payload
/// rather than as a decoding failure; the provider also emits `null` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    /// Sample timestamps in epoch milliseconds
    #[serde(default)]
    pub ts: Option<Vec<i64>>,
    /// Air temperature in Kelvin
    #[serde(rename = "temp-surface", default)]
    pub temp: Option<Vec<Option<f64>>>,
    /// Relative humidity in percent
    #[serde(rename = "rh-surface", default)]
    pub rh: Option<Vec<Option<f64>>>,
    /// Eastward wind component in m/s
    #[serde(rename = "wind_u-surface", default)]
    pub wind_u: Option<Vec<Option<f64>>>,
    /// Northward wind component in m/s
    #[serde(rename = "wind_v-surface", default)]
    pub wind_v: Option<Vec<Option<f64>>>,
    /// Precipitation type code, 0 for none
    #[serde(rename = "ptype-surface", default)]
    pub ptype: Option<Vec<Option<f64>>>,
    /// Low cloud cover in percent
    #[serde(rename = "lclouds-surface", default)]
    pub lclouds: Option<Vec<Option<f64>>>,
    /// Mid cloud cover in percent
    #[serde(rename = "mclouds-surface", default)]
    pub mclouds: Option<Vec<Option<f64>>>,
    /// High cloud cover in percent
    #[serde(rename = "hclouds-surface", default)]
    pub hclouds: Option<Vec<Option<f64>>>,
}

/// Client for the Windy point-forecast API
#[derive(Debug, Clone)]
pub struct WindyClient {
    client: Client,
    base_url: String,
}

impl Default for WindyClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WindyClient {
    /// Create a new WindyClient with the default timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a new WindyClient whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });
        Self::with_client(client)
    }

    /// Create a new WindyClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: WINDY_POINT_FORECAST_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the raw point forecast for a coordinate
    ///
    /// Issues exactly one request; failures are returned as-is without retry.
    ///
    /// # Arguments
    /// * `coordinate` - Location to forecast, both components must be finite
    /// * `api_key` - Provider key, sent unmodified
    ///
    /// # Returns
    /// * `Ok(RawForecast)` - The index-aligned time series
    /// * `Err(RequestError)` - If the coordinate is invalid, the request fails
    ///   or the provider rejects it
    pub async fn fetch_forecast(
        &self,
        coordinate: Coordinate,
        api_key: &str,
    ) -> Result<RawForecast, RequestError> {
        if !coordinate.is_finite() {
            return Err(RequestError::InvalidCoordinate(coordinate));
        }

        let body = PointForecastRequest::new(coordinate, api_key);
        tracing::debug!(url = %self.base_url, %coordinate, "requesting point forecast");

        let response = self.client.post(&self.base_url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "point forecast rejected");
            return Err(RequestError::Rejected { status, body: text });
        }

        let raw: RawForecast = serde_json::from_str(&text)?;
        tracing::debug!(
            samples = raw.ts.as_ref().map_or(0, Vec::len),
            "point forecast received"
        );
        Ok(raw)
    }
}
