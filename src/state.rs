//! Display state and the controller that drives it
//!
//! The controller owns a single [`DisplayState`] behind a `tokio::sync::watch`
//! channel. Every transition replaces the whole value, so readers only ever
//! see complete states.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::watch;

use crate::data::{
    Coordinate, ForecastSummary, NoGeocoder, RequestError, ReverseGeocoder, TempUnit, WindyClient,
};
use crate::forecast::{self, AggregateError};

/// What the presentation layer should show
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    /// Nothing requested yet
    Empty,
    /// A fetch is in flight
    Loading,
    /// A forecast is available
    Success {
        summary: ForecastSummary,
        unit: TempUnit,
    },
    /// The last fetch failed
    Error(String),
}

/// Failures of the fetch pipeline, surfaced as [`DisplayState::Error`]
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Runs the request → aggregate pipeline and publishes its outcome
pub struct WeatherController {
    state: watch::Sender<DisplayState>,
    client: WindyClient,
    geocoder: Arc<dyn ReverseGeocoder>,
    default_unit: TempUnit,
}

impl WeatherController {
    /// Creates a controller in the `Empty` state that labels locations by coordinate
    pub fn new(client: WindyClient) -> Self {
        Self::with_geocoder(client, Arc::new(NoGeocoder))
    }

    /// Creates a controller that resolves locality names with `geocoder`
    pub fn with_geocoder(client: WindyClient, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        let (state, _) = watch::channel(DisplayState::Empty);
        Self {
            state,
            client,
            geocoder,
            default_unit: TempUnit::default(),
        }
    }

    /// Sets the unit used for freshly fetched forecasts
    pub fn with_default_unit(mut self, unit: TempUnit) -> Self {
        self.default_unit = unit;
        self
    }

    /// Snapshot of the current state
    pub fn current(&self) -> DisplayState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state.subscribe()
    }

    /// Fetches and aggregates a forecast, publishing Loading then Success or Error
    ///
    /// Overlapping calls are not deduplicated: whichever finishes last decides
    /// the final state.
    pub async fn request_fetch(&self, coordinate: Coordinate, api_key: &str) {
        self.state.send_replace(DisplayState::Loading);
        tracing::info!(%coordinate, "fetching forecast");

        let next = match self.fetch_summary(coordinate, api_key).await {
            Ok(summary) => {
                tracing::info!(location = %summary.location, "forecast ready");
                DisplayState::Success {
                    summary,
                    unit: self.default_unit,
                }
            }
            Err(e) => {
                tracing::error!("forecast fetch failed: {}", e);
                DisplayState::Error(e.to_string())
            }
        };
        self.state.send_replace(next);
    }

    /// Flips the temperature unit of a successful state; no-op otherwise
    pub fn toggle_unit(&self) {
        self.state.send_if_modified(|state| match state {
            DisplayState::Success { unit, .. } => {
                *unit = unit.toggled();
                true
            }
            DisplayState::Empty | DisplayState::Loading | DisplayState::Error(_) => false,
        });
    }

    async fn fetch_summary(
        &self,
        coordinate: Coordinate,
        api_key: &str,
    ) -> Result<ForecastSummary, FetchError> {
        let (raw, locality) = futures::join!(
            self.client.fetch_forecast(coordinate, api_key),
            self.resolve_locality(coordinate)
        );
        let raw = raw?;
        Ok(forecast::aggregate(&raw, coordinate, locality, &Local)?)
    }

    async fn resolve_locality(&self, coordinate: Coordinate) -> Option<String> {
        match self.geocoder.locality(coordinate).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("reverse geocoding failed, using coordinates: {}", e);
                None
            }
        }
    }
}
