//! Command-line interface parsing for pointcast
//!
//! This module handles parsing of CLI arguments using clap and validates them
//! into a [`StartupConfig`]. The coordinate given here stands in for a device
//! location provider.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::{Coordinate, TempUnit};

/// Environment variable read when `--api-key` is not given
pub const API_KEY_ENV: &str = "WINDY_API_KEY";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// Latitude outside [-90, 90] or not a number
    #[error("Invalid latitude: {0}. Expected a value between -90 and 90")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not a number
    #[error("Invalid longitude: {0}. Expected a value between -180 and 180")]
    InvalidLongitude(f64),

    /// Unit argument is not recognized
    #[error("Invalid unit: '{0}'. Valid units: c, f")]
    InvalidUnit(String),

    /// No API key on the command line or in the environment
    #[error("Missing API key: pass --api-key or set WINDY_API_KEY")]
    MissingApiKey,

    /// Timeout of zero seconds
    #[error("Invalid timeout: must be at least 1 second")]
    InvalidTimeout,
}

/// pointcast - current conditions and forecast for a point on the map
#[derive(Parser, Debug)]
#[command(name = "pointcast")]
#[command(about = "Point forecast for a coordinate: current conditions, hourly and daily outlook")]
#[command(version)]
pub struct Cli {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Windy point-forecast API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Temperature unit to start with (c or f)
    #[arg(long, default_value = "c", value_name = "UNIT")]
    pub unit: String,

    /// Print the forecast once and exit instead of opening the terminal UI
    #[arg(long)]
    pub once: bool,

    /// Print the forecast as JSON and exit
    #[arg(long)]
    pub json: bool,

    /// Label the location by its coordinates instead of looking up a place name
    #[arg(long)]
    pub no_geocode: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 15, value_name = "SECS")]
    pub timeout: u64,

    /// Override the point-forecast endpoint
    #[arg(long, hide = true)]
    pub api_url: Option<String>,
}

/// How the forecast is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Interactive terminal screen
    #[default]
    Interactive,
    /// One text report on stdout
    Text,
    /// One JSON document on stdout
    Json,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub coordinate: Coordinate,
    pub api_key: String,
    pub unit: TempUnit,
    pub output: OutputMode,
    pub geocode: bool,
    pub timeout: Duration,
    pub api_url: Option<String>,
}

/// Parses a unit string argument into a TempUnit.
///
/// # Arguments
/// * `s` - The unit string from CLI
///
/// # Returns
/// * `Ok(TempUnit)` if the string names a known unit
/// * `Err(CliError::InvalidUnit)` if it doesn't
pub fn parse_unit_arg(s: &str) -> Result<TempUnit, CliError> {
    TempUnit::from_str(s).ok_or_else(|| CliError::InvalidUnit(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if a coordinate, unit, timeout or the key is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if !(-90.0..=90.0).contains(&cli.lat) {
            return Err(CliError::InvalidLatitude(cli.lat));
        }
        if !(-180.0..=180.0).contains(&cli.lon) {
            return Err(CliError::InvalidLongitude(cli.lon));
        }

        let api_key = cli
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingApiKey)?;

        if cli.timeout == 0 {
            return Err(CliError::InvalidTimeout);
        }

        let output = if cli.json {
            OutputMode::Json
        } else if cli.once {
            OutputMode::Text
        } else {
            OutputMode::Interactive
        };

        Ok(StartupConfig {
            coordinate: Coordinate::new(cli.lat, cli.lon),
            api_key,
            unit: parse_unit_arg(&cli.unit)?,
            output,
            geocode: !cli.no_geocode,
            timeout: Duration::from_secs(cli.timeout),
            api_url: cli.api_url.clone(),
        })
    }
}
