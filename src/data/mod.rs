//! Core data models for pointcast
//!
//! This module contains the value types shared by the requester, the
//! aggregator and the display layer: coordinates, temperatures, condition
//! tags and the hourly/daily forecast entries.

pub mod geocode;
pub mod windy;

pub use geocode::{GeocodeError, NoGeocoder, NominatimGeocoder, ReverseGeocoder};
pub use windy::{RawForecast, RequestError, WindyClient};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Offset between the Kelvin and Celsius scales
const KELVIN_OFFSET: f64 = 273.15;

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (north positive)
    pub latitude: f64,
    /// Longitude in degrees (east positive)
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true if both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Label used when no locality name is available, e.g. "49.2827, -123.1207"
    pub fn fallback_label(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Converts a Kelvin reading to Celsius
pub fn to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Converts a Kelvin reading to Fahrenheit
pub fn to_fahrenheit(kelvin: f64) -> f64 {
    kelvin * 9.0 / 5.0 - 459.67
}

/// A temperature kept in both display scales
///
/// Always built through one of the constructors so that
/// `fahrenheit == celsius * 9/5 + 32` holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
}

impl Temperature {
    /// Builds a temperature from a Kelvin reading as delivered by the provider
    pub fn from_kelvin(kelvin: f64) -> Self {
        Self {
            celsius: to_celsius(kelvin),
            fahrenheit: to_fahrenheit(kelvin),
        }
    }

    /// Builds a temperature from a Celsius value
    pub fn from_celsius(celsius: f64) -> Self {
        Self {
            celsius,
            fahrenheit: celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Returns the value in the requested unit
    pub fn value(&self, unit: TempUnit) -> f64 {
        match unit {
            TempUnit::Celsius => self.celsius,
            TempUnit::Fahrenheit => self.fahrenheit,
        }
    }

    /// Formats the value rounded to whole degrees with its unit suffix, e.g. "17°C"
    pub fn display(&self, unit: TempUnit) -> String {
        format!("{:.0}{}", self.value(unit), unit.suffix())
    }
}

/// Temperature unit preference of the display layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    /// Returns the other unit
    pub fn toggled(self) -> Self {
        match self {
            TempUnit::Celsius => TempUnit::Fahrenheit,
            TempUnit::Fahrenheit => TempUnit::Celsius,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TempUnit::Celsius => "°C",
            TempUnit::Fahrenheit => "°F",
        }
    }

    /// Parses a unit name, accepting "c"/"celsius" and "f"/"fahrenheit"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "c" | "celsius" => Some(TempUnit::Celsius),
            "f" | "fahrenheit" => Some(TempUnit::Fahrenheit),
            _ => None,
        }
    }
}

/// Sky condition derived from precipitation type and cloud cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Clear,
    Cloudy,
    Rain,
}

impl Condition {
    /// Short tag used in reports and JSON output
    pub fn tag(self) -> &'static str {
        match self {
            Condition::Clear => "clear",
            Condition::Cloudy => "cloudy",
            Condition::Rain => "rain",
        }
    }

    /// Glyph shown in the terminal UI
    pub fn icon(self) -> &'static str {
        match self {
            Condition::Clear => "☀",
            Condition::Cloudy => "☁",
            Condition::Rain => "☂",
        }
    }
}

/// Formats a humidity percentage for display, e.g. "50%"
pub fn format_humidity(humidity: u8) -> String {
    format!("{}%", humidity)
}

/// Forecast for a single hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastEntry {
    /// Hour label in local time, e.g. "3pm"
    pub time: String,
    /// Source timestamp in epoch milliseconds
    pub timestamp_ms: i64,
    pub temperature: Temperature,
    /// Relative humidity rounded to a whole percent
    pub humidity: u8,
    pub condition: Condition,
}

/// Aggregate forecast for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    /// Full weekday name in local time, e.g. "Tuesday"
    pub day: String,
    pub high: Temperature,
    pub low: Temperature,
    /// Most frequent condition of the day's hours
    pub condition: Condition,
}

/// Everything the display layer needs for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Locality name, or formatted coordinates when none could be resolved
    pub location: String,
    pub coordinate: Coordinate,
    pub current_temperature: Temperature,
    /// Current relative humidity in whole percent
    pub current_humidity: u8,
    /// Current wind speed in whole m/s
    pub current_wind_speed: u32,
    /// Current hour followed by the upcoming hours
    pub hourly: Vec<HourlyForecastEntry>,
    /// Upcoming days in chronological order
    pub daily: Vec<DailyForecastEntry>,
}

impl ForecastSummary {
    /// Current humidity formatted for display, e.g. "50%"
    pub fn humidity_label(&self) -> String {
        format_humidity(self.current_humidity)
    }

    /// Current wind speed formatted for display, e.g. "4 m/s"
    pub fn wind_label(&self) -> String {
        format!("{} m/s", self.current_wind_speed)
    }
}
