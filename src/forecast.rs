//! Forecast aggregation
//!
//! Turns the raw, index-aligned point-forecast series into a
//! [`ForecastSummary`]: current conditions from the first sample, an hourly
//! strip and per-day highs and lows. Everything here is pure; the locality
//! name is resolved by the caller and passed in.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone};
use thiserror::Error;

use crate::data::{
    Condition, Coordinate, DailyForecastEntry, ForecastSummary, HourlyForecastEntry, RawForecast,
    Temperature,
};

/// Number of hourly entries returned: the current hour plus the next eight
pub const HOURLY_LIMIT: usize = 9;

/// Maximum number of days returned
pub const DAILY_LIMIT: usize = 6;

/// Cloud cover (percent) above which a layer makes the sky cloudy
const CLOUD_COVER_THRESHOLD: f64 = 50.0;

/// Reasons a payload cannot be aggregated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("Malformed forecast payload: missing '{0}' series")]
    MissingSeries(&'static str),

    #[error("Malformed forecast payload: no samples")]
    Empty,

    #[error("Malformed forecast payload: '{series}' has {actual} values, expected {expected}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed forecast payload: null value in '{series}' at index {index}")]
    NullValue { series: &'static str, index: usize },

    #[error("Malformed forecast payload: timestamp {0} out of range")]
    InvalidTimestamp(i64),
}

/// Series after validation, all of the same non-zero length
struct Samples<'a> {
    ts: &'a [i64],
    temp: Vec<f64>,
    rh: Vec<f64>,
    wind_u: Vec<f64>,
    wind_v: Vec<f64>,
    ptype: Vec<f64>,
    lclouds: Vec<f64>,
    mclouds: Vec<f64>,
    hclouds: Vec<f64>,
}

impl<'a> Samples<'a> {
    fn from_raw(raw: &'a RawForecast) -> Result<Self, AggregateError> {
        let ts = raw
            .ts
            .as_deref()
            .ok_or(AggregateError::MissingSeries("ts"))?;
        if ts.is_empty() {
            return Err(AggregateError::Empty);
        }
        let len = ts.len();

        Ok(Self {
            ts,
            temp: required("temp-surface", raw.temp.as_deref(), len)?,
            rh: required("rh-surface", raw.rh.as_deref(), len)?,
            wind_u: required("wind_u-surface", raw.wind_u.as_deref(), len)?,
            wind_v: required("wind_v-surface", raw.wind_v.as_deref(), len)?,
            ptype: optional("ptype-surface", raw.ptype.as_deref(), len)?,
            lclouds: optional("lclouds-surface", raw.lclouds.as_deref(), len)?,
            mclouds: optional("mclouds-surface", raw.mclouds.as_deref(), len)?,
            hclouds: optional("hclouds-surface", raw.hclouds.as_deref(), len)?,
        })
    }

    fn len(&self) -> usize {
        self.ts.len()
    }

    fn condition(&self, i: usize) -> Condition {
        classify_condition(
            self.ptype[i] as i32,
            self.lclouds[i],
            self.mclouds[i],
            self.hclouds[i],
        )
    }
}

/// A series that must be present, aligned and free of nulls
fn required(
    series: &'static str,
    values: Option<&[Option<f64>]>,
    len: usize,
) -> Result<Vec<f64>, AggregateError> {
    let values = values.ok_or(AggregateError::MissingSeries(series))?;
    check_len(series, values, len)?;
    values
        .iter()
        .enumerate()
        .map(|(index, v)| v.ok_or(AggregateError::NullValue { series, index }))
        .collect()
}

/// A condition series: absent or null values read as zero, but a present
/// series must still be aligned
fn optional(
    series: &'static str,
    values: Option<&[Option<f64>]>,
    len: usize,
) -> Result<Vec<f64>, AggregateError> {
    match values {
        None => Ok(vec![0.0; len]),
        Some(values) => {
            check_len(series, values, len)?;
            Ok(values.iter().map(|v| v.unwrap_or(0.0)).collect())
        }
    }
}

fn check_len(
    series: &'static str,
    values: &[Option<f64>],
    expected: usize,
) -> Result<(), AggregateError> {
    if values.len() != expected {
        return Err(AggregateError::LengthMismatch {
            series,
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

/// Classifies one sample; the first matching rule wins
///
/// - any precipitation type other than 0: rain
/// - any cloud layer covering more than half the sky: cloudy
/// - otherwise: clear
pub fn classify_condition(ptype: i32, lclouds: f64, mclouds: f64, hclouds: f64) -> Condition {
    if ptype > 0 {
        Condition::Rain
    } else if lclouds > CLOUD_COVER_THRESHOLD
        || mclouds > CLOUD_COVER_THRESHOLD
        || hclouds > CLOUD_COVER_THRESHOLD
    {
        Condition::Cloudy
    } else {
        Condition::Clear
    }
}

/// Wind speed from its u/v components, rounded to whole m/s
pub fn wind_speed(u: f64, v: f64) -> u32 {
    u.hypot(v).round() as u32
}

/// Relative humidity rounded to a whole percent
pub fn round_humidity(rh: f64) -> u8 {
    rh.round().clamp(0.0, 100.0) as u8
}

/// Hour label such as "3pm"
pub fn hour_label<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    time.format("%-I%P").to_string()
}

/// Full weekday name such as "Tuesday"
pub fn day_label<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    time.format("%A").to_string()
}

/// Most frequent condition; on a tie the one seen first wins
pub fn dominant_condition(conditions: impl IntoIterator<Item = Condition>) -> Option<Condition> {
    let mut counts: Vec<(Condition, usize)> = Vec::new();
    for condition in conditions {
        match counts.iter_mut().find(|(c, _)| *c == condition) {
            Some((_, n)) => *n += 1,
            None => counts.push((condition, 1)),
        }
    }

    let mut best: Option<(Condition, usize)> = None;
    for (condition, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((condition, n));
        }
    }
    best.map(|(condition, _)| condition)
}

/// Builds the forecast summary for `coordinate`
///
/// `locality` is the reverse-geocoded place name, if any; a missing or blank
/// name is replaced by the formatted coordinate. Hours and days are computed
/// in `tz`.
pub fn aggregate<Tz: TimeZone>(
    raw: &RawForecast,
    coordinate: Coordinate,
    locality: Option<String>,
    tz: &Tz,
) -> Result<ForecastSummary, AggregateError>
where
    Tz::Offset: fmt::Display,
{
    let samples = Samples::from_raw(raw)?;

    let times = samples
        .ts
        .iter()
        .map(|&ms| {
            tz.timestamp_millis_opt(ms)
                .single()
                .ok_or(AggregateError::InvalidTimestamp(ms))
        })
        .collect::<Result<Vec<DateTime<Tz>>, _>>()?;

    let hourly: Vec<HourlyForecastEntry> = (0..samples.len())
        .map(|i| HourlyForecastEntry {
            time: hour_label(&times[i]),
            timestamp_ms: samples.ts[i],
            temperature: Temperature::from_kelvin(samples.temp[i]),
            humidity: round_humidity(samples.rh[i]),
            condition: samples.condition(i),
        })
        .collect();

    let daily = daily_forecast(&times, &hourly);

    let location = locality
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| coordinate.fallback_label());

    tracing::debug!(
        samples = samples.len(),
        days = daily.len(),
        %location,
        "aggregated forecast"
    );

    Ok(ForecastSummary {
        location,
        coordinate,
        current_temperature: Temperature::from_kelvin(samples.temp[0]),
        current_humidity: round_humidity(samples.rh[0]),
        current_wind_speed: wind_speed(samples.wind_u[0], samples.wind_v[0]),
        hourly: hourly.into_iter().take(HOURLY_LIMIT).collect(),
        daily,
    })
}

/// Groups hourly entries by local calendar day, in order of first appearance
fn daily_forecast<Tz: TimeZone>(
    times: &[DateTime<Tz>],
    hourly: &[HourlyForecastEntry],
) -> Vec<DailyForecastEntry>
where
    Tz::Offset: fmt::Display,
{
    let mut groups: Vec<(NaiveDate, String, Vec<&HourlyForecastEntry>)> = Vec::new();
    for (time, entry) in times.iter().zip(hourly) {
        let date = time.date_naive();
        match groups.iter_mut().find(|(d, _, _)| *d == date) {
            Some((_, _, entries)) => entries.push(entry),
            None => groups.push((date, day_label(time), vec![entry])),
        }
    }

    groups
        .into_iter()
        .take(DAILY_LIMIT)
        .filter_map(|(_, day, entries)| {
            let high = entries
                .iter()
                .map(|e| e.temperature.celsius)
                .fold(f64::NEG_INFINITY, f64::max);
            let low = entries
                .iter()
                .map(|e| e.temperature.celsius)
                .fold(f64::INFINITY, f64::min);
            let condition = dominant_condition(entries.iter().map(|e| e.condition))?;
            Some(DailyForecastEntry {
                day,
                high: Temperature::from_celsius(high),
                low: Temperature::from_celsius(low),
                condition,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{FixedOffset, Utc};

    /// 2024-07-15T00:00:00Z, a Monday
    const MONDAY_MIDNIGHT_UTC: i64 = 1_721_001_600_000;
    const HOUR_MS: i64 = 3_600_000;

    /// Builds a payload of `n` samples spaced `step_ms` apart with the given
    /// Kelvin temperatures cycled
    fn payload(n: usize, step_ms: i64, temps_k: &[f64]) -> RawForecast {
        let some = |v: f64| vec![Some(v); n];
        RawForecast {
            ts: Some((0..n as i64).map(|i| MONDAY_MIDNIGHT_UTC + i * step_ms).collect()),
            temp: Some((0..n).map(|i| Some(temps_k[i % temps_k.len()])).collect()),
            rh: Some(some(60.0)),
            wind_u: Some(some(3.0)),
            wind_v: Some(some(4.0)),
            ptype: Some(some(0.0)),
            lclouds: Some(some(0.0)),
            mclouds: Some(some(0.0)),
            hclouds: Some(some(0.0)),
        }
    }

    fn coord() -> Coordinate {
        Coordinate::new(49.2827, -123.1207)
    }

    #[test]
    fn test_end_to_end_current_conditions() {
        let raw = RawForecast {
            ts: Some(vec![1_700_000_000_000, 1_700_003_600_000]),
            temp: Some(vec![Some(290.15), Some(288.15)]),
            rh: Some(vec![Some(50.0), Some(55.0)]),
            wind_u: Some(vec![Some(1.0), Some(1.0)]),
            wind_v: Some(vec![Some(0.0), Some(0.0)]),
            ..Default::default()
        };

        let summary = aggregate(&raw, coord(), Some("Vancouver".to_string()), &Utc).unwrap();

        assert!((summary.current_temperature.celsius - 17.0).abs() < 1e-6);
        assert_eq!(summary.current_wind_speed, 1);
        assert_eq!(summary.wind_label(), "1 m/s");
        assert_eq!(summary.humidity_label(), "50%");
        assert_eq!(summary.location, "Vancouver");
        assert_eq!(summary.hourly.len(), 2);
        // 2023-11-14T22:13:20Z
        assert_eq!(summary.hourly[0].time, "10pm");
        assert_eq!(summary.hourly[1].time, "11pm");
        assert_eq!(summary.hourly[0].condition, Condition::Clear);
    }

    #[test]
    fn test_wind_speed_is_euclidean_norm() {
        assert_eq!(wind_speed(3.0, 4.0), 5);
        assert_eq!(wind_speed(-3.0, -4.0), 5);
        assert_eq!(wind_speed(1.0, 1.0), 1);
        assert_eq!(wind_speed(1.2, 1.2), 2);
        assert_eq!(wind_speed(0.0, 0.0), 0);
    }

    #[test]
    fn test_round_humidity() {
        assert_eq!(round_humidity(50.4), 50);
        assert_eq!(round_humidity(50.5), 51);
        assert_eq!(round_humidity(99.9), 100);
        assert_eq!(round_humidity(-2.0), 0);
    }

    #[test]
    fn test_condition_priority() {
        // Precipitation beats any cloud cover
        assert_eq!(classify_condition(1, 0.0, 0.0, 90.0), Condition::Rain);
        assert_eq!(classify_condition(3, 100.0, 100.0, 100.0), Condition::Rain);

        assert_eq!(classify_condition(0, 51.0, 0.0, 0.0), Condition::Cloudy);
        assert_eq!(classify_condition(0, 0.0, 51.0, 0.0), Condition::Cloudy);
        assert_eq!(classify_condition(0, 0.0, 0.0, 51.0), Condition::Cloudy);

        // Exactly 50% is not cloudy
        assert_eq!(classify_condition(0, 50.0, 50.0, 50.0), Condition::Clear);
        assert_eq!(classify_condition(0, 0.0, 0.0, 0.0), Condition::Clear);
    }

    #[test]
    fn test_dominant_condition_tie_keeps_first_seen() {
        let conditions = [
            Condition::Cloudy,
            Condition::Rain,
            Condition::Rain,
            Condition::Cloudy,
        ];
        assert_eq!(dominant_condition(conditions), Some(Condition::Cloudy));

        let conditions = [Condition::Clear, Condition::Rain, Condition::Rain];
        assert_eq!(dominant_condition(conditions), Some(Condition::Rain));

        assert_eq!(dominant_condition([]), None);
    }

    #[test]
    fn test_hour_label_format() {
        let noon = Utc.timestamp_millis_opt(MONDAY_MIDNIGHT_UTC + 12 * HOUR_MS).unwrap();
        let midnight = Utc.timestamp_millis_opt(MONDAY_MIDNIGHT_UTC).unwrap();
        let morning = Utc.timestamp_millis_opt(MONDAY_MIDNIGHT_UTC + 9 * HOUR_MS).unwrap();

        assert_eq!(hour_label(&noon), "12pm");
        assert_eq!(hour_label(&midnight), "12am");
        assert_eq!(hour_label(&morning), "9am");
        assert_eq!(day_label(&noon), "Monday");
    }

    #[test]
    fn test_hourly_includes_current_hour_and_caps_at_nine() {
        let raw = payload(24, HOUR_MS, &[280.0]);
        let summary = aggregate(&raw, coord(), None, &Utc).unwrap();

        assert_eq!(summary.hourly.len(), HOURLY_LIMIT);
        assert_eq!(summary.hourly[0].timestamp_ms, MONDAY_MIDNIGHT_UTC);
        assert_eq!(summary.hourly[0].time, "12am");
        assert_eq!(summary.hourly[8].time, "8am");

        for pair in summary.hourly.windows(2) {
            assert!(pair[0].timestamp_ms < pair[1].timestamp_ms);
        }
    }

    #[test]
    fn test_daily_groups_by_day_in_utc() {
        let raw = payload(48, HOUR_MS, &[280.0]);
        let summary = aggregate(&raw, coord(), None, &Utc).unwrap();

        let days: Vec<&str> = summary.daily.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(days, ["Monday", "Tuesday"]);
    }

    #[test]
    fn test_daily_groups_follow_time_zone() {
        // UTC-7: the first seven samples fall on Sunday evening
        let tz = FixedOffset::west_opt(7 * 3600).unwrap();
        let raw = payload(48, HOUR_MS, &[280.0]);
        let summary = aggregate(&raw, coord(), None, &tz).unwrap();

        let days: Vec<&str> = summary.daily.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(days, ["Sunday", "Monday", "Tuesday"]);
        assert_eq!(summary.hourly[0].time, "5pm");
    }

    #[test]
    fn test_daily_capped_at_six_in_chronological_order() {
        // Eight days of six-hourly samples
        let raw = payload(32, 6 * HOUR_MS, &[280.0]);
        let summary = aggregate(&raw, coord(), None, &Utc).unwrap();

        let days: Vec<&str> = summary.daily.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(
            days,
            ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]
        );
    }

    #[test]
    fn test_at_most_six_days_and_nine_hours_for_a_day_of_samples() {
        let raw = payload(24, HOUR_MS, &[280.0, 281.0]);
        let summary = aggregate(&raw, coord(), None, &Utc).unwrap();

        assert!(summary.daily.len() <= DAILY_LIMIT);
        assert!(summary.hourly.len() <= HOURLY_LIMIT);
    }

    #[test]
    fn test_daily_high_low() {
        // 10°C, 15°C, 5°C within the same day
        let raw = payload(3, HOUR_MS, &[283.15, 288.15, 278.15]);
        let summary = aggregate(&raw, coord(), None, &Utc).unwrap();

        assert_eq!(summary.daily.len(), 1);
        let day = &summary.daily[0];
        assert!((day.high.celsius - 15.0).abs() < 1e-6);
        assert!((day.low.celsius - 5.0).abs() < 1e-6);
        assert!((day.high.fahrenheit - 59.0).abs() < 1e-6);
        assert!((day.low.fahrenheit - 41.0).abs() < 1e-6);
    }

    #[test]
    fn test_daily_condition_is_most_frequent() {
        let mut raw = payload(4, HOUR_MS, &[280.0]);
        raw.ptype = Some(vec![Some(0.0), Some(1.0), Some(1.0), Some(0.0)]);
        raw.hclouds = Some(vec![Some(90.0), Some(0.0), Some(0.0), Some(90.0)]);

        let summary = aggregate(&raw, coord(), None, &Utc).unwrap();

        let conditions: Vec<Condition> = summary.hourly.iter().map(|h| h.condition).collect();
        assert_eq!(
            conditions,
            [Condition::Cloudy, Condition::Rain, Condition::Rain, Condition::Cloudy]
        );
        // Two each: the first seen wins
        assert_eq!(summary.daily[0].condition, Condition::Cloudy);
    }

    #[test]
    fn test_rain_beats_high_clouds_in_payload() {
        let mut raw = payload(1, HOUR_MS, &[280.0]);
        raw.ptype = Some(vec![Some(1.0)]);
        raw.hclouds = Some(vec![Some(90.0)]);

        let summary = aggregate(&raw, coord(), None, &Utc).unwrap();
        assert_eq!(summary.hourly[0].condition, Condition::Rain);
    }

    #[test]
    fn test_unequal_lengths_are_rejected() {
        let mut raw = payload(3, HOUR_MS, &[280.0]);
        raw.rh = Some(vec![Some(50.0), Some(50.0)]);

        let err = aggregate(&raw, coord(), None, &Utc).unwrap_err();
        assert_eq!(
            err,
            AggregateError::LengthMismatch {
                series: "rh-surface",
                expected: 3,
                actual: 2
            }
        );
        assert!(err.to_string().contains("Malformed forecast payload"));
    }

    #[test]
    fn test_misaligned_condition_series_is_rejected() {
        let mut raw = payload(3, HOUR_MS, &[280.0]);
        raw.lclouds = Some(vec![Some(10.0)]);

        let err = aggregate(&raw, coord(), None, &Utc).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::LengthMismatch {
                series: "lclouds-surface",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_required_series() {
        let mut raw = payload(3, HOUR_MS, &[280.0]);
        raw.temp = None;
        assert_eq!(
            aggregate(&raw, coord(), None, &Utc).unwrap_err(),
            AggregateError::MissingSeries("temp-surface")
        );

        let mut raw = payload(3, HOUR_MS, &[280.0]);
        raw.ts = None;
        assert_eq!(
            aggregate(&raw, coord(), None, &Utc).unwrap_err(),
            AggregateError::MissingSeries("ts")
        );
    }

    #[test]
    fn test_empty_payload() {
        let raw = payload(0, HOUR_MS, &[280.0]);
        assert_eq!(
            aggregate(&raw, coord(), None, &Utc).unwrap_err(),
            AggregateError::Empty
        );
    }

    #[test]
    fn test_null_in_required_series() {
        let mut raw = payload(2, HOUR_MS, &[280.0]);
        raw.temp = Some(vec![Some(280.0), None]);
        assert_eq!(
            aggregate(&raw, coord(), None, &Utc).unwrap_err(),
            AggregateError::NullValue {
                series: "temp-surface",
                index: 1
            }
        );
    }

    #[test]
    fn test_null_in_condition_series_reads_as_zero() {
        let mut raw = payload(2, HOUR_MS, &[280.0]);
        raw.ptype = Some(vec![None, Some(2.0)]);

        let summary = aggregate(&raw, coord(), None, &Utc).unwrap();
        assert_eq!(summary.hourly[0].condition, Condition::Clear);
        assert_eq!(summary.hourly[1].condition, Condition::Rain);
    }

    #[test]
    fn test_location_falls_back_to_coordinates() {
        let raw = payload(2, HOUR_MS, &[280.0]);

        let summary = aggregate(&raw, coord(), None, &Utc).unwrap();
        assert_eq!(summary.location, "49.2827, -123.1207");

        let summary = aggregate(&raw, coord(), Some("   ".to_string()), &Utc).unwrap();
        assert_eq!(summary.location, "49.2827, -123.1207");
    }
}
