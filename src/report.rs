//! Plain-text rendering of a forecast for `--once` mode

use std::fmt::Write;

use crate::data::{format_humidity, ForecastSummary, TempUnit};

/// Renders the summary as a short multi-line report
pub fn render_text(summary: &ForecastSummary, unit: TempUnit) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", summary.location);
    let _ = writeln!(
        out,
        "Now: {}  Humidity: {}  Wind: {}",
        summary.current_temperature.display(unit),
        summary.humidity_label(),
        summary.wind_label()
    );

    if !summary.hourly.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Hourly");
        for hour in &summary.hourly {
            let _ = writeln!(
                out,
                "  {:>5}  {:>6}  {:>4}  {}",
                hour.time,
                hour.temperature.display(unit),
                format_humidity(hour.humidity),
                hour.condition.tag()
            );
        }
    }

    if !summary.daily.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Daily");
        for day in &summary.daily {
            let _ = writeln!(
                out,
                "  {:<9}  {:>6} / {:<6}  {}",
                day.day,
                day.high.display(unit),
                day.low.display(unit),
                day.condition.tag()
            );
        }
    }

    out
}

/// Renders the summary as pretty-printed JSON
pub fn render_json(summary: &ForecastSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}
