//! Display strings for a snapshot in a given unit.

use crate::{
    model::WeatherSnapshot,
    region::RegionNames,
    units::{DisplayUnit, to_display},
};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherView {
    pub city: String,
    pub country: String,
    pub temperature: String,
    pub condition: String,
    pub humidity: String,
    pub wind: String,
    pub visibility: String,
    pub pressure: String,
    pub feels_like: String,
    pub min_temp: String,
    pub max_temp: String,
    pub observed_at: Option<String>,
}

impl WeatherView {
    pub fn new(snapshot: &WeatherSnapshot, unit: DisplayUnit, regions: &dyn RegionNames) -> Self {
        let temp = |c: f64| format_temperature(c, unit);

        let country = regions
            .display_name(&snapshot.country_code)
            .unwrap_or_else(|| snapshot.country_code.clone());

        Self {
            city: snapshot.location_name.clone(),
            country,
            temperature: temp(snapshot.temperature_c),
            condition: snapshot
                .condition_description
                .as_deref()
                .map(title_case)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            humidity: or_na(snapshot.humidity_pct.map(|h| format!("{h}%"))),
            wind: format!("{:.1} km/h", snapshot.wind_speed_kmh),
            visibility: or_na(
                snapshot
                    .visibility_m
                    .map(|m| format!("{:.1} km", f64::from(m) / 1000.0)),
            ),
            pressure: or_na(snapshot.pressure_hpa.map(|p| format!("{p} hPa"))),
            feels_like: temp(snapshot.feels_like_c),
            min_temp: temp(snapshot.min_temp_c),
            max_temp: temp(snapshot.max_temp_c),
            observed_at: snapshot
                .observed_at
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string()),
        }
    }
}

/// Rounded to the nearest whole degree, with the unit symbol.
pub fn format_temperature(temp_c: f64, unit: DisplayUnit) -> String {
    let rounded = to_display(temp_c, unit).round();
    // avoid "-0°C"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.0}{}", unit.symbol())
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
