use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{error::FetchError, model::Coordinates, model::WeatherSnapshot};

use super::ForecastClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const FORECAST_PATH: &str = "/data/2.5/forecast";

/// m/s → km/h
const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

enum Query<'a> {
    City(&'a str),
    Coordinates(Coordinates),
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn fetch_forecast(&self, query: Query<'_>) -> Result<WeatherSnapshot> {
        let url = format!("{}{}", self.base_url, FORECAST_PATH);

        let mut params = match query {
            Query::City(name) => vec![("q", name.to_string())],
            Query::Coordinates(coords) => vec![
                ("lat", coords.latitude().to_string()),
                ("lon", coords.longitude().to_string()),
            ],
        };
        params.push(("units", "metric".to_string()));
        params.push(("appid", self.api_key.clone()));

        let res = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .context("Failed to send request to OpenWeather (forecast)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather forecast JSON")?;

        snapshot_from_forecast(parsed)
    }
}

fn snapshot_from_forecast(parsed: OwForecastResponse) -> Result<WeatherSnapshot> {
    let OwForecastResponse { city, list } = parsed;

    let current = list
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("OpenWeather forecast response contained no data"))?;

    let condition_description = current
        .weather
        .into_iter()
        .next()
        .and_then(|w| w.description)
        .filter(|d| !d.trim().is_empty());

    Ok(WeatherSnapshot {
        location_name: city.name.unwrap_or_default(),
        country_code: city.country.unwrap_or_default(),
        temperature_c: current.main.temp,
        feels_like_c: current.main.feels_like,
        min_temp_c: current.main.temp_min,
        max_temp_c: current.main.temp_max,
        humidity_pct: current.main.humidity.filter(|h| *h != 0),
        wind_speed_kmh: current.wind.speed * MPS_TO_KMH,
        visibility_m: current.visibility.filter(|v| *v != 0),
        pressure_hpa: current.main.pressure.filter(|p| *p != 0),
        condition_description,
        observed_at: current.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
    })
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    #[serde(default)]
    humidity: Option<u8>,
    #[serde(default)]
    pressure: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwCity {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    #[serde(default)]
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    city: OwCity,
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl ForecastClient for OpenWeatherClient {
    async fn fetch_by_city(&self, name: &str) -> Result<WeatherSnapshot, FetchError> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("refusing forecast lookup for blank city name");
            return Err(FetchError::NotFound);
        }

        tracing::debug!(city = name, "fetching forecast");
        self.fetch_forecast(Query::City(name)).await.map_err(|e| {
            tracing::warn!(city = name, "forecast lookup failed: {e:#}");
            FetchError::NotFound
        })
    }

    async fn fetch_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherSnapshot, FetchError> {
        tracing::debug!(
            lat = coords.latitude(),
            lon = coords.longitude(),
            "fetching forecast"
        );
        self.fetch_forecast(Query::Coordinates(coords))
            .await
            .map_err(|e| {
                tracing::warn!(
                    lat = coords.latitude(),
                    lon = coords.longitude(),
                    "forecast lookup failed: {e:#}"
                );
                FetchError::NotFound
            })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_fields_become_absent() {
        let parsed: OwForecastResponse = serde_json::from_value(serde_json::json!({
            "city": { "name": "Reykjavik", "country": "IS" },
            "list": [{
                "main": {
                    "temp": -1.5, "feels_like": -6.0, "temp_min": -2.0, "temp_max": 0.0,
                    "humidity": 0, "pressure": 0
                },
                "wind": { "speed": 5.0 },
                "visibility": 0,
                "weather": [{ "description": "" }]
            }]
        }))
        .unwrap();

        let snapshot = snapshot_from_forecast(parsed).unwrap();
        assert_eq!(snapshot.humidity_pct, None);
        assert_eq!(snapshot.pressure_hpa, None);
        assert_eq!(snapshot.visibility_m, None);
        assert_eq!(snapshot.condition_description, None);
        assert_eq!(snapshot.wind_speed_kmh, 18.0);
        assert_eq!(snapshot.observed_at, None);
    }

    #[test]
    fn empty_list_is_an_error() {
        let parsed: OwForecastResponse = serde_json::from_value(serde_json::json!({
            "city": { "name": "Nowhere" },
            "list": []
        }))
        .unwrap();

        assert!(snapshot_from_forecast(parsed).is_err());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);

        assert_eq!(truncate_body("short"), "short");
    }
}
