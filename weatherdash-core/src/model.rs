use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoordinatesError;

/// The "current conditions" taken from the first entry of a forecast payload.
///
/// Temperatures are always stored in Celsius; conversion happens only when a
/// view is formatted. A fresh fetch replaces the whole value, nothing is merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// City name reported by the API; empty for some coordinate lookups.
    pub location_name: String,
    /// ISO 3166 alpha-2 code, empty when the API omits it.
    pub country_code: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub humidity_pct: Option<u8>,
    pub wind_speed_kmh: f64,
    pub visibility_m: Option<u32>,
    pub pressure_hpa: Option<u32>,
    pub condition_description: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherSnapshot {
    /// City name to re-query on auto-refresh, if the snapshot carries one.
    pub fn city(&self) -> Option<&str> {
        let name = self.location_name.trim();
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = CoordinatesError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::Longitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_reject_out_of_range_values() {
        assert!(Coordinates::new(22.57, 88.36).is_ok());
        assert_eq!(
            Coordinates::new(91.0, 0.0).unwrap_err(),
            CoordinatesError::Latitude(91.0)
        );
        assert_eq!(
            Coordinates::new(0.0, -180.5).unwrap_err(),
            CoordinatesError::Longitude(-180.5)
        );
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn deserialized_coordinates_are_validated() {
        let coords: Coordinates =
            serde_json::from_str(r#"{"latitude":60.17,"longitude":24.94}"#).unwrap();
        assert_eq!(coords, Coordinates::new(60.17, 24.94).unwrap());

        let err = serde_json::from_str::<Coordinates>(r#"{"latitude":120.0,"longitude":0.0}"#)
            .unwrap_err();
        assert!(err.to_string().contains("latitude 120"));
    }

    #[test]
    fn blank_location_name_has_no_city() {
        let snapshot = WeatherSnapshot {
            location_name: "  ".into(),
            country_code: String::new(),
            temperature_c: 0.0,
            feels_like_c: 0.0,
            min_temp_c: 0.0,
            max_temp_c: 0.0,
            humidity_pct: None,
            wind_speed_kmh: 0.0,
            visibility_m: None,
            pressure_hpa: None,
            condition_description: None,
            observed_at: None,
        };
        assert_eq!(snapshot.city(), None);

        let named = WeatherSnapshot { location_name: "Lima".into(), ..snapshot };
        assert_eq!(named.city(), Some("Lima"));
    }
}
