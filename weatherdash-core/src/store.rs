use crate::{model::WeatherSnapshot, units::DisplayUnit};

/// Single slot for the last fetched snapshot plus the active display unit.
///
/// `replace` is last-write-wins: whichever fetch completes last is kept,
/// regardless of the order the requests were issued in.
#[derive(Debug, Default)]
pub struct WeatherSnapshotStore {
    current: Option<WeatherSnapshot>,
    unit: DisplayUnit,
}

impl WeatherSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&WeatherSnapshot> {
        self.current.as_ref()
    }

    pub fn unit(&self) -> DisplayUnit {
        self.unit
    }

    pub fn replace(&mut self, snapshot: WeatherSnapshot) {
        self.current = Some(snapshot);
    }

    /// Changes how the stored snapshot is rendered. Never triggers a fetch.
    pub fn set_unit(&mut self, unit: DisplayUnit) {
        self.unit = unit;
    }

    pub fn toggle_unit(&mut self) -> DisplayUnit {
        self.unit = self.unit.toggle();
        self.unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(city: &str, temp: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            location_name: city.into(),
            country_code: "IN".into(),
            temperature_c: temp,
            feels_like_c: temp,
            min_temp_c: temp - 2.0,
            max_temp_c: temp + 2.0,
            humidity_pct: Some(70),
            wind_speed_kmh: 10.8,
            visibility_m: Some(10_000),
            pressure_hpa: Some(1008),
            condition_description: Some("haze".into()),
            observed_at: None,
        }
    }

    #[test]
    fn replace_overwrites_previous_snapshot() {
        let mut store = WeatherSnapshotStore::new();
        assert!(store.current().is_none());

        store.replace(snapshot("Kolkata", 30.0));
        store.replace(snapshot("Delhi", 25.0));

        let current = store.current().expect("snapshot stored");
        assert_eq!(current.location_name, "Delhi");
        assert_eq!(current.temperature_c, 25.0);
    }

    #[test]
    fn unit_changes_leave_snapshot_untouched() {
        let mut store = WeatherSnapshotStore::new();
        store.replace(snapshot("Kolkata", 30.4));

        assert_eq!(store.toggle_unit(), DisplayUnit::Fahrenheit);
        store.set_unit(DisplayUnit::Celsius);
        store.set_unit(DisplayUnit::Fahrenheit);

        assert_eq!(store.unit(), DisplayUnit::Fahrenheit);
        assert_eq!(store.current(), Some(&snapshot("Kolkata", 30.4)));
    }
}
