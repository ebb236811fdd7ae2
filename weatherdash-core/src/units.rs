use serde::{Deserialize, Serialize};

/// Unit used for rendering temperatures. Never used for storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl DisplayUnit {
    pub fn toggle(self) -> Self {
        match self {
            DisplayUnit::Celsius => DisplayUnit::Fahrenheit,
            DisplayUnit::Fahrenheit => DisplayUnit::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DisplayUnit::Celsius => "°C",
            DisplayUnit::Fahrenheit => "°F",
        }
    }
}

/// Convert a canonical Celsius value into `unit`. No rounding.
pub fn to_display(temp_c: f64, unit: DisplayUnit) -> f64 {
    match unit {
        DisplayUnit::Celsius => temp_c,
        DisplayUnit::Fahrenheit => temp_c * 9.0 / 5.0 + 32.0,
    }
}

/// Inverse of [`to_display`].
pub fn to_celsius(value: f64, unit: DisplayUnit) -> f64 {
    match unit {
        DisplayUnit::Celsius => value,
        DisplayUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
    }
}
