//! One-shot geolocation.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{config::LocationConfig, error::GeolocationError, model::Coordinates};

#[async_trait]
pub trait GeolocationProvider: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Position taken from the `[location]` section of the config file.
#[derive(Debug, Clone)]
pub struct ConfiguredLocation {
    enabled: bool,
    position: Option<Coordinates>,
}

impl ConfiguredLocation {
    pub fn new(enabled: bool, position: Option<Coordinates>) -> Self {
        Self { enabled, position }
    }

    pub fn from_config(config: &LocationConfig) -> Self {
        let position = match (config.latitude, config.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon)
                .inspect_err(|e| tracing::warn!("ignoring configured location: {e}"))
                .ok(),
            _ => None,
        };
        Self::new(config.enabled, position)
    }
}

#[async_trait]
impl GeolocationProvider for ConfiguredLocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        if !self.enabled {
            return Err(GeolocationError::PermissionDenied);
        }
        self.position.ok_or(GeolocationError::Unsupported)
    }
}
