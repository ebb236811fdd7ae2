//! Error taxonomy for the dashboard core.
//!
//! Fetch failures are deliberately collapsed into a single kind: the dashboard
//! only ever shows one "not found" state, and the detail goes to the log.

use thiserror::Error;

/// Failure of a single forecast lookup (bad city, bad coordinates, transport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("location not found")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("'{0}' is already a favorite")]
    DuplicateCity(String),

    #[error("favorites are limited to {max} cities")]
    CapacityExceeded { max: usize },

    #[error("no favorite at position {0}")]
    IndexOutOfRange(usize),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Location permission denied!")]
    PermissionDenied,

    #[error("No location available")]
    Unsupported,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access storage file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode storage contents: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("{remaining}s remaining exceeds the {interval}s refresh interval")]
    RemainingOutOfRange { remaining: u32, interval: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinatesError {
    #[error("latitude {0} is outside -90..=90")]
    Latitude(f64),

    #[error("longitude {0} is outside -180..=180")]
    Longitude(f64),
}
