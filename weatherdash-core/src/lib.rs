//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - The forecast client and its normalized snapshot model
//! - The snapshot store, unit conversion and favorites registry
//! - The auto-refresh scheduler and the dashboard controller that drives it
//! - Configuration and the collaborator traits (storage, geolocation, presenter)
//!
//! It is used by `weatherdash-cli`, but the controller only talks to traits, so
//! other front ends can drive it too.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod favorites;
pub mod location;
pub mod model;
pub mod presenter;
pub mod provider;
pub mod region;
pub mod scheduler;
pub mod storage;
pub mod store;
pub mod units;
pub mod view;

pub use config::{Config, LocationConfig, StaleFetchPolicy};
pub use dashboard::{Command, Dashboard, DashboardOptions, Flow, Submission};
pub use error::{FavoritesError, FetchError, GeolocationError, SchedulerError, StoreError};
pub use favorites::{FavoritesRegistry, MAX_FAVORITES};
pub use location::{ConfiguredLocation, GeolocationProvider};
pub use model::{Coordinates, WeatherSnapshot};
pub use presenter::Presenter;
pub use provider::{ForecastClient, client_from_config};
pub use scheduler::{DEFAULT_INTERVAL, RefreshScheduler, RefreshState};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::WeatherSnapshotStore;
pub use units::{DisplayUnit, to_display};
pub use view::WeatherView;
