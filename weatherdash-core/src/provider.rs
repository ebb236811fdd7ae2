use crate::{
    Config, WeatherSnapshot,
    error::FetchError,
    model::Coordinates,
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// One forecast lookup per call, normalized into a [`WeatherSnapshot`].
///
/// Implementations never retry; every failure collapses into
/// [`FetchError::NotFound`].
#[async_trait]
pub trait ForecastClient: Send + Sync + Debug {
    async fn fetch_by_city(&self, name: &str) -> Result<WeatherSnapshot, FetchError>;

    async fn fetch_by_coordinates(&self, coords: Coordinates)
    -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the forecast client described by the config.
pub fn client_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastClient>> {
    let api_key = config.api_key()?;

    let client = match config.base_url.as_deref() {
        Some(base_url) => OpenWeatherClient::with_base_url(api_key.to_owned(), base_url),
        None => OpenWeatherClient::new(api_key.to_owned()),
    };

    Ok(Box::new(client))
}
