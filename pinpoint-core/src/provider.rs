use crate::{Config, Coordinate, FetchOutcome, WeatherError, provider::open_meteo::OpenMeteoProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod open_meteo;

/// Source of current conditions for a coordinate.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions once. Implementations must not retry.
    async fn fetch(&self, coordinate: Coordinate) -> Result<FetchOutcome, WeatherError>;
}

/// Construct the weather provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let mut provider = OpenMeteoProvider::new().with_endpoint(config.endpoint());

    if let Some(timeout) = config.request_timeout() {
        provider = provider.with_timeout(timeout).map_err(|e| {
            anyhow::anyhow!("Failed to build HTTP client with {timeout:?} timeout: {e}")
        })?;
    }

    Ok(Arc::new(provider))
}
