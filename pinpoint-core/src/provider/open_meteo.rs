use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    coordinate::Coordinate,
    error::WeatherError,
    model::{FetchOutcome, WeatherSummary},
};

use super::WeatherProvider;

pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    endpoint: String,
    http: Client,
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self {
            endpoint: OPEN_METEO_FORECAST_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the provider at another forecast endpoint (mirror, test server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Replace the HTTP client with one that gives up after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, WeatherError> {
        self.http = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current_weather: Option<OmCurrentWeather>,
    daily: Option<OmDaily>,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    #[instrument(skip(self, coordinate), fields(coordinate = %coordinate), level = "info")]
    async fn fetch(&self, coordinate: Coordinate) -> Result<FetchOutcome, WeatherError> {
        coordinate.validate()?;

        let latitude = coordinate.latitude().to_string();
        let longitude = coordinate.longitude().to_string();
        tracing::debug!(endpoint = %self.endpoint, "requesting current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current_weather", "true"),
                ("timezone", "GMT"),
                ("daily", "precipitation_probability_max"),
            ])
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: OmForecastResponse = serde_json::from_str(&body)?;
        Ok(summarize(parsed))
    }
}

fn summarize(parsed: OmForecastResponse) -> FetchOutcome {
    let (Some(current), Some(daily)) = (parsed.current_weather, parsed.daily) else {
        return FetchOutcome::NotAvailable;
    };

    let Some(precipitation) = daily
        .precipitation_probability_max
        .into_iter()
        .flatten()
        .filter(|p| p.is_finite())
        .max_by(f64::total_cmp)
    else {
        tracing::debug!("daily precipitation probabilities were empty");
        return FetchOutcome::NotAvailable;
    };

    FetchOutcome::Available(WeatherSummary {
        temperature_celsius: current.temperature.floor() as i32,
        wind_speed_kmh: current.windspeed.floor() as i32,
        precipitation_probability_percent: precipitation.floor().clamp(0.0, 100.0) as u8,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
