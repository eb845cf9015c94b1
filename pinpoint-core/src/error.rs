//! Failures of the weather client.

use thiserror::Error;

use crate::coordinate::CoordinateError;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse weather JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid coordinate: {0}")]
    InvalidInput(#[from] CoordinateError),
}
