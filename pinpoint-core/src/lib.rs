//! Core library for `pinpoint`.
//!
//! This crate defines:
//! - Coordinate normalization for map taps
//! - The weather client abstraction and its Open-Meteo implementation
//! - The selection state machine and the async session that drives it
//! - Configuration handling
//!
//! It is used by `pinpoint-cli`, but any front-end that can forward taps and
//! dismissals and render a [`Selection`] can reuse it.

pub mod config;
pub mod coordinate;
pub mod error;
pub mod model;
pub mod provider;
pub mod selection;
pub mod session;

pub use config::Config;
pub use coordinate::{Coordinate, CoordinateError};
pub use error::WeatherError;
pub use model::{FetchOutcome, WeatherSummary};
pub use provider::{WeatherProvider, provider_from_config};
pub use selection::{Selection, Transition};
pub use session::Session;
