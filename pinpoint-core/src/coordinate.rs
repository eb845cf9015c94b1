use std::hash::{Hash, Hasher};

use thiserror::Error;

// Two decimal places.
const SCALE: f64 = 100.0;

/// A map position rounded to two decimal places.
///
/// Two coordinates compare equal when their rounded values are bit-identical,
/// so a `Coordinate` can be used directly as a location key. Non-finite
/// values only ever equal the same non-finite value.
#[derive(Debug, Clone, Copy)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Coordinate is not a finite number: ({latitude}, {longitude})")]
    NotFinite { latitude: f64, longitude: f64 },

    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    /// Round a raw tap position half-away-from-zero to two decimals.
    ///
    /// Out-of-range values are passed through; see [`Coordinate::validate`].
    pub fn normalize(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: round_to_precision(latitude),
            longitude: round_to_precision(longitude),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Bit patterns of the rounded values, used for equality and hashing.
    pub fn key(&self) -> (u64, u64) {
        (self.latitude.to_bits(), self.longitude.to_bits())
    }

    /// Check that the coordinate lies on the globe.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(CoordinateError::NotFinite {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

// f64::round already rounds half away from zero. -0.0 is folded into 0.0 so
// the bit-level key stays stable.
fn round_to_precision(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded = (value * SCALE).round() / SCALE;
    if rounded == 0.0 { 0.0 } else { rounded }
}
