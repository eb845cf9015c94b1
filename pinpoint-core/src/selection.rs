//! Selection state machine.
//!
//! Exactly one [`Selection`] holds at a time. A completion is applied only when
//! the selection is still `Pending` for the same coordinate; anything else is
//! stale and dropped.

use crate::{Coordinate, FetchOutcome, WeatherError, WeatherSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Pending(Coordinate),
    Resolved(Coordinate, WeatherSummary),
    Failed(Coordinate),
}

/// What applying a completion did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Resolved,
    Failed,
    /// The completion no longer matched the current selection.
    Stale,
}

impl Selection {
    /// Coordinate of the current selection, if any.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match *self {
            Selection::Idle => None,
            Selection::Pending(c) | Selection::Resolved(c, _) | Selection::Failed(c) => Some(c),
        }
    }

    pub fn summary(&self) -> Option<&WeatherSummary> {
        match self {
            Selection::Resolved(_, summary) => Some(summary),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Selection::Pending(_))
    }

    /// True if a completion for `coordinate` would be applied.
    pub fn awaits(&self, coordinate: Coordinate) -> bool {
        matches!(self, Selection::Pending(c) if *c == coordinate)
    }

    /// Start a new selection, superseding whatever was there.
    pub fn select(&mut self, coordinate: Coordinate) {
        *self = Selection::Pending(coordinate);
    }

    /// Apply the result of the request issued for `coordinate`.
    pub fn complete(
        &mut self,
        coordinate: Coordinate,
        result: &Result<FetchOutcome, WeatherError>,
    ) -> Transition {
        if !self.awaits(coordinate) {
            return Transition::Stale;
        }

        match result {
            Ok(FetchOutcome::Available(summary)) => {
                *self = Selection::Resolved(coordinate, *summary);
                Transition::Resolved
            }
            Ok(FetchOutcome::NotAvailable) | Err(_) => {
                *self = Selection::Failed(coordinate);
                Transition::Failed
            }
        }
    }

    pub fn dismiss(&mut self) {
        *self = Selection::Idle;
    }
}
