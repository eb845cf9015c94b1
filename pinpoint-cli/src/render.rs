//! Text rendering of the current selection.

use std::fmt;

use pinpoint_core::{Coordinate, Selection, WeatherSummary};

/// What the weather modal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Closed,
    Loading,
    Summary(WeatherSummary),
}

/// Everything the screen shows for one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub marker: Option<Coordinate>,
    pub modal: Modal,
    /// A tap that produced no weather. The modal stays closed.
    pub no_result: bool,
}

impl From<&Selection> for View {
    fn from(selection: &Selection) -> Self {
        let modal = match selection {
            Selection::Idle | Selection::Failed(_) => Modal::Closed,
            Selection::Pending(_) => Modal::Loading,
            Selection::Resolved(_, summary) => Modal::Summary(*summary),
        };

        Self {
            marker: selection.coordinate(),
            modal,
            no_result: matches!(selection, Selection::Failed(_)),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.marker {
            Some(c) => writeln!(f, "Marker: {c}")?,
            None => writeln!(f, "No point selected")?,
        }

        match self.modal {
            Modal::Closed if self.no_result => writeln!(f, "No weather for this point")?,
            Modal::Closed => {}
            Modal::Loading => writeln!(f, "Loading weather...")?,
            Modal::Summary(summary) => {
                writeln!(f, "  Temperature    {} °C", summary.temperature_celsius)?;
                writeln!(f, "  Wind           {} Km/h", summary.wind_speed_kmh)?;
                writeln!(
                    f,
                    "  Precipitation  {}%",
                    summary.precipitation_probability_percent
                )?;
                writeln!(f, "  [close]")?;
            }
        }

        Ok(())
    }
}
