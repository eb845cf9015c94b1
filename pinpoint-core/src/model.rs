/// Display-ready current conditions for one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherSummary {
    pub temperature_celsius: i32,
    pub wind_speed_kmh: i32,
    pub precipitation_probability_percent: u8,
}

/// Result of a request that reached the service and parsed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Available(WeatherSummary),
    /// The response lacked the fields needed to build a summary.
    NotAvailable,
}

