pub mod client;

use chrono::NaiveDateTime;
use serde::Serialize;

pub const DEFAULT_URL: &str = "https://www.mindergas.nl/api/meter_readings";

/// Body of `POST /api/meter_readings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterReading {
    /// Calendar date of the reading, YYYY-MM-DD.
    pub date: String,
    /// Meter value with six decimals, sent as a string.
    pub reading: String,
}

impl MeterReading {
    pub fn new(reading_time: NaiveDateTime, value: f64) -> Self {
        Self {
            date: reading_time.format("%Y-%m-%d").to_string(),
            reading: format!("{value:.6}"),
        }
    }
}
