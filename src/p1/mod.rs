pub mod client;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{Error, Result};

/// `type` tag of the gas meter entry in the `external` list.
pub const GAS_METER_TYPE: &str = "gas_meter";

/// Identity of the P1 meter, as returned by `GET /api`.
#[derive(Debug, Clone, Deserialize)]
pub struct BasicInformation {
    pub product_name: String,
    pub product_type: String,
    pub serial: String,
    pub firmware_version: String,
    pub api_version: String,
}

/// A reading from a meter attached to the P1 meter (gas, water, heat...).
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalReading {
    pub unique_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// YYMMDDhhmmss packed into an integer, e.g. 231215235900.
    pub timestamp: i64,
    pub value: f64,
    pub unit: String,
}

/// Response of `GET /api/v1/data`. Only the external readings are used.
#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    #[serde(default)]
    pub external: Vec<ExternalReading>,
}

impl Data {
    pub fn gas_readings(&self) -> impl Iterator<Item = &ExternalReading> {
        self.external.iter().filter(|r| r.is_gas_meter())
    }
}

impl ExternalReading {
    pub fn is_gas_meter(&self) -> bool {
        self.kind == GAS_METER_TYPE
    }

    pub fn reading_time(&self) -> Result<NaiveDateTime> {
        parse_timestamp(self.timestamp)
    }
}

/// Parse a YYMMDDhhmmss integer timestamp.
/// Two-digit years 00-68 land in 20xx, 69-99 in 19xx.
pub fn parse_timestamp(timestamp: i64) -> Result<NaiveDateTime> {
    let raw = timestamp.to_string();
    if raw.len() != 12 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Timestamp(timestamp));
    }
    let field = |i: usize| raw[i..i + 2].parse::<u32>().map_err(|_| Error::Timestamp(timestamp));

    let yy = field(0)?;
    let year = if yy >= 69 { 1900 + yy } else { 2000 + yy };
    // and_hms_opt refuses second 60, so leap seconds are rejected too
    NaiveDate::from_ymd_opt(year as i32, field(2)?, field(4)?)
        .and_then(|d| d.and_hms_opt(field(6).ok()?, field(8).ok()?, field(10).ok()?))
        .ok_or(Error::Timestamp(timestamp))
}
