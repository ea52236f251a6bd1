//! # Tide-Gauge Data Fetching
//!
//! This module handles all network operations for fetching recent tide readings from the
//! Environment Agency's real-time flood-monitoring API.
//!
//! ## Data Source
//!
//! ### Environment Agency flood-monitoring API
//! - **Endpoint**: `{base_url}/id/stations/{id}/readings.json?_limit=100&_sorted`
//! - **Station**: E70839 (Cramond) by default, configurable in crossing-config.toml
//! - **Format**: JSON document with an `items` array, newest reading first
//! - **Item fields**: `dateTime` (ISO-8601), `measure` (URL), `value` (metres)
//!
//! ### Data Processing Pipeline
//! 1. **Fetch**: one HTTP GET with a request timeout
//! 2. **Check**: non-2xx statuses are errors, not empty data
//! 3. **Decode**: parse the JSON body and validate every record
//! 4. **Order**: sort newest first and keep at most `limit` readings
//!
//! ## Error Handling
//!
//! There is no retry and no cache. Every failure propagates as a [`FetchError`] and the
//! caller shows a "data unavailable" state until the next scheduled refresh.

use crate::{config::StationConfig, Reading, ReadingSeries};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while fetching and decoding readings.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed (network, timeout, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned status {0}")]
    Status(StatusCode),

    /// Body is not the expected JSON document
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A reading is missing a field or carries an unparseable timestamp
    #[error("malformed reading at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
}

#[derive(Debug, Deserialize)]
struct ReadingsPage {
    items: Vec<RawReading>,
}

#[derive(Debug, Deserialize)]
struct RawReading {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    measure: Option<String>,
    value: Option<f64>,
}

/// Full readings URL for a station.
pub fn readings_url(station: &StationConfig) -> String {
    format!(
        "{}/id/stations/{}/readings.json?_limit={}&_sorted",
        station.base_url.trim_end_matches('/'),
        station.id,
        station.limit
    )
}

/// HTTP client with the station's timeout applied.
pub fn build_client(station: &StationConfig) -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(station.timeout_secs))
        .user_agent(concat!("crossing-checker/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Fetch the latest readings for a station.
///
/// # Example
/// ```no_run
/// use crossing_lib::{config::StationConfig, tide_data};
///
/// # async fn run() -> Result<(), tide_data::FetchError> {
/// let station = StationConfig::default();
/// let client = tide_data::build_client(&station)?;
/// let series = tide_data::fetch(&client, &station).await?;
/// println!("{} readings", series.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch(
    client: &reqwest::Client,
    station: &StationConfig,
) -> Result<ReadingSeries, FetchError> {
    let url = readings_url(station);
    debug!(%url, "fetching tide readings");

    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = response.text().await?;
    let series = parse_readings(&body, station.limit)?;

    info!(
        station = %station.id,
        count = series.len(),
        latest = ?series.latest().map(|r| r.value),
        "fetched tide readings"
    );
    Ok(series)
}

/// Decode a readings document into a newest-first series of at most `limit` readings.
pub fn parse_readings(body: &str, limit: usize) -> Result<ReadingSeries, FetchError> {
    let page: ReadingsPage = serde_json::from_str(body)?;

    let mut readings = page
        .items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| convert(index, raw))
        .collect::<Result<Vec<_>, _>>()?;

    // Stable sort: an already newest-first page is left untouched
    readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    readings.truncate(limit);

    Ok(ReadingSeries::new(readings))
}

fn convert(index: usize, raw: RawReading) -> Result<Reading, FetchError> {
    let malformed = |reason: String| FetchError::MalformedRecord { index, reason };

    let date_time = raw
        .date_time
        .ok_or_else(|| malformed("missing dateTime".to_string()))?;
    let timestamp = DateTime::parse_from_rfc3339(&date_time)
        .map_err(|e| malformed(format!("bad dateTime {:?}: {}", date_time, e)))?
        .with_timezone(&Utc);
    let value = raw
        .value
        .ok_or_else(|| malformed("missing value".to_string()))?;

    Ok(Reading {
        timestamp,
        source_ref: raw.measure.unwrap_or_default(),
        value,
    })
}
