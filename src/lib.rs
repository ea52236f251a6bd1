//! # Crossing Checker Core Library
//!
//! This library provides the data structures and pure classification logic behind the
//! Crammond Island crossing checker. It answers one question for a walker standing at
//! the causeway: can I cross right now, and will I still be able to get back?
//!
//! ## Design Philosophy
//!
//! ### Pure Core, Thin Shell
//! - **Classification is pure**: [`classifier`] holds stateless functions over a slice of
//!   readings. No I/O, no clocks, no globals.
//! - **Typed preconditions**: an empty series or a single reading produces a
//!   [`classifier::ClassifyError`] instead of a comparison against missing data
//! - **Explicit ownership**: the latest fetched series lives inside a
//!   [`monitor::Monitor`] and is replaced wholesale on every refresh
//!
//! ### Data Flow
//! 1. **Fetch**: GET the latest 100 readings for station E70839 from the Environment
//!    Agency flood-monitoring API ([`tide_data`])
//! 2. **Classify**: derive crossing safety, trend and the early-warning flag ([`classifier`])
//! 3. **Render**: status block, ASCII chart and colour-coded reading list ([`renderer`])
//!
//! Fetch failures never crash the program; they become a "data unavailable" display state.
//!
//! ## Core Types
//! - [`Reading`]: a single tide-gauge sample
//! - [`ReadingSeries`]: the newest-first batch returned by one fetch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod classifier;
pub mod config;
pub mod format;
pub mod logger;
pub mod monitor;
pub mod renderer;
pub mod tide_data;

/// Maximum number of readings requested per fetch.
pub const MAX_READINGS: usize = 100;

/// One tide-gauge sample.
///
/// Values are metres relative to the station datum, so they are usually negative
/// around low water at Cramond.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use crossing_lib::Reading;
///
/// let reading = Reading {
///     timestamp: Utc.with_ymd_and_hms(2023, 3, 1, 9, 5, 0).unwrap(),
///     source_ref: "http://environment.data.gov.uk/flood-monitoring/id/measures/E70839-level-tidal_level-Mean-15_min-mAOD".to_string(),
///     value: -0.92,
/// };
/// assert!(reading.value < 0.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the sample was taken
    pub timestamp: DateTime<Utc>,
    /// URL of the measurement stream the sample came from
    pub source_ref: String,
    /// Tide height in metres relative to station datum
    pub value: f64,
}

/// An ordered batch of readings, newest first.
///
/// `readings[0]` is the most recent sample and `readings[1]` the one immediately
/// before it. The fetcher establishes this ordering; the classifier relies on it
/// without checking.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use crossing_lib::{Reading, ReadingSeries};
///
/// let now = Utc.with_ymd_and_hms(2023, 3, 1, 9, 15, 0).unwrap();
/// let series = ReadingSeries::new(vec![
///     Reading { timestamp: now, source_ref: String::new(), value: -0.90 },
///     Reading { timestamp: now - Duration::minutes(15), source_ref: String::new(), value: -0.95 },
/// ]);
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.latest().map(|r| r.value), Some(-0.90));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingSeries {
    /// Readings ordered newest first
    pub readings: Vec<Reading>,
}

impl ReadingSeries {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Most recent reading, if any.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.first()
    }

    /// Readings in chronological order, oldest first. Used for charting.
    pub fn oldest_first(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter().rev()
    }

    pub fn as_slice(&self) -> &[Reading] {
        &self.readings
    }
}
