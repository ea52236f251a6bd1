//! # Tide Classification
//!
//! Pure rules that turn a newest-first series of readings into the three signals a
//! walker needs:
//!
//! - **Can I cross?** The latest reading is at or below the underwater threshold.
//! - **Which way is the tide going?** The latest reading compared with the one before.
//! - **Should I head back?** Crossing is possible, the tide is coming in, and the
//!   latest reading has already climbed to the danger threshold.
//!
//! The free functions use the station defaults ([`UNDERWATER_VALUE`], [`DANGER_VALUE`]).
//! [`Thresholds`] carries the same rules for configured values.

use crate::Reading;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crossing is passable when the latest reading is at or below this (metres).
pub const UNDERWATER_VALUE: f64 = -0.80;

/// A rising tide at or above this (metres) while still passable triggers the warning.
pub const DANGER_VALUE: f64 = -1.10;

/// Precondition failures for classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// No readings at all
    #[error("no tide readings available")]
    EmptySeries,

    /// Not enough readings to compare
    #[error("insufficient data: need {required} readings, have {available}")]
    InsufficientData { required: usize, available: usize },
}

/// Direction of the tide between the two most recent readings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Rising or flat
    ComingIn,
    /// Falling
    GoingOut,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::ComingIn => "Tide is coming in",
            Trend::GoingOut => "Tide is going out",
        }
    }
}

/// Colour token for a single reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueColor {
    Safe,
    Unsafe,
}

impl ValueColor {
    pub fn hex(self) -> &'static str {
        match self {
            ValueColor::Safe => "#48BB78",
            ValueColor::Unsafe => "#F56565",
        }
    }
}

/// Everything derived from one series.
#[derive(Clone, Debug, PartialEq)]
pub struct CrossingReport {
    pub can_cross: bool,
    pub trend: Trend,
    pub soon_underwater: bool,
    /// The reading the decision was made on
    pub latest: Reading,
}

/// The two thresholds that parameterise every rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub underwater_value: f64,
    pub danger_value: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            underwater_value: UNDERWATER_VALUE,
            danger_value: DANGER_VALUE,
        }
    }
}

impl Thresholds {
    /// True when a tide height leaves the causeway passable.
    pub fn is_passable(&self, value: f64) -> bool {
        value <= self.underwater_value
    }

    pub fn can_cross(&self, series: &[Reading]) -> Result<bool, ClassifyError> {
        let latest = series.first().ok_or(ClassifyError::EmptySeries)?;
        Ok(self.is_passable(latest.value))
    }

    pub fn is_coming_in(&self, series: &[Reading]) -> Result<bool, ClassifyError> {
        match series {
            [latest, previous, ..] => Ok(latest.value >= previous.value),
            _ => Err(ClassifyError::InsufficientData {
                required: 2,
                available: series.len(),
            }),
        }
    }

    pub fn trend(&self, series: &[Reading]) -> Result<Trend, ClassifyError> {
        Ok(if self.is_coming_in(series)? {
            Trend::ComingIn
        } else {
            Trend::GoingOut
        })
    }

    /// True when the crossing is open but a rising tide has reached the danger band.
    ///
    /// Returns `Ok(false)` as soon as crossing is impossible, without looking at the
    /// trend, and as soon as the tide is going out, without looking at the danger
    /// threshold.
    pub fn show_soon_underwater_warning(&self, series: &[Reading]) -> Result<bool, ClassifyError> {
        if !self.can_cross(series)? {
            return Ok(false);
        }
        if !self.is_coming_in(series)? {
            return Ok(false);
        }
        let latest = series.first().ok_or(ClassifyError::EmptySeries)?;
        Ok(latest.value >= self.danger_value)
    }

    pub fn value_color(&self, value: f64) -> ValueColor {
        if self.is_passable(value) {
            ValueColor::Safe
        } else {
            ValueColor::Unsafe
        }
    }

    /// Run every rule once. Needs at least two readings.
    pub fn classify(&self, series: &[Reading]) -> Result<CrossingReport, ClassifyError> {
        let trend = self.trend(series)?;
        let latest = series.first().ok_or(ClassifyError::EmptySeries)?;
        Ok(CrossingReport {
            can_cross: self.can_cross(series)?,
            trend,
            soon_underwater: self.show_soon_underwater_warning(series)?,
            latest: latest.clone(),
        })
    }
}

pub fn can_cross(series: &[Reading]) -> Result<bool, ClassifyError> {
    Thresholds::default().can_cross(series)
}

pub fn is_coming_in(series: &[Reading]) -> Result<bool, ClassifyError> {
    Thresholds::default().is_coming_in(series)
}

pub fn show_soon_underwater_warning(series: &[Reading]) -> Result<bool, ClassifyError> {
    Thresholds::default().show_soon_underwater_warning(series)
}

pub fn value_color(value: f64) -> ValueColor {
    Thresholds::default().value_color(value)
}

pub fn classify(series: &[Reading]) -> Result<CrossingReport, ClassifyError> {
    Thresholds::default().classify(series)
}
