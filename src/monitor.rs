//! # Refresh Policy
//!
//! Owns the single latest snapshot of readings and decides when to fetch a new one.
//!
//! - [`Monitor::refresh`] fetches exactly once and replaces the snapshot wholesale.
//! - [`Monitor::run`] fetches immediately, then once per interval, until the shutdown
//!   channel says stop. A failed fetch waits for the next tick; there is no retry loop.
//!   A fetch still in flight when shutdown arrives is dropped.

use crate::{
    config::StationConfig,
    tide_data::{self, FetchError},
    ReadingSeries,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Anything that can produce a fresh series of readings.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch_readings(&self) -> Result<ReadingSeries, FetchError>;
}

/// Reads from the flood-monitoring API.
pub struct HttpSource {
    client: reqwest::Client,
    station: StationConfig,
}

impl HttpSource {
    pub fn new(station: StationConfig) -> Result<Self, FetchError> {
        let client = tide_data::build_client(&station)?;
        Ok(Self { client, station })
    }
}

#[async_trait]
impl ReadingSource for HttpSource {
    async fn fetch_readings(&self) -> Result<ReadingSeries, FetchError> {
        tide_data::fetch(&self.client, &self.station).await
    }
}

/// A series together with the moment it was fetched.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub series: ReadingSeries,
    pub fetched_at: DateTime<Utc>,
}

/// What the report should show.
#[derive(Clone, Debug)]
pub enum DisplayState {
    /// No fetch has completed yet
    Loading,
    /// The last fetch failed
    Unavailable { reason: String },
    /// The last fetch succeeded
    Ready(Snapshot),
}

pub struct Monitor<S> {
    source: S,
    state: DisplayState,
}

impl<S: ReadingSource> Monitor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: DisplayState::Loading,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Fetch once and replace the current state.
    pub async fn refresh(&mut self) -> &DisplayState {
        let result = self.source.fetch_readings().await;
        self.apply(result)
    }

    fn apply(&mut self, result: Result<ReadingSeries, FetchError>) -> &DisplayState {
        self.state = match result {
            Ok(series) => {
                debug!(count = series.len(), "snapshot replaced");
                DisplayState::Ready(Snapshot {
                    series,
                    fetched_at: Utc::now(),
                })
            }
            Err(e) => {
                warn!(error = %e, "tide data unavailable");
                DisplayState::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        &self.state
    }

    /// Poll every `every` until `shutdown` becomes true or its sender is dropped.
    ///
    /// `on_update` runs after each fetch, successful or not.
    pub async fn run<F>(&mut self, every: Duration, mut shutdown: watch::Receiver<bool>, mut on_update: F)
    where
        F: FnMut(&DisplayState),
    {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = every.as_secs(), "watching tide readings");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    // A shutdown during the fetch drops it
                    let result = tokio::select! {
                        biased;
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                info!("shutdown during fetch, abandoning it");
                                break;
                            }
                            continue;
                        }
                        result = self.source.fetch_readings() => result,
                    };
                    on_update(self.apply(result));
                }
            }
        }
        info!("stopped watching tide readings");
    }
}
