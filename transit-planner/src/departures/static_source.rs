//! In-memory departure source.
//!
//! Serves fixed departure data as if it came from the live feed. Used for
//! tests and for running the server without upstream access.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{Departure, StopId};

use super::source::{DepartureSource, SourceError};

/// Contents of one `{stop_id}.json` file.
#[derive(Debug, Default, Deserialize)]
struct StaticBoard {
    #[serde(default)]
    departures: Vec<Departure>,
    #[serde(default)]
    arrivals: Vec<Departure>,
}

/// Departure source backed by fixed data.
///
/// Stops without data return empty feeds rather than errors.
#[derive(Debug, Clone, Default)]
pub struct StaticDepartureSource {
    departures: HashMap<StopId, Vec<Departure>>,
    arrivals: HashMap<StopId, Vec<Departure>>,
}

impl StaticDepartureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_departures(&mut self, stop: StopId, departures: Vec<Departure>) {
        self.departures.entry(stop).or_default().extend(departures);
    }

    pub fn add_arrivals(&mut self, stop: StopId, arrivals: Vec<Departure>) {
        self.arrivals.entry(stop).or_default().extend(arrivals);
    }

    /// Builder-style variant of [`add_departures`](Self::add_departures).
    pub fn with_departures(mut self, stop: StopId, departures: Vec<Departure>) -> Self {
        self.add_departures(stop, departures);
        self
    }

    /// Load boards from a directory of `{stop_id}.json` files.
    ///
    /// Each file holds `{"departures": [...], "arrivals": [...]}`; either key
    /// may be omitted. Files whose stem is not a stop number are ignored.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let mut source = Self::new();

        let entries = std::fs::read_dir(dir)
            .map_err(|e| SourceError::Load(format!("failed to read {dir:?}: {e}")))?;

        for entry in entries {
            let entry =
                entry.map_err(|e| SourceError::Load(format!("failed to read entry: {e}")))?;
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let Some(stop) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| StopId::parse(s).ok())
            else {
                continue;
            };

            let json = std::fs::read_to_string(&path)
                .map_err(|e| SourceError::Load(format!("failed to read {path:?}: {e}")))?;
            let board: StaticBoard = serde_json::from_str(&json)
                .map_err(|e| SourceError::Load(format!("failed to parse {path:?}: {e}")))?;

            source.add_departures(stop, board.departures);
            source.add_arrivals(stop, board.arrivals);
        }

        Ok(source)
    }

    /// Stops that have any data.
    pub fn stops(&self) -> Vec<StopId> {
        let mut stops: Vec<StopId> = self
            .departures
            .keys()
            .chain(self.arrivals.keys())
            .copied()
            .collect();
        stops.sort();
        stops.dedup();
        stops
    }
}

fn earliest(events: Option<&Vec<Departure>>, limit: usize) -> Vec<Departure> {
    let mut events = events.cloned().unwrap_or_default();
    events.sort_by_key(|d| d.event_time());
    events.truncate(limit);
    events
}

impl DepartureSource for StaticDepartureSource {
    async fn departures_from(
        &self,
        stop: StopId,
        limit: usize,
    ) -> Result<Vec<Departure>, SourceError> {
        Ok(earliest(self.departures.get(&stop), limit))
    }

    async fn arrivals_at(&self, stop: StopId, limit: usize) -> Result<Vec<Departure>, SourceError> {
        Ok(earliest(self.arrivals.get(&stop), limit))
    }
}
