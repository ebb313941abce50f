//! The departure source abstraction.

use std::future::Future;

use crate::domain::{Departure, StopId};

/// Error from a departure source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The upstream feed could not be fetched or decoded
    #[error("departure feed for stop {stop} failed: {message}")]
    Fetch { stop: StopId, message: String },

    /// Static departure data could not be loaded
    #[error("failed to load departure data: {0}")]
    Load(String),
}

/// Trait for providing per-stop departure feeds.
///
/// This abstraction allows the planner to be tested with mock data. Both
/// methods return events in no particular order; merging and ordering happen
/// in [`DepartureLookup`](super::DepartureLookup).
pub trait DepartureSource {
    /// Vehicles departing from `stop`, at most `limit` of them.
    fn departures_from(
        &self,
        stop: StopId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Departure>, SourceError>> + Send;

    /// Vehicles arriving at `stop`, at most `limit` of them.
    fn arrivals_at(
        &self,
        stop: StopId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Departure>, SourceError>> + Send;
}
