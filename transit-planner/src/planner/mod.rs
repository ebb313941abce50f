//! Journey planner using time-dependent A* search.
//!
//! This module answers: "leaving this stop now, which rides get me to that
//! stop earliest?"
//!
//! Each planning call owns its search state and its departure lookup, so
//! concurrent calls over a shared [`Network`] never see each other's data.

mod config;
mod open_set;
mod reconstruct;
mod search;


use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::departures::{DepartureLookup, DepartureSource};
use crate::domain::{DomainError, Itinerary, RoutePattern, Stop, StopId};
use crate::network::Network;

pub use config::SearchConfig;
pub use open_set::{HeapOpenSet, LinearOpenSet, OpenSet};
pub use reconstruct::build_itinerary;
pub use search::{Connection, NotFound, PathStep, SearchOutcome, SearchStats, Searcher};

/// Error from journey planning.
///
/// An unreachable destination is not an error; see [`PlanOutcome::NotFound`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlanError {
    /// Every departure fetch failed and live data was required
    #[error("departure data unavailable for all {stops} stops queried")]
    DeparturesUnavailable { stops: usize },

    /// The found path could not be turned into an itinerary
    #[error("failed to build itinerary: {0}")]
    Reconstruction(#[from] DomainError),
}

/// Result of a planning call.
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    Found(Itinerary),
    NotFound(NotFound),
}

impl PlanOutcome {
    pub fn itinerary(&self) -> Option<&Itinerary> {
        match self {
            PlanOutcome::Found(itinerary) => Some(itinerary),
            PlanOutcome::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PlanOutcome::Found(_))
    }
}

/// Journey planner over a pre-built network.
pub struct Planner<'a, S> {
    network: &'a Network,
    source: &'a S,
    config: &'a SearchConfig,
}

impl<'a, S: DepartureSource> Planner<'a, S> {
    /// Create a new planner.
    pub fn new(network: &'a Network, source: &'a S, config: &'a SearchConfig) -> Self {
        Self {
            network,
            source,
            config,
        }
    }

    /// Plan the earliest-arriving journey from `start` to `end`.
    ///
    /// `start_time` defaults to now.
    pub async fn plan(
        &self,
        start: StopId,
        end: StopId,
        start_time: Option<DateTime<Utc>>,
    ) -> Result<PlanOutcome, PlanError> {
        let start_time = start_time.unwrap_or_else(Utc::now);
        let mut lookup = DepartureLookup::new(self.source, self.config.departure_limit);

        let (outcome, stats) = Searcher::new(self.network, self.config)
            .search(start, end, start_time, &mut lookup)
            .await;

        if self.config.require_live_data && stats.lookups.all_failed() {
            warn!(
                from = %start,
                to = %end,
                stops = stats.lookups.fetched,
                "No departure data available, refusing to plan on estimates"
            );
            return Err(PlanError::DeparturesUnavailable {
                stops: stats.lookups.fetched,
            });
        }

        let path = match outcome {
            SearchOutcome::Found(path) => path,
            SearchOutcome::NotFound(reason) => {
                debug!(from = %start, to = %end, reason = %reason, "No journey found");
                return Ok(PlanOutcome::NotFound(reason));
            }
        };

        let itinerary = build_itinerary(&path, start_time)?;

        debug!(
            from = %start,
            to = %end,
            segments = itinerary.segments().len(),
            transfers = itinerary.transfers(),
            duration_secs = itinerary.total_duration().num_seconds(),
            expansions = stats.expansions,
            fallback_hops = stats.fallback_hops,
            "Planned journey"
        );

        Ok(PlanOutcome::Found(itinerary))
    }
}

/// Plan a journey over a network built from `patterns` for this call only.
pub async fn plan_journey<S: DepartureSource>(
    start: &Stop,
    end: &Stop,
    patterns: &[RoutePattern],
    start_time: Option<DateTime<Utc>>,
    source: &S,
    config: &SearchConfig,
) -> Result<PlanOutcome, PlanError> {
    let network = Network::build(patterns, config.travel_time.clone());
    Planner::new(&network, source, config)
        .plan(start.id, end.id, start_time)
        .await
}
