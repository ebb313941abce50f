//! Time-dependent A* search over the stop network.
//!
//! The cost of a node is the earliest known arrival instant at that stop.
//! Traversing an edge boards the earliest matching departure at the current
//! stop, or falls back to a fixed wait when nothing matches, then adds the
//! edge's estimated riding time. The heuristic is the straight-line riding
//! time to the destination at the policy speed, which never overestimates.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use crate::departures::{DepartureLookup, DepartureSource, LookupStats};
use crate::domain::{Departure, Stop, StopId, TripId};
use crate::geo::distance_km;
use crate::network::{Edge, Network};

use super::config::SearchConfig;
use super::open_set::{HeapOpenSet, OpenSet};

/// One traversed edge with its resolved timing.
#[derive(Debug, Clone)]
pub struct Connection {
    pub from: StopId,
    pub edge: Edge,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub trip: TripId,
}

impl Connection {
    pub fn to(&self) -> StopId {
        self.edge.to
    }

    pub fn is_fallback(&self) -> bool {
        self.trip.is_fallback()
    }
}

/// A stop on the found path, with the connection that reached it.
///
/// The first step is the start stop and has no connection.
#[derive(Debug, Clone)]
pub struct PathStep {
    pub stop: Stop,
    pub connection: Option<Connection>,
}

/// Why no itinerary was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    /// The stop is not in the network.
    StopNotInNetwork(StopId),
    /// Start and destination are the same stop.
    AlreadyAtDestination,
    /// The destination cannot be reached from the start.
    NoPath,
    /// The search expanded this many stops without reaching the destination.
    ExpansionLimit(usize),
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::StopNotInNetwork(id) => write!(f, "stop {id} is not in the network"),
            NotFound::AlreadyAtDestination => write!(f, "already at destination"),
            NotFound::NoPath => write!(f, "no route connects these stops"),
            NotFound::ExpansionLimit(n) => {
                write!(f, "search gave up after expanding {n} stops")
            }
        }
    }
}

/// Counters for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Stops expanded.
    pub expansions: usize,
    /// Fallback connections that became a best arrival.
    pub fallback_hops: usize,
    /// Departure fetches made.
    pub lookups: LookupStats,
}

/// Result of one search.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Stops from start to destination, in travel order.
    Found(Vec<PathStep>),
    NotFound(NotFound),
}

/// A* engine over a built network.
pub struct Searcher<'a> {
    network: &'a Network,
    config: &'a SearchConfig,
}

impl<'a> Searcher<'a> {
    pub fn new(network: &'a Network, config: &'a SearchConfig) -> Self {
        Self { network, config }
    }

    /// Search with the default heap-backed open set.
    pub async fn search<S: DepartureSource>(
        &self,
        start: StopId,
        end: StopId,
        start_time: DateTime<Utc>,
        lookup: &mut DepartureLookup<'_, S>,
    ) -> (SearchOutcome, SearchStats) {
        self.search_with(HeapOpenSet::new(), start, end, start_time, lookup)
            .await
    }

    /// Search with a caller-chosen open set.
    pub async fn search_with<S, Q>(
        &self,
        mut open: Q,
        start: StopId,
        end: StopId,
        start_time: DateTime<Utc>,
        lookup: &mut DepartureLookup<'_, S>,
    ) -> (SearchOutcome, SearchStats)
    where
        S: DepartureSource,
        Q: OpenSet<StopId, DateTime<Utc>>,
    {
        let mut stats = SearchStats::default();

        let Some(start_stop) = self.network.stop(&start) else {
            return (SearchOutcome::NotFound(NotFound::StopNotInNetwork(start)), stats);
        };
        let Some(goal) = self.network.stop(&end) else {
            return (SearchOutcome::NotFound(NotFound::StopNotInNetwork(end)), stats);
        };
        if start == end {
            return (SearchOutcome::NotFound(NotFound::AlreadyAtDestination), stats);
        }

        let mut best: HashMap<StopId, DateTime<Utc>> = HashMap::new();
        let mut came_from: HashMap<StopId, Connection> = HashMap::new();
        let mut fallback_seq: u64 = 0;

        best.insert(start, start_time);
        open.push_or_decrease(start, start_time + self.heuristic(start_stop, goal));

        while let Some(current) = open.pop_min() {
            if current == end {
                stats.lookups = lookup.stats();
                debug!(
                    from = %start,
                    to = %end,
                    expansions = stats.expansions,
                    fetched = stats.lookups.fetched,
                    failed = stats.lookups.failed,
                    "Search reached destination"
                );
                let outcome = match self.unwind(start, end, came_from) {
                    Some(path) => SearchOutcome::Found(path),
                    None => SearchOutcome::NotFound(NotFound::NoPath),
                };
                return (outcome, stats);
            }

            if stats.expansions >= self.config.max_expansions {
                stats.lookups = lookup.stats();
                warn!(
                    from = %start,
                    to = %end,
                    limit = self.config.max_expansions,
                    "Search hit expansion limit"
                );
                return (
                    SearchOutcome::NotFound(NotFound::ExpansionLimit(stats.expansions)),
                    stats,
                );
            }
            stats.expansions += 1;

            let Some(&arrival) = best.get(&current) else {
                continue;
            };
            let edges = self.network.edges_from(&current);
            if edges.is_empty() {
                continue;
            }

            let departures = lookup.departures(current).await;
            trace!(
                stop = %current,
                arrival = %arrival,
                departures = departures.len(),
                edges = edges.len(),
                "Expanding stop"
            );

            for edge in edges {
                if edge.to == start {
                    continue;
                }

                let connection =
                    self.traverse(current, edge, arrival, &departures, &mut fallback_seq);

                let improves = best
                    .get(&edge.to)
                    .is_none_or(|&known| connection.arrival < known);
                if !improves {
                    continue;
                }
                let Some(next) = self.network.stop(&edge.to) else {
                    continue;
                };

                if connection.is_fallback() {
                    stats.fallback_hops += 1;
                }

                let priority = connection.arrival + self.heuristic(next, goal);
                best.insert(edge.to, connection.arrival);
                came_from.insert(edge.to, connection);
                open.push_or_decrease(edge.to, priority);
            }
        }

        stats.lookups = lookup.stats();
        debug!(
            from = %start,
            to = %end,
            expansions = stats.expansions,
            "Open set exhausted without reaching destination"
        );
        (SearchOutcome::NotFound(NotFound::NoPath), stats)
    }

    /// Resolve an edge traversal from `from`, reached at `arrival`.
    fn traverse(
        &self,
        from: StopId,
        edge: &Edge,
        arrival: DateTime<Utc>,
        departures: &[Departure],
        fallback_seq: &mut u64,
    ) -> Connection {
        let earliest_boarding = arrival - self.config.boarding_tolerance();
        let pattern = &edge.pattern;

        // Departures are sorted, so the first match is the earliest.
        let matched = departures.iter().find_map(|d| {
            let at = d.event_time()?;
            let usable = d.route == *pattern.route_number()
                && d.heads_towards(&pattern.direction_label)
                && at >= earliest_boarding;
            usable.then_some((d, at))
        });

        let (departure, trip) = match matched {
            Some((d, at)) => (
                at,
                TripId::Live {
                    route: d.route.clone(),
                    vehicle: d.vehicle.clone(),
                    departure: at,
                },
            ),
            None => {
                *fallback_seq += 1;
                (
                    arrival + self.config.fallback_wait(),
                    TripId::Fallback(*fallback_seq),
                )
            }
        };

        Connection {
            from,
            edge: edge.clone(),
            departure,
            arrival: departure + edge.travel_time,
            trip,
        }
    }

    fn heuristic(&self, stop: &Stop, goal: &Stop) -> chrono::Duration {
        self.network
            .policy()
            .heuristic(distance_km(&stop.coordinates, &goal.coordinates))
    }

    /// Follow back-pointers from `end` to `start`.
    ///
    /// Each pointer is consumed once, so a broken chain ends the walk instead
    /// of looping.
    fn unwind(
        &self,
        start: StopId,
        end: StopId,
        mut came_from: HashMap<StopId, Connection>,
    ) -> Option<Vec<PathStep>> {
        let mut steps = Vec::new();
        let mut node = end;

        while let Some(connection) = came_from.remove(&node) {
            let stop = self.network.stop(&node)?.clone();
            node = connection.from;
            steps.push(PathStep {
                stop,
                connection: Some(connection),
            });
        }

        if node != start {
            warn!(from = %start, to = %end, stuck_at = %node, "Back-pointer chain is broken");
            return None;
        }

        steps.push(PathStep {
            stop: self.network.stop(&start)?.clone(),
            connection: None,
        });
        steps.reverse();
        Some(steps)
    }
}
