//! Stop graph built from route patterns.
//!
//! Every adjacent stop pair on a pattern becomes two directed edges, one in
//! each direction. The graph is therefore undirected in effect: a route's
//! direction label describes the pattern, it does not restrict traversal.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use crate::domain::{RoutePattern, Stop, StopId};
use crate::geo::distance_km;

use super::travel_time::TravelTimePolicy;

/// A directed connection to an adjacent stop on a pattern.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Destination stop.
    pub to: StopId,
    /// Pattern this connection belongs to.
    pub pattern: Arc<RoutePattern>,
    /// Great-circle distance between the two stops.
    pub distance_km: f64,
    /// Estimated riding time from the travel-time policy.
    pub travel_time: Duration,
}

/// Stop registry plus adjacency list.
#[derive(Debug, Clone)]
pub struct Network {
    stops: HashMap<StopId, Stop>,
    adjacency: HashMap<StopId, Vec<Edge>>,
    pattern_count: usize,
    policy: TravelTimePolicy,
}

impl Network {
    /// Build the graph from compiled patterns.
    ///
    /// The first occurrence of a stop id wins. Stops without valid
    /// coordinates never enter the registry, and pairs whose distance cannot
    /// be computed produce no edge.
    pub fn build(patterns: &[RoutePattern], policy: TravelTimePolicy) -> Self {
        let mut stops: HashMap<StopId, Stop> = HashMap::new();

        for pattern in patterns {
            for stop in &pattern.stops {
                if !stop.coordinates.is_valid() {
                    continue;
                }
                stops.entry(stop.id).or_insert_with(|| stop.clone());
            }
        }

        let mut adjacency: HashMap<StopId, Vec<Edge>> = HashMap::new();
        let mut pattern_count = 0;

        for pattern in patterns {
            let shared = Arc::new(pattern.clone());
            let mut contributed = false;

            for pair in pattern.stops.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);

                if !stops.contains_key(&a.id) || !stops.contains_key(&b.id) {
                    continue;
                }

                let distance = distance_km(&a.coordinates, &b.coordinates);
                if distance.is_infinite() {
                    warn!(
                        from = %a.id,
                        to = %b.id,
                        pattern = %pattern.id,
                        "Skipping edge with unresolvable distance"
                    );
                    continue;
                }

                let travel_time = policy.edge_time(distance);

                adjacency.entry(a.id).or_default().push(Edge {
                    to: b.id,
                    pattern: shared.clone(),
                    distance_km: distance,
                    travel_time,
                });
                adjacency.entry(b.id).or_default().push(Edge {
                    to: a.id,
                    pattern: shared.clone(),
                    distance_km: distance,
                    travel_time,
                });
                contributed = true;
            }

            if contributed {
                pattern_count += 1;
            }
        }

        let network = Self {
            stops,
            adjacency,
            pattern_count,
            policy,
        };

        debug!(
            patterns = patterns.len(),
            used_patterns = network.pattern_count,
            stops = network.stop_count(),
            edges = network.edge_count(),
            "Built stop network"
        );

        network
    }

    pub fn stop(&self, id: &StopId) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn contains(&self, id: &StopId) -> bool {
        self.stops.contains_key(id)
    }

    /// Outgoing edges of a stop. Empty for unknown or isolated stops.
    pub fn edges_from(&self, id: &StopId) -> &[Edge] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Number of patterns that contributed at least one edge.
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    pub fn policy(&self) -> &TravelTimePolicy {
        &self.policy
    }
}
