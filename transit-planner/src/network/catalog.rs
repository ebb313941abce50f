//! Stop lookup by name.

use crate::domain::Stop;

use super::graph::Network;

/// Queries shorter than this return nothing.
pub const MIN_QUERY_LEN: usize = 3;

/// Default number of search results.
pub const DEFAULT_LIMIT: usize = 12;

/// Name index over the stops of a network.
#[derive(Debug, Clone, Default)]
pub struct StopCatalog {
    /// Stops with their lowercased names, sorted by name.
    entries: Vec<(String, Stop)>,
}

impl StopCatalog {
    pub fn from_network(network: &Network) -> Self {
        Self::from_stops(network.stops().cloned())
    }

    pub fn from_stops(stops: impl IntoIterator<Item = Stop>) -> Self {
        let mut entries: Vec<(String, Stop)> = stops
            .into_iter()
            .map(|s| (s.name.to_lowercase(), s))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.id.cmp(&b.1.id)));
        Self { entries }
    }

    /// Case-insensitive substring search on stop names.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Stop> {
        let q = query.trim().to_lowercase();
        if q.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|(name, _)| name.contains(&q))
            .map(|(_, stop)| stop)
            .take(limit)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
