//! Per-search departure lookup.
//!
//! A `DepartureLookup` lives for exactly one planning call. It fetches the
//! departures and arrivals feeds for a stop concurrently, merges them into one
//! de-duplicated, time-ordered list, and memoizes the result so a stop is
//! never fetched twice within the call. A fresh call gets a fresh lookup, so
//! stale departures never leak between searches.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{Departure, DepartureKey, StopId};

use super::source::DepartureSource;

/// Counters describing the fetches made by one lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    /// Stops fetched from the source.
    pub fetched: usize,
    /// Stops where exactly one of the two feeds failed.
    pub partial: usize,
    /// Stops where both feeds failed.
    pub failed: usize,
}

impl LookupStats {
    /// True when at least one stop was fetched and every fetch failed.
    pub fn all_failed(&self) -> bool {
        self.fetched > 0 && self.failed == self.fetched
    }
}

/// Memoizing departure accessor for one search.
pub struct DepartureLookup<'a, S> {
    source: &'a S,
    limit: usize,
    memo: HashMap<StopId, Arc<[Departure]>>,
    stats: LookupStats,
}

impl<'a, S: DepartureSource> DepartureLookup<'a, S> {
    /// Create a lookup requesting at most `limit` events per feed.
    pub fn new(source: &'a S, limit: usize) -> Self {
        Self {
            source,
            limit,
            memo: HashMap::new(),
            stats: LookupStats::default(),
        }
    }

    /// Departures at `stop`, earliest first.
    ///
    /// Never fails: a feed error degrades to whatever the other feed returned,
    /// or to an empty list if both failed.
    pub async fn departures(&mut self, stop: StopId) -> Arc<[Departure]> {
        if let Some(cached) = self.memo.get(&stop) {
            return cached.clone();
        }

        let (departing, arriving) = futures::join!(
            self.source.departures_from(stop, self.limit),
            self.source.arrivals_at(stop, self.limit)
        );

        self.stats.fetched += 1;

        let records = match (departing, arriving) {
            (Ok(mut deps), Ok(arrs)) => {
                deps.extend(arrs);
                deps
            }
            (Ok(deps), Err(e)) => {
                self.stats.partial += 1;
                warn!(stop = %stop, error = %e, "Arrivals feed failed, using departures only");
                deps
            }
            (Err(e), Ok(arrs)) => {
                self.stats.partial += 1;
                warn!(stop = %stop, error = %e, "Departures feed failed, using arrivals only");
                arrs
            }
            (Err(dep_err), Err(arr_err)) => {
                self.stats.failed += 1;
                warn!(
                    stop = %stop,
                    departures_error = %dep_err,
                    arrivals_error = %arr_err,
                    "Both departure feeds failed, using fallback timing"
                );
                Vec::new()
            }
        };

        let merged: Arc<[Departure]> = merge(records).into();

        debug!(stop = %stop, departures = merged.len(), "Fetched departures");

        self.memo.insert(stop, merged.clone());
        merged
    }

    /// Whether `stop` has already been fetched in this search.
    pub fn is_cached(&self, stop: &StopId) -> bool {
        self.memo.contains_key(stop)
    }

    pub fn stats(&self) -> LookupStats {
        self.stats
    }
}

/// De-duplicate by identity key and sort by effective time.
///
/// Records without any usable time are dropped. The first record for a key
/// wins, so departures-feed data is preferred over arrivals-feed data.
fn merge(records: Vec<Departure>) -> Vec<Departure> {
    let mut seen: HashSet<DepartureKey> = HashSet::with_capacity(records.len());
    let mut merged: Vec<Departure> = records
        .into_iter()
        .filter(|d| d.key().is_some_and(|key| seen.insert(key)))
        .collect();

    merged.sort_by_key(|d| d.event_time());
    merged
}
