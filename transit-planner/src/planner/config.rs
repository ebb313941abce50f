//! Search configuration for the journey planner.

use chrono::Duration;

use crate::network::TravelTimePolicy;

/// Configuration parameters for journey search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Departure and arrival events requested per feed per stop.
    pub departure_limit: usize,

    /// How far before the rider's arrival a departure may still be boarded
    /// (seconds). Absorbs clock skew between feed and estimate.
    pub boarding_tolerance_secs: i64,

    /// Wait assumed when no live departure matches an edge (minutes).
    pub fallback_wait_mins: i64,

    /// Maximum number of stops expanded before giving up.
    pub max_expansions: usize,

    /// Wall-clock budget for one planning request (seconds).
    /// Enforced by the web layer.
    pub deadline_secs: u64,

    /// Fail instead of planning on estimates alone when every departure
    /// fetch fails.
    pub require_live_data: bool,

    /// Speed model for edge costs and the heuristic.
    pub travel_time: TravelTimePolicy,
}

impl SearchConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_departure_limit(mut self, limit: usize) -> Self {
        self.departure_limit = limit;
        self
    }

    pub fn with_boarding_tolerance_secs(mut self, secs: i64) -> Self {
        self.boarding_tolerance_secs = secs;
        self
    }

    pub fn with_fallback_wait_mins(mut self, mins: i64) -> Self {
        self.fallback_wait_mins = mins;
        self
    }

    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = max;
        self
    }

    pub fn with_deadline_secs(mut self, secs: u64) -> Self {
        self.deadline_secs = secs;
        self
    }

    pub fn with_require_live_data(mut self, require: bool) -> Self {
        self.require_live_data = require;
        self
    }

    pub fn with_travel_time(mut self, policy: TravelTimePolicy) -> Self {
        self.travel_time = policy;
        self
    }

    /// Returns the boarding tolerance as a Duration.
    pub fn boarding_tolerance(&self) -> Duration {
        Duration::seconds(self.boarding_tolerance_secs)
    }

    /// Returns the fallback wait as a Duration.
    pub fn fallback_wait(&self) -> Duration {
        Duration::minutes(self.fallback_wait_mins)
    }

    /// Returns the request deadline as a std Duration, for `tokio::time`.
    pub fn deadline(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.deadline_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            departure_limit: 10,
            boarding_tolerance_secs: 90,
            fallback_wait_mins: 3,
            max_expansions: 20_000,
            deadline_secs: 10,
            require_live_data: false,
            travel_time: TravelTimePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.departure_limit, 10);
        assert_eq!(config.boarding_tolerance_secs, 90);
        assert_eq!(config.fallback_wait_mins, 3);
        assert_eq!(config.max_expansions, 20_000);
        assert_eq!(config.deadline_secs, 10);
        assert!(!config.require_live_data);
        assert_eq!(config.travel_time.speed_kmh, 20.0);
    }

    #[test]
    fn duration_methods() {
        let config = SearchConfig::default();

        assert_eq!(config.boarding_tolerance(), Duration::seconds(90));
        assert_eq!(config.fallback_wait(), Duration::minutes(3));
        assert_eq!(config.deadline(), std::time::Duration::from_secs(10));
    }

    #[test]
    fn custom_config() {
        let config = SearchConfig::new()
            .with_departure_limit(5)
            .with_boarding_tolerance_secs(30)
            .with_fallback_wait_mins(5)
            .with_max_expansions(100)
            .with_deadline_secs(2)
            .with_require_live_data(true)
            .with_travel_time(TravelTimePolicy::new(30.0, Duration::minutes(1)));

        assert_eq!(config.departure_limit, 5);
        assert_eq!(config.boarding_tolerance_secs, 30);
        assert_eq!(config.fallback_wait_mins, 5);
        assert_eq!(config.max_expansions, 100);
        assert_eq!(config.deadline_secs, 2);
        assert!(config.require_live_data);
        assert_eq!(config.travel_time.min_edge, Duration::minutes(1));
    }
}
