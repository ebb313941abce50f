//! Travel-time estimation policy.
//!
//! Vehicle running times are not known ahead of live data, so edges carry an
//! estimate derived from distance. The policy is a plain value so callers can
//! swap in a different speed or floor without touching the graph or search.

use chrono::Duration;

/// Speed used when a policy's own speed cannot produce a usable time.
const DEFAULT_SPEED_KMH: f64 = 20.0;

/// Converts distances into travel-time estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimePolicy {
    /// Assumed average running speed, stops included.
    pub speed_kmh: f64,

    /// Lower bound for a single edge.
    pub min_edge: Duration,
}

impl TravelTimePolicy {
    pub fn new(speed_kmh: f64, min_edge: Duration) -> Self {
        Self {
            speed_kmh,
            min_edge,
        }
    }

    /// Estimated time to ride one edge of the given length.
    ///
    /// Rounded to whole seconds and never below `min_edge`.
    pub fn edge_time(&self, distance_km: f64) -> Duration {
        self.riding_time(distance_km, f64::round)
            .map_or(self.min_edge, |t| t.max(self.min_edge))
    }

    /// Lower-bound time to cover a straight-line distance.
    ///
    /// Uses the same speed as [`edge_time`](Self::edge_time) but without the
    /// floor, truncated to whole seconds, so it never overestimates. An
    /// infinite distance saturates to zero.
    pub fn heuristic(&self, distance_km: f64) -> Duration {
        self.riding_time(distance_km, f64::floor)
            .unwrap_or_else(Duration::zero)
    }

    /// Riding time at the policy speed, or at the default speed when the
    /// policy speed is zero, negative or too small to give a representable
    /// duration. `None` only for unusable distances.
    fn riding_time(&self, distance_km: f64, whole: fn(f64) -> f64) -> Option<Duration> {
        let at = |speed_kmh: f64| {
            let secs = whole(distance_km / speed_kmh * 3600.0);
            if !secs.is_finite() || secs < 0.0 || speed_kmh <= 0.0 {
                return None;
            }
            Duration::try_seconds(secs as i64)
        };
        at(self.speed_kmh).or_else(|| at(DEFAULT_SPEED_KMH))
    }
}

impl Default for TravelTimePolicy {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            min_edge: Duration::minutes(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let policy = TravelTimePolicy::default();
        assert_eq!(policy.speed_kmh, 20.0);
        assert_eq!(policy.min_edge, Duration::minutes(2));
    }

    #[test]
    fn edge_time_scales_with_distance() {
        let policy = TravelTimePolicy::default();
        // 2 km at 20 km/h = 6 minutes
        assert_eq!(policy.edge_time(2.0), Duration::minutes(6));
        // 5 km = 15 minutes
        assert_eq!(policy.edge_time(5.0), Duration::minutes(15));
    }

    #[test]
    fn edge_time_is_floored() {
        let policy = TravelTimePolicy::default();
        assert_eq!(policy.edge_time(0.1), Duration::minutes(2));
        assert_eq!(policy.edge_time(0.0), Duration::minutes(2));
    }

    #[test]
    fn heuristic_has_no_floor() {
        let policy = TravelTimePolicy::default();
        assert_eq!(policy.heuristic(0.0), Duration::zero());
        assert_eq!(policy.heuristic(0.1), Duration::seconds(18));
        assert_eq!(policy.heuristic(2.0), Duration::minutes(6));
    }

    #[test]
    fn heuristic_never_exceeds_edge_time() {
        let policy = TravelTimePolicy::default();
        for d in [0.0, 0.05, 0.33, 0.67, 1.0, 1.2345, 3.3, 12.0] {
            assert!(policy.heuristic(d) <= policy.edge_time(d), "distance {d}");
        }
    }

    #[test]
    fn infinite_distance() {
        let policy = TravelTimePolicy::default();
        assert_eq!(policy.heuristic(f64::INFINITY), Duration::zero());
        assert_eq!(policy.edge_time(f64::INFINITY), Duration::minutes(2));
    }

    #[test]
    fn degenerate_speed_uses_default_speed() {
        for speed in [0.0, -5.0, 1e-300, f64::NAN] {
            let policy = TravelTimePolicy::new(speed, Duration::minutes(1));
            assert_eq!(policy.edge_time(2.0), Duration::minutes(6), "speed {speed}");
            assert_eq!(policy.heuristic(2.0), Duration::minutes(6), "speed {speed}");
        }
    }

    #[test]
    fn custom_policy() {
        let policy = TravelTimePolicy::new(30.0, Duration::minutes(1));
        assert_eq!(policy.edge_time(1.0), Duration::minutes(2));
        assert_eq!(policy.edge_time(0.2), Duration::minutes(1));
    }
}
