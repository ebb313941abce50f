//! Trip identities.

use std::fmt;

use chrono::{DateTime, Utc};

use super::RouteNumber;

/// Identifies the concrete vehicle run used to traverse an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TripId {
    /// Matched against a live or scheduled departure.
    Live {
        route: RouteNumber,
        vehicle: Option<String>,
        departure: DateTime<Utc>,
    },
    /// Synthetic wait-and-ride estimate. The number is unique within a search.
    Fallback(u64),
}

impl TripId {
    pub fn is_fallback(&self) -> bool {
        matches!(self, TripId::Fallback(_))
    }

    /// Whether two hops were made on the same physical run.
    ///
    /// Live hops on the same route share a run when they name the same
    /// vehicle. Without vehicle numbers only identical ids match. Fallback ids
    /// carry no run information and never match anything.
    pub fn same_run(&self, other: &TripId) -> bool {
        match (self, other) {
            (
                TripId::Live {
                    route: r1,
                    vehicle: Some(v1),
                    ..
                },
                TripId::Live {
                    route: r2,
                    vehicle: Some(v2),
                    ..
                },
            ) => r1 == r2 && v1 == v2,
            (TripId::Live { .. }, TripId::Live { .. }) => self == other,
            _ => false,
        }
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripId::Live {
                route,
                vehicle,
                departure,
            } => {
                let vehicle = vehicle.as_deref().unwrap_or("?");
                write!(f, "{route}/{vehicle}@{}", departure.format("%H:%M:%S"))
            }
            TripId::Fallback(n) => write!(f, "fallback#{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn live(route: &str, vehicle: Option<&str>, min: u32) -> TripId {
        TripId::Live {
            route: RouteNumber::new(route).unwrap(),
            vehicle: vehicle.map(str::to_string),
            departure: Utc.with_ymd_and_hms(2024, 3, 15, 10, min, 0).unwrap(),
        }
    }

    #[test]
    fn same_vehicle_is_same_run_across_stops() {
        assert!(live("5", Some("101"), 0).same_run(&live("5", Some("101"), 3)));
    }

    #[test]
    fn different_vehicle_is_different_run() {
        assert!(!live("5", Some("101"), 0).same_run(&live("5", Some("102"), 3)));
    }

    #[test]
    fn missing_vehicle_requires_identical_id() {
        assert!(live("5", None, 0).same_run(&live("5", None, 0)));
        assert!(!live("5", None, 0).same_run(&live("5", None, 3)));
        assert!(!live("5", Some("101"), 0).same_run(&live("5", None, 0)));
    }

    #[test]
    fn fallback_never_matches() {
        assert!(!TripId::Fallback(1).same_run(&TripId::Fallback(1)));
        assert!(!TripId::Fallback(1).same_run(&live("5", Some("101"), 0)));
        assert!(TripId::Fallback(1).is_fallback());
        assert!(!live("5", None, 0).is_fallback());
    }

    #[test]
    fn display() {
        assert_eq!(live("5", Some("101"), 2).to_string(), "5/101@10:02:00");
        assert_eq!(TripId::Fallback(7).to_string(), "fallback#7");
    }
}
