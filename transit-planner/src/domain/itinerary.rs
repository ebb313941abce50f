//! Itinerary types.
//!
//! An `Itinerary` is the rider-facing result of a search: one or more
//! segments, each a continuous ride on a single trip.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::{DomainError, RoutePattern, Stop, TripId};

/// One continuous ride on one trip.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Pattern the ride belongs to.
    pub pattern: Arc<RoutePattern>,
    /// Trip of the boarding hop.
    pub trip: TripId,
    /// Stops ridden, boarding stop first, in traversal order.
    pub stops: Vec<Stop>,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    /// In-vehicle time, boarding to alighting.
    pub travel_time: Duration,
    /// Wait at the boarding stop before departure. Never negative.
    pub wait_time: Duration,
    pub distance_km: f64,
}

impl Segment {
    pub fn start_stop(&self) -> &Stop {
        // Segments are only built with at least the boarding stop.
        &self.stops[0]
    }

    pub fn end_stop(&self) -> &Stop {
        &self.stops[self.stops.len() - 1]
    }

    /// Number of hops (stops ridden minus one).
    pub fn hop_count(&self) -> usize {
        self.stops.len().saturating_sub(1)
    }
}

/// A complete trip from origin to destination.
///
/// # Invariants
///
/// - At least one segment
/// - Every segment has at least two stops
/// - Consecutive segments connect (end of one = start of next)
#[derive(Debug, Clone)]
pub struct Itinerary {
    segments: Vec<Segment>,
    total_duration: Duration,
    total_travel_time: Duration,
    total_distance_km: f64,
}

impl Itinerary {
    /// Builds an itinerary and computes its totals.
    pub fn new(segments: Vec<Segment>) -> Result<Self, DomainError> {
        if segments.is_empty() {
            return Err(DomainError::EmptyItinerary);
        }

        if segments.iter().any(|s| s.stops.len() < 2) {
            return Err(DomainError::InvalidSegment("segment must ride at least one hop"));
        }

        for window in segments.windows(2) {
            let prev_end = window[0].end_stop().id;
            let next_start = window[1].start_stop().id;
            if prev_end != next_start {
                return Err(DomainError::SegmentsNotConnected(prev_end, next_start));
            }
        }

        let total_travel_time = segments.iter().map(|s| s.travel_time).sum();
        // Wall clock from the first wait to the last arrival. Boarding within
        // the tolerance before the previous arrival makes summed parts overlap.
        let first = &segments[0];
        let last = &segments[segments.len() - 1];
        let total_duration = first.wait_time + (last.arrival - first.departure);
        let total_distance_km = segments.iter().map(|s| s.distance_km).sum();

        Ok(Self {
            segments,
            total_duration,
            total_travel_time,
            total_distance_km,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Elapsed time from the planned start to the final arrival.
    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn total_travel_time(&self) -> Duration {
        self.total_travel_time
    }

    pub fn total_wait_time(&self) -> Duration {
        self.segments.iter().map(|s| s.wait_time).sum()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    pub fn transfers(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    pub fn origin(&self) -> &Stop {
        self.segments[0].start_stop()
    }

    pub fn destination(&self) -> &Stop {
        self.segments[self.segments.len() - 1].end_stop()
    }

    pub fn departure_time(&self) -> DateTime<Utc> {
        self.segments[0].departure
    }

    pub fn arrival_time(&self) -> DateTime<Utc> {
        self.segments[self.segments.len() - 1].arrival
    }

    pub fn is_direct(&self) -> bool {
        self.segments.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, PatternId, RouteNumber, StopId, VehicleCategory};
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap()
    }

    fn stop(id: u32) -> Stop {
        Stop::new(StopId(id), format!("Stop {id}"), Coordinates::new(48.4, 9.98))
    }

    fn pattern(route: &str) -> Arc<RoutePattern> {
        Arc::new(RoutePattern {
            id: PatternId {
                route: RouteNumber::new(route).unwrap(),
                direction: 1,
            },
            name: format!("Linie {route}"),
            category: VehicleCategory::Tram,
            direction_label: "North".into(),
            stops: vec![],
        })
    }

    fn segment(route: &str, stops: &[u32], dep: DateTime<Utc>, mins: i64, wait: i64) -> Segment {
        Segment {
            pattern: pattern(route),
            trip: TripId::Fallback(0),
            stops: stops.iter().map(|&i| stop(i)).collect(),
            departure: dep,
            arrival: dep + Duration::minutes(mins),
            travel_time: Duration::minutes(mins),
            wait_time: Duration::minutes(wait),
            distance_km: 1.5,
        }
    }

    #[test]
    fn totals_sum_segments() {
        let itinerary = Itinerary::new(vec![
            segment("2", &[1, 2, 3], at(10, 2), 6, 2),
            segment("5", &[3, 4], at(10, 12), 4, 4),
        ])
        .unwrap();

        assert_eq!(itinerary.total_travel_time(), Duration::minutes(10));
        assert_eq!(itinerary.total_duration(), Duration::minutes(16));
        assert_eq!(itinerary.total_wait_time(), Duration::minutes(6));
        assert!((itinerary.total_distance_km() - 3.0).abs() < 1e-9);
        assert_eq!(itinerary.transfers(), 1);
        assert_eq!(itinerary.origin().id, StopId(1));
        assert_eq!(itinerary.destination().id, StopId(4));
        assert_eq!(itinerary.departure_time(), at(10, 2));
        assert_eq!(itinerary.arrival_time(), at(10, 16));
        assert!(!itinerary.is_direct());
    }

    #[test]
    fn overlapping_boarding_is_not_double_counted() {
        // Second ride leaves a minute before the first one arrives.
        let itinerary = Itinerary::new(vec![
            segment("2", &[1, 2], at(10, 2), 6, 2),
            segment("5", &[2, 3], at(10, 7), 4, 0),
        ])
        .unwrap();

        assert_eq!(itinerary.arrival_time(), at(10, 11));
        assert_eq!(itinerary.total_duration(), Duration::minutes(11));
        assert_eq!(itinerary.total_travel_time(), Duration::minutes(10));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            Itinerary::new(vec![]),
            Err(DomainError::EmptyItinerary)
        ));
    }

    #[test]
    fn rejects_disconnected_segments() {
        let result = Itinerary::new(vec![
            segment("2", &[1, 2], at(10, 0), 2, 0),
            segment("5", &[3, 4], at(10, 5), 2, 0),
        ]);
        assert!(matches!(
            result,
            Err(DomainError::SegmentsNotConnected(StopId(2), StopId(3)))
        ));
    }

    #[test]
    fn rejects_single_stop_segment() {
        let result = Itinerary::new(vec![segment("2", &[1], at(10, 0), 0, 0)]);
        assert!(matches!(result, Err(DomainError::InvalidSegment(_))));
    }
}
