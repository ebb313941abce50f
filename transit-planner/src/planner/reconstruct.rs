//! Grouping a found path into rider-facing segments.
//!
//! Consecutive hops stay in one segment while they ride the same pattern on
//! the same run. A fallback hop carries no run information, so it never forces
//! a change on its own; a live hop does when it names a different run from
//! the last live hop of the segment.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::domain::{DomainError, Itinerary, Segment, TripId};

use super::search::{Connection, PathStep};

/// Build an itinerary from a start-to-destination path.
pub fn build_itinerary(
    path: &[PathStep],
    start_time: DateTime<Utc>,
) -> Result<Itinerary, DomainError> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut current: Option<OpenSegment> = None;
    let mut previous_arrival = start_time;

    for pair in path.windows(2) {
        let (prev, step) = (&pair[0], &pair[1]);
        let Some(connection) = &step.connection else {
            warn!(stop = %step.stop.id, "Path step without connection");
            continue;
        };

        match current.take() {
            Some(mut open) if open.continues_with(connection) => {
                open.extend(step, connection);
                current = Some(open);
            }
            finished => {
                if let Some(done) = finished {
                    segments.push(done.segment);
                }
                let wait = (connection.departure - previous_arrival).max(Duration::zero());
                current = Some(OpenSegment::board(prev, step, connection, wait));
            }
        }

        previous_arrival = connection.arrival;
    }

    if let Some(done) = current {
        segments.push(done.segment);
    }

    Itinerary::new(segments)
}

/// Segment under construction plus the last live run seen on it.
struct OpenSegment {
    segment: Segment,
    live_run: Option<TripId>,
}

impl OpenSegment {
    fn board(prev: &PathStep, step: &PathStep, connection: &Connection, wait: Duration) -> Self {
        let live_run = (!connection.is_fallback()).then(|| connection.trip.clone());
        Self {
            segment: Segment {
                pattern: connection.edge.pattern.clone(),
                trip: connection.trip.clone(),
                stops: vec![prev.stop.clone(), step.stop.clone()],
                departure: connection.departure,
                arrival: connection.arrival,
                travel_time: connection.arrival - connection.departure,
                wait_time: wait,
                distance_km: connection.edge.distance_km,
            },
            live_run,
        }
    }

    fn continues_with(&self, connection: &Connection) -> bool {
        if self.segment.pattern.id != connection.edge.pattern.id {
            return false;
        }
        if connection.is_fallback() {
            return true;
        }
        self.live_run
            .as_ref()
            .is_some_and(|run| run.same_run(&connection.trip))
    }

    fn extend(&mut self, step: &PathStep, connection: &Connection) {
        let segment = &mut self.segment;
        segment.stops.push(step.stop.clone());
        segment.travel_time += connection.arrival - segment.arrival;
        segment.arrival = connection.arrival;
        segment.distance_km += connection.edge.distance_km;
        if !connection.is_fallback() {
            self.live_run = Some(connection.trip.clone());
        }
    }
}
