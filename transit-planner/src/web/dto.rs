//! Data transfer objects for web requests and responses.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Itinerary, Segment, Stop, StopId, TripId, VehicleCategory};
use crate::planner::{NotFound, PlanOutcome};

/// Request to search stops by name.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    /// Substring of the stop name (case-insensitive)
    pub q: String,

    /// Maximum results to return
    pub limit: Option<usize>,
}

/// A stop in responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopResult {
    pub id: StopId,
    pub name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Response for stop search.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    pub stops: Vec<StopResult>,
}

/// Request to plan a journey.
#[derive(Debug, Deserialize)]
pub struct PlanJourneyRequest {
    pub start_stop: StopId,

    pub end_stop: StopId,

    /// RFC 3339 departure time (defaults to now)
    #[serde(default)]
    pub start_time: Option<String>,
}

/// Response for journey planning.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanJourneyResponse {
    Found { itinerary: ItineraryResult },
    NotFound { reason: String },
}

/// A complete itinerary.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    pub origin: StopResult,
    pub destination: StopResult,
    pub departure: String,
    pub arrival: String,
    pub total_duration_secs: i64,
    pub total_travel_secs: i64,
    pub total_wait_secs: i64,
    pub total_distance_km: f64,
    pub transfers: usize,
    pub segments: Vec<SegmentResult>,
}

/// One ride within an itinerary.
#[derive(Debug, Serialize)]
pub struct SegmentResult {
    /// Route number, e.g. "2"
    pub route: String,

    /// Pattern display name, e.g. "Linie 2"
    pub line_name: String,

    pub category: VehicleCategory,

    /// Direction label of the pattern
    pub direction: String,

    /// Vehicle number when boarded on a live departure
    pub vehicle: Option<String>,

    /// True when timing is a wait-and-ride estimate
    pub estimated: bool,

    pub departure: String,
    pub arrival: String,
    pub travel_secs: i64,
    pub wait_secs: i64,
    pub distance_km: f64,

    /// Stops passed after boarding
    pub hops: usize,

    /// Stops ridden, boarding stop first
    pub stops: Vec<StopResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Conversion implementations

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl StopResult {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            id: stop.id,
            name: stop.name.clone(),
            lat: stop.coordinates.lat,
            lng: stop.coordinates.lng,
        }
    }
}

impl ItineraryResult {
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        Self {
            origin: StopResult::from_stop(itinerary.origin()),
            destination: StopResult::from_stop(itinerary.destination()),
            departure: timestamp(itinerary.departure_time()),
            arrival: timestamp(itinerary.arrival_time()),
            total_duration_secs: itinerary.total_duration().num_seconds(),
            total_travel_secs: itinerary.total_travel_time().num_seconds(),
            total_wait_secs: itinerary.total_wait_time().num_seconds(),
            total_distance_km: itinerary.total_distance_km(),
            transfers: itinerary.transfers(),
            segments: itinerary
                .segments()
                .iter()
                .map(SegmentResult::from_segment)
                .collect(),
        }
    }
}

impl SegmentResult {
    pub fn from_segment(segment: &Segment) -> Self {
        let vehicle = match &segment.trip {
            TripId::Live { vehicle, .. } => vehicle.clone(),
            TripId::Fallback(_) => None,
        };

        Self {
            route: segment.pattern.route_number().to_string(),
            line_name: segment.pattern.name.clone(),
            category: segment.pattern.category,
            direction: segment.pattern.direction_label.clone(),
            vehicle,
            estimated: segment.trip.is_fallback(),
            departure: timestamp(segment.departure),
            arrival: timestamp(segment.arrival),
            travel_secs: segment.travel_time.num_seconds(),
            wait_secs: segment.wait_time.num_seconds(),
            distance_km: segment.distance_km,
            hops: segment.hop_count(),
            stops: segment.stops.iter().map(StopResult::from_stop).collect(),
        }
    }
}

impl PlanJourneyResponse {
    pub fn from_outcome(outcome: &PlanOutcome) -> Self {
        match outcome {
            PlanOutcome::Found(itinerary) => PlanJourneyResponse::Found {
                itinerary: ItineraryResult::from_itinerary(itinerary),
            },
            PlanOutcome::NotFound(reason) => PlanJourneyResponse::not_found(reason),
        }
    }

    pub fn not_found(reason: &NotFound) -> Self {
        PlanJourneyResponse::NotFound {
            reason: reason.to_string(),
        }
    }
}
