//! Domain types for the transit journey planner.
//!
//! This module contains the core domain model: stops, route patterns,
//! departure events, trip identities and itineraries. Types enforce their
//! invariants at construction time where they have any.

mod departure;
mod error;
mod itinerary;
mod route;
mod stop;
mod trip;

pub use departure::{Departure, DepartureKey};
pub use error::DomainError;
pub use itinerary::{Itinerary, Segment};
pub use route::{PatternId, RouteNumber, RoutePattern, VehicleCategory};
pub use stop::{Coordinates, InvalidStopId, Stop, StopId};
pub use trip::TripId;
