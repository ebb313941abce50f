//! Departure data for the planner.
//!
//! The search asks for a stop's departures through a [`DepartureLookup`],
//! which wraps any [`DepartureSource`] with per-search merging, de-duplication
//! and memoization.

mod lookup;
mod source;
mod static_source;

pub use lookup::{DepartureLookup, LookupStats};
pub use source::{DepartureSource, SourceError};
pub use static_source::StaticDepartureSource;
