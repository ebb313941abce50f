//! SWU (Stadtwerke Ulm/Neu-Ulm) mobility API client.
//!
//! This module provides an HTTP client for the SWU passage endpoints, which
//! list upcoming vehicle departures and arrivals at a stop.
//!
//! Key characteristics of the API:
//! - Departures and arrivals are separate endpoints with overlapping data
//! - Timestamps are RFC 3339 with a local offset
//! - Deviations are whole seconds, positive when a vehicle runs late

mod client;
mod convert;
mod error;
mod types;

pub use client::{DEFAULT_BASE_URL, SwuClient, SwuConfig};
pub use convert::{MAX_DEVIATION_SECS, convert_arrival, convert_departure, parse_timestamp};
pub use error::SwuError;
pub use types::{ArrivalData, ArrivalsResponse, DepartureData, DeparturesResponse, Passage};
