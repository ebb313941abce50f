//! Transit journey planner server.
//!
//! Answers "how do I get from this stop to that one, leaving now?" over the
//! SWU Ulm bus and tram network, using live departures where the upstream
//! feed has them and estimated waits where it does not.

pub mod cache;
pub mod departures;
pub mod domain;
pub mod geo;
pub mod network;
pub mod planner;
pub mod swu;
pub mod web;
