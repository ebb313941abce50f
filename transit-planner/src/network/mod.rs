//! The stop network.
//!
//! Route patterns are compiled into a stop registry and a bidirectional
//! adjacency list. Edge costs come from a replaceable travel-time policy.

mod catalog;
mod feed;
mod graph;
mod travel_time;

pub use catalog::{DEFAULT_LIMIT, MIN_QUERY_LEN, StopCatalog};
pub use feed::{FeedError, load_patterns, parse_patterns};
pub use graph::{Edge, Network};
pub use travel_time::TravelTimePolicy;
