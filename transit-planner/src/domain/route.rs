//! Route and route pattern types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Stop;

/// A public line number such as `"2"`, `"N1"` or `"E"`.
///
/// Stored trimmed; comparison is exact on the trimmed form because upstream
/// feeds pad numbers inconsistently.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteNumber(String);

impl RouteNumber {
    /// Returns `None` for an empty or all-whitespace number.
    pub fn new(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteNumber({})", self.0)
    }
}

impl fmt::Display for RouteNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vehicle category of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleCategory {
    Tram,
    Bus,
}

impl VehicleCategory {
    /// Map the operator's numeric route category (1 = tram, anything else bus).
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            VehicleCategory::Tram
        } else {
            VehicleCategory::Bus
        }
    }
}

/// Identity of a route pattern: route number plus direction code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternId {
    pub route: RouteNumber,
    pub direction: i32,
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.route, self.direction)
    }
}

/// One direction of one route: an ordered sequence of stops.
///
/// The direction label is descriptive. It is used for display and for
/// matching departure direction text, never to restrict traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePattern {
    pub id: PatternId,
    pub name: String,
    pub category: VehicleCategory,
    pub direction_label: String,
    pub stops: Vec<Stop>,
}

impl RoutePattern {
    pub fn route_number(&self) -> &RouteNumber {
        &self.id.route
    }

    /// Number of stops carrying usable coordinates.
    pub fn resolvable_stop_count(&self) -> usize {
        self.stops
            .iter()
            .filter(|s| s.coordinates.is_valid())
            .count()
    }

    /// Whether the pattern can contribute at least one edge.
    pub fn is_usable(&self) -> bool {
        self.resolvable_stop_count() >= 2
    }
}
