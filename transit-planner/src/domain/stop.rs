//! Stop identity and location types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque stop identifier.
///
/// Stop numbers are stable across the whole dataset, so they double as graph
/// node ids.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::StopId;
///
/// let id = StopId::parse(" 1240 ").unwrap();
/// assert_eq!(id, StopId(1240));
/// assert_eq!(id.to_string(), "1240");
///
/// assert!(StopId::parse("Hbf").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub u32);

/// Error returned when a stop number cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop number: {0:?}")]
pub struct InvalidStopId(pub String);

impl StopId {
    /// Parse a stop number, ignoring surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        s.trim()
            .parse::<u32>()
            .map(StopId)
            .map_err(|_| InvalidStopId(s.to_string()))
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A latitude/longitude pair as delivered by upstream feeds.
///
/// Either component may be missing. Use [`Coordinates::is_valid`] before
/// treating the pair as a real location.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    /// Returns the pair if both components are present and finite.
    pub fn resolved(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.resolved().is_some()
    }
}

/// A transit stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub coordinates: Coordinates,
}

impl Stop {
    pub fn new(id: StopId, name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            id,
            name: name.into(),
            coordinates,
        }
    }
}
