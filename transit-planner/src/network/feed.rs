//! Loading compiled route patterns from a JSON feed.
//!
//! The feed is an array of patterns, each with its ordered stop list:
//!
//! ```json
//! [{
//!   "route_number": "2",
//!   "name": "Linie 2",
//!   "category": "TRAM",
//!   "direction_code": 1,
//!   "direction_name": "Kuhberg",
//!   "stops": [{"id": 1240, "name": "Hauptbahnhof", "lat": 48.399, "lng": 9.983}]
//! }]
//! ```
//!
//! `category` may also be the operator's numeric code (1 = tram). Stops with
//! missing or non-numeric coordinates are dropped, and so is any pattern left
//! with fewer than two stops.

use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::domain::{
    Coordinates, PatternId, RouteNumber, RoutePattern, Stop, StopId, VehicleCategory,
};

/// Error loading a pattern feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Feed file could not be read
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Feed is not valid JSON of the expected shape
    #[error("invalid pattern feed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct PatternRecord {
    route_number: String,
    #[serde(default)]
    name: String,
    #[serde(deserialize_with = "category")]
    category: VehicleCategory,
    #[serde(default)]
    direction_code: i32,
    #[serde(default)]
    direction_name: Option<String>,
    #[serde(default)]
    stops: Vec<StopRecord>,
}

#[derive(Debug, Deserialize)]
struct StopRecord {
    id: StopId,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    lng: Option<f64>,
}

/// Accepts any JSON value; only numbers survive.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

/// `"TRAM"`/`"BUS"` in any case, or the operator's numeric category code.
fn category<'de, D>(deserializer: D) -> Result<VehicleCategory, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => match s.trim().to_uppercase().as_str() {
            "TRAM" => Ok(VehicleCategory::Tram),
            "BUS" => Ok(VehicleCategory::Bus),
            other => Err(D::Error::custom(format!("unknown vehicle category {other:?}"))),
        },
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(VehicleCategory::from_code)
            .ok_or_else(|| D::Error::custom(format!("invalid category code {n}"))),
        other => Err(D::Error::custom(format!("invalid vehicle category {other}"))),
    }
}

/// Parse a feed document into usable patterns.
pub fn parse_patterns(json: &str) -> Result<Vec<RoutePattern>, FeedError> {
    let records: Vec<PatternRecord> = serde_json::from_str(json)?;
    Ok(compile(records))
}

/// Read and parse a feed file.
pub fn load_patterns(path: impl AsRef<Path>) -> Result<Vec<RoutePattern>, FeedError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_patterns(&json)
}

fn compile(records: Vec<PatternRecord>) -> Vec<RoutePattern> {
    let total = records.len();
    let mut patterns = Vec::with_capacity(total);

    for record in records {
        let Some(route) = RouteNumber::new(&record.route_number) else {
            warn!(name = %record.name, "Skipping pattern without route number");
            continue;
        };

        let stops: Vec<Stop> = record
            .stops
            .into_iter()
            .filter_map(|s| {
                let coordinates = Coordinates {
                    lat: s.lat,
                    lng: s.lng,
                };
                if coordinates.is_valid() {
                    Some(Stop::new(s.id, s.name, coordinates))
                } else {
                    debug!(stop = %s.id, route = %route, "Stop missing coordinates");
                    None
                }
            })
            .collect();

        let id = PatternId {
            route,
            direction: record.direction_code,
        };

        let direction_label = record
            .direction_name
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Direction {}", id.direction));

        let pattern = RoutePattern {
            id,
            name: record.name,
            category: record.category,
            direction_label,
            stops,
        };

        if !pattern.is_usable() {
            warn!(pattern = %pattern.id, "Pattern has fewer than 2 valid stops; skipping");
            continue;
        }

        patterns.push(pattern);
    }

    debug!(total, compiled = patterns.len(), "Compiled route patterns");

    patterns
}
