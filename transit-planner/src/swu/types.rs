//! SWU mobility API response DTOs.
//!
//! These types map directly to the `stop/passage` JSON responses. The API
//! sends route and vehicle numbers as either numbers or strings, and omits
//! fields freely, so nearly everything is optional and leniently parsed.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// The two `stop/passage` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Passage {
    Departures,
    Arrivals,
}

impl Passage {
    /// Path segment after `stop/passage/`.
    pub fn path(self) -> &'static str {
        match self {
            Passage::Departures => "Departures",
            Passage::Arrivals => "Arrivals",
        }
    }
}

impl fmt::Display for Passage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Response from `stop/passage/Departures`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeparturesResponse {
    pub stop_passage: Option<DeparturePassage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeparturePassage {
    #[serde(default)]
    pub departure_data: Vec<DepartureData>,
}

/// Response from `stop/passage/Arrivals`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArrivalsResponse {
    pub stop_passage: Option<ArrivalPassage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArrivalPassage {
    #[serde(default)]
    pub arrival_data: Vec<ArrivalData>,
}

/// One vehicle departing a stop.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DepartureData {
    #[serde(default, deserialize_with = "flexible_string")]
    pub route_number: Option<String>,

    /// Headsign, e.g. "Kuhberg".
    pub departure_direction_text: Option<String>,

    #[serde(default, deserialize_with = "flexible_string")]
    pub vehicle_number: Option<String>,

    /// Timetabled departure (RFC 3339).
    pub departure_time_scheduled: Option<String>,

    /// Forecast or observed departure (RFC 3339).
    pub departure_time_actual: Option<String>,

    /// Delay in seconds, positive when late.
    #[serde(default, deserialize_with = "flexible_seconds")]
    pub departure_deviation: Option<i64>,

    pub arrival_time_scheduled: Option<String>,
    pub arrival_time_actual: Option<String>,
}

/// One vehicle arriving at a stop.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArrivalData {
    #[serde(default, deserialize_with = "flexible_string")]
    pub route_number: Option<String>,

    pub arrival_direction_text: Option<String>,

    #[serde(default, deserialize_with = "flexible_string")]
    pub vehicle_number: Option<String>,

    pub arrival_time_scheduled: Option<String>,
    pub arrival_time_actual: Option<String>,

    /// Delay in seconds, positive when late.
    #[serde(default, deserialize_with = "flexible_seconds")]
    pub arrival_deviation: Option<i64>,

    pub departure_time_scheduled: Option<String>,
    pub departure_time_actual: Option<String>,
}

/// Strings and numbers both become strings; anything else is absent.
fn flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Whole seconds from a number or numeric string.
fn flexible_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
