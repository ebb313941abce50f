//! Departure events at a stop.
//!
//! A `Departure` is one vehicle passing a stop, taken from either the
//! departures or the arrivals feed. The two feeds overlap, so records carry an
//! identity key used to collapse duplicates.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::RouteNumber;

/// A real or scheduled vehicle event at a stop.
///
/// # Deviation convention
///
/// `deviation_secs` is positive when the vehicle runs late and negative when
/// it runs early. When an actual time is missing the effective time is the
/// scheduled time shifted by the deviation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Departure {
    pub route: RouteNumber,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default)]
    pub scheduled_departure: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_departure: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_arrival: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_arrival: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deviation_secs: i64,
}

/// De-duplication key: route, vehicle and effective event time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepartureKey {
    pub route: RouteNumber,
    pub vehicle: Option<String>,
    pub at: DateTime<Utc>,
}

impl Departure {
    /// A departure with only a scheduled departure time and no delay.
    pub fn scheduled(route: RouteNumber, direction: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            route,
            direction: direction.into(),
            vehicle: None,
            scheduled_departure: Some(at),
            actual_departure: None,
            scheduled_arrival: None,
            actual_arrival: None,
            deviation_secs: 0,
        }
    }

    pub fn with_vehicle(mut self, vehicle: impl Into<String>) -> Self {
        self.vehicle = Some(vehicle.into());
        self
    }

    pub fn with_deviation(mut self, secs: i64) -> Self {
        self.deviation_secs = secs;
        self
    }

    /// `scheduled` shifted by the deviation, or `None` if that is not a
    /// representable instant.
    fn shifted(&self, scheduled: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Duration::try_seconds(self.deviation_secs)
            .and_then(|deviation| scheduled.checked_add_signed(deviation))
    }

    /// Effective departure time: actual, else scheduled plus deviation.
    pub fn departure_time(&self) -> Option<DateTime<Utc>> {
        self.actual_departure
            .or_else(|| self.scheduled_departure.and_then(|t| self.shifted(t)))
    }

    /// Effective arrival time: actual, else scheduled plus deviation.
    pub fn arrival_time(&self) -> Option<DateTime<Utc>> {
        self.actual_arrival
            .or_else(|| self.scheduled_arrival.and_then(|t| self.shifted(t)))
    }

    /// The instant a rider can board: departure if known, otherwise arrival.
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        self.departure_time().or_else(|| self.arrival_time())
    }

    /// Returns `None` for records without any usable time.
    pub fn key(&self) -> Option<DepartureKey> {
        Some(DepartureKey {
            route: self.route.clone(),
            vehicle: self.vehicle.clone(),
            at: self.event_time()?,
        })
    }

    /// Lenient direction comparison.
    ///
    /// Direction texts differ between feeds ("Ulm Hbf" vs "Hbf"), so either
    /// side containing the other counts as a match, ignoring case.
    pub fn heads_towards(&self, label: &str) -> bool {
        let ours = self.direction.trim().to_lowercase();
        let theirs = label.trim().to_lowercase();
        ours.contains(&theirs) || theirs.contains(&ours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap()
    }

    fn route(s: &str) -> RouteNumber {
        RouteNumber::new(s).unwrap()
    }

    #[test]
    fn effective_time_prefers_actual() {
        let mut dep = Departure::scheduled(route("2"), "Kuhberg", at(10, 0)).with_deviation(120);
        assert_eq!(dep.departure_time(), Some(at(10, 2)));

        dep.actual_departure = Some(at(10, 5));
        assert_eq!(dep.departure_time(), Some(at(10, 5)));
    }

    #[test]
    fn negative_deviation_means_early() {
        let dep = Departure::scheduled(route("2"), "Kuhberg", at(10, 0)).with_deviation(-60);
        assert_eq!(dep.departure_time(), Some(at(9, 59)));
    }

    #[test]
    fn unrepresentable_deviation_has_no_effective_time() {
        let dep = Departure::scheduled(route("2"), "Kuhberg", at(10, 0)).with_deviation(i64::MAX);
        assert_eq!(dep.departure_time(), None);
        assert_eq!(dep.event_time(), None);
        assert!(dep.key().is_none());

        let mut dep = dep.with_deviation(i64::MIN);
        assert_eq!(dep.departure_time(), None);
        dep.actual_departure = Some(at(10, 4));
        assert_eq!(dep.event_time(), Some(at(10, 4)));
    }

    #[test]
    fn event_time_falls_back_to_arrival() {
        let mut dep = Departure::scheduled(route("2"), "Kuhberg", at(10, 0));
        dep.scheduled_departure = None;
        dep.scheduled_arrival = Some(at(9, 58));
        assert_eq!(dep.event_time(), Some(at(9, 58)));

        dep.scheduled_arrival = None;
        assert_eq!(dep.event_time(), None);
        assert!(dep.key().is_none());
    }

    #[test]
    fn key_distinguishes_vehicles() {
        let a = Departure::scheduled(route("5"), "North", at(10, 0)).with_vehicle("101");
        let b = Departure::scheduled(route("5"), "North", at(10, 0)).with_vehicle("102");
        let c = Departure::scheduled(route("5"), "Nord", at(10, 0)).with_vehicle("101");
        assert_ne!(a.key(), b.key());
        // Direction text is not part of identity.
        assert_eq!(a.key(), c.key());
    }

    #[test]
    fn direction_matching_is_lenient() {
        let dep = Departure::scheduled(route("5"), "Ulm Hbf", at(10, 0));
        assert!(dep.heads_towards("Hbf"));
        assert!(dep.heads_towards("ulm hbf"));
        assert!(dep.heads_towards("Richtung Ulm Hbf"));
        assert!(!dep.heads_towards("Wiblingen"));
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let json = r#"{"route":"5","scheduled_departure":"2024-03-15T10:00:00Z"}"#;
        let dep: Departure = serde_json::from_str(json).unwrap();
        assert_eq!(dep.route, route("5"));
        assert_eq!(dep.direction, "");
        assert_eq!(dep.departure_time(), Some(at(10, 0)));
    }
}
