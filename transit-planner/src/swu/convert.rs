//! Conversion from SWU DTOs to domain departures.
//!
//! Records without a usable route number or without any parseable time are
//! skipped rather than failing the whole response.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{Departure, RouteNumber, StopId};

use super::types::{ArrivalData, ArrivalsResponse, DepartureData, DeparturesResponse};

/// Parse an API timestamp.
///
/// RFC 3339 is expected; offsets written without a colon (`+0100`) are
/// accepted too.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Deviations beyond a day are corrupt records, not real delays.
pub const MAX_DEVIATION_SECS: i64 = 24 * 60 * 60;

fn time(field: &Option<String>) -> Option<DateTime<Utc>> {
    field.as_deref().and_then(parse_timestamp)
}

/// Deviation in seconds; out-of-range values are treated as on time.
fn deviation(route: &RouteNumber, secs: Option<i64>) -> i64 {
    match secs {
        Some(secs) if secs.abs() <= MAX_DEVIATION_SECS => secs,
        Some(secs) => {
            debug!(route = %route, deviation = secs, "Ignoring out-of-range deviation");
            0
        }
        None => 0,
    }
}

/// Convert one departures-feed record.
pub fn convert_departure(data: &DepartureData) -> Option<Departure> {
    let route = data.route_number.as_deref().and_then(RouteNumber::new)?;

    let deviation_secs = deviation(&route, data.departure_deviation);
    let departure = Departure {
        route,
        direction: data.departure_direction_text.clone().unwrap_or_default(),
        vehicle: data.vehicle_number.clone(),
        scheduled_departure: time(&data.departure_time_scheduled),
        actual_departure: time(&data.departure_time_actual),
        scheduled_arrival: time(&data.arrival_time_scheduled),
        actual_arrival: time(&data.arrival_time_actual),
        deviation_secs,
    };

    departure.event_time().map(|_| departure)
}

/// Convert one arrivals-feed record.
pub fn convert_arrival(data: &ArrivalData) -> Option<Departure> {
    let route = data.route_number.as_deref().and_then(RouteNumber::new)?;

    let deviation_secs = deviation(&route, data.arrival_deviation);
    let arrival = Departure {
        route,
        direction: data.arrival_direction_text.clone().unwrap_or_default(),
        vehicle: data.vehicle_number.clone(),
        scheduled_departure: time(&data.departure_time_scheduled),
        actual_departure: time(&data.departure_time_actual),
        scheduled_arrival: time(&data.arrival_time_scheduled),
        actual_arrival: time(&data.arrival_time_actual),
        deviation_secs,
    };

    arrival.event_time().map(|_| arrival)
}

pub fn convert_departures(stop: StopId, resp: &DeparturesResponse) -> Vec<Departure> {
    let records = resp
        .stop_passage
        .as_ref()
        .map(|p| p.departure_data.as_slice())
        .unwrap_or(&[]);

    records
        .iter()
        .filter_map(|data| {
            let converted = convert_departure(data);
            if converted.is_none() {
                debug!(
                    stop = %stop,
                    route = ?data.route_number,
                    "Skipping unusable departure record"
                );
            }
            converted
        })
        .collect()
}

pub fn convert_arrivals(stop: StopId, resp: &ArrivalsResponse) -> Vec<Departure> {
    let records = resp
        .stop_passage
        .as_ref()
        .map(|p| p.arrival_data.as_slice())
        .unwrap_or(&[]);

    records
        .iter()
        .filter_map(|data| {
            let converted = convert_arrival(data);
            if converted.is_none() {
                debug!(
                    stop = %stop,
                    route = ?data.route_number,
                    "Skipping unusable arrival record"
                );
            }
            converted
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swu::types::DeparturePassage;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap()
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(parse_timestamp("2024-03-15T11:02:00+01:00"), Some(utc(10, 2)));
        assert_eq!(parse_timestamp("2024-03-15T11:02:00+0100"), Some(utc(10, 2)));
        assert_eq!(parse_timestamp(" 2024-03-15T10:02:00Z "), Some(utc(10, 2)));
        assert_eq!(parse_timestamp("10:02"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn departure_with_actual_time() {
        let data = DepartureData {
            route_number: Some("2".into()),
            departure_direction_text: Some("Kuhberg".into()),
            vehicle_number: Some("47".into()),
            departure_time_scheduled: Some("2024-03-15T10:02:00Z".into()),
            departure_time_actual: Some("2024-03-15T10:04:00Z".into()),
            departure_deviation: Some(120),
            ..Default::default()
        };

        let dep = convert_departure(&data).unwrap();
        assert_eq!(dep.route.as_str(), "2");
        assert_eq!(dep.direction, "Kuhberg");
        assert_eq!(dep.departure_time(), Some(utc(10, 4)));
        assert_eq!(dep.deviation_secs, 120);
    }

    #[test]
    fn departure_without_actual_uses_deviation() {
        let data = DepartureData {
            route_number: Some("2".into()),
            departure_time_scheduled: Some("2024-03-15T10:02:00Z".into()),
            departure_deviation: Some(180),
            ..Default::default()
        };

        let dep = convert_departure(&data).unwrap();
        assert_eq!(dep.departure_time(), Some(utc(10, 5)));
    }

    #[test]
    fn arrival_record() {
        let data = ArrivalData {
            route_number: Some("5".into()),
            arrival_direction_text: Some("Wiblingen".into()),
            arrival_time_scheduled: Some("2024-03-15T10:10:00Z".into()),
            arrival_deviation: Some(-60),
            ..Default::default()
        };

        let arr = convert_arrival(&data).unwrap();
        assert_eq!(arr.direction, "Wiblingen");
        assert_eq!(arr.departure_time(), None);
        assert_eq!(arr.event_time(), Some(utc(10, 9)));
    }

    #[test]
    fn skips_unusable_records() {
        let no_route = DepartureData {
            departure_time_scheduled: Some("2024-03-15T10:02:00Z".into()),
            ..Default::default()
        };
        let no_time = DepartureData {
            route_number: Some("2".into()),
            departure_time_scheduled: Some("garbage".into()),
            ..Default::default()
        };
        let good = DepartureData {
            route_number: Some("3".into()),
            departure_time_scheduled: Some("2024-03-15T10:02:00Z".into()),
            ..Default::default()
        };

        let resp = DeparturesResponse {
            stop_passage: Some(DeparturePassage {
                departure_data: vec![no_route, no_time, good],
            }),
        };

        let deps = convert_departures(StopId(1240), &resp);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].route.as_str(), "3");
    }

    #[test]
    fn out_of_range_deviation_is_ignored() {
        let resp: DeparturesResponse = serde_json::from_str(
            r#"{"StopPassage": {"DepartureData": [
                {"RouteNumber": 2, "DepartureTimeScheduled": "2024-03-15T11:02:00+01:00",
                 "DepartureDeviation": 9999999999999999},
                {"RouteNumber": 3, "DepartureTimeScheduled": "2024-03-15T11:04:00+01:00",
                 "DepartureDeviation": -90000}
            ]}}"#,
        )
        .unwrap();

        let deps = convert_departures(StopId(1240), &resp);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].deviation_secs, 0);
        assert_eq!(deps[0].departure_time(), Some(utc(10, 2)));
        assert_eq!(deps[1].deviation_secs, 0);
        assert_eq!(deps[1].departure_time(), Some(utc(10, 4)));
    }

    #[test]
    fn empty_response() {
        assert!(convert_arrivals(StopId(1), &ArrivalsResponse::default()).is_empty());
    }
}
