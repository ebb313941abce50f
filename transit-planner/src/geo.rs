//! Great-circle distance between coordinates.

use crate::domain::Coordinates;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres on a spherical Earth.
///
/// Returns `f64::INFINITY` if either coordinate is missing or non-finite.
/// Callers treat an infinite distance as "no usable edge or heuristic".
///
/// # Examples
///
/// ```
/// use transit_planner::domain::Coordinates;
/// use transit_planner::geo::distance_km;
///
/// let a = Coordinates::new(48.40, 9.98);
/// let b = Coordinates::new(48.41, 9.99);
/// let d = distance_km(&a, &b);
/// assert!(d > 1.3 && d < 1.4);
///
/// assert!(distance_km(&a, &Coordinates::default()).is_infinite());
/// ```
pub fn distance_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let (Some((lat1, lng1)), Some((lat2, lng2))) = (a.resolved(), b.resolved()) else {
        return f64::INFINITY;
    };

    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let la1 = lat1.to_radians();
    let la2 = lat2.to_radians();

    let x = (d_lat / 2.0).sin().powi(2) + la1.cos() * la2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push near-antipodal points just past 1.
    let x = x.clamp(0.0, 1.0);
    let c = 2.0 * x.sqrt().atan2((1.0 - x).sqrt());

    EARTH_RADIUS_KM * c
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn coords() -> impl Strategy<Value = Coordinates> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| Coordinates::new(lat, lng))
    }

    proptest! {
        /// Distance does not depend on argument order
        #[test]
        fn symmetric(a in coords(), b in coords()) {
            let ab = distance_km(&a, &b);
            let ba = distance_km(&b, &a);
            prop_assert!((ab - ba).abs() < 1e-9);
        }

        /// A point is at distance zero from itself
        #[test]
        fn identity(a in coords()) {
            prop_assert_eq!(distance_km(&a, &a), 0.0);
        }

        /// Never more than half the circumference
        #[test]
        fn bounded(a in coords(), b in coords()) {
            let d = distance_km(&a, &b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
