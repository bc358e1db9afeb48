use crate::models::Coordinate;
use geo::{GeodesicDistance, Point};

/// Geodesic distance between two coordinates in kilometers
///
/// Uses the WGS84 ellipsoid (Karney's algorithm). Inputs are put into a
/// canonical order first so `d(a, b)` and `d(b, a)` are bit-identical.
pub fn geodesic_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let (first, second) = if (a.latitude, a.longitude) <= (b.latitude, b.longitude) {
        (a, b)
    } else {
        (b, a)
    };

    let p1 = Point::new(first.longitude, first.latitude);
    let p2 = Point::new(second.longitude, second.latitude);

    p1.geodesic_distance(&p2) / 1000.0
}

/// Check if a location lies within `max_radius_km` of the center
///
/// Unknown coordinates are never within radius.
pub fn is_within_radius(
    location: Option<Coordinate>,
    center: Option<Coordinate>,
    max_radius_km: f64,
) -> bool {
    match (location, center) {
        (Some(location), Some(center)) => geodesic_distance_km(center, location) <= max_radius_km,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BERLIN: Coordinate = Coordinate { latitude: 52.5200, longitude: 13.4050 };
    const POTSDAM: Coordinate = Coordinate { latitude: 52.3906, longitude: 13.0645 };

    #[test]
    fn test_berlin_to_potsdam() {
        let distance = geodesic_distance_km(BERLIN, POTSDAM);
        assert!((distance - 27.0).abs() < 2.0, "Distance should be ~27km, got {}", distance);
    }

    #[test]
    fn test_london_to_paris() {
        let london = Coordinate::new(51.5074, -0.1278);
        let paris = Coordinate::new(48.8566, 2.3522);

        let distance = geodesic_distance_km(london, paris);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_symmetric_and_zero() {
        assert_eq!(geodesic_distance_km(BERLIN, POTSDAM), geodesic_distance_km(POTSDAM, BERLIN));
        assert_eq!(geodesic_distance_km(BERLIN, BERLIN), 0.0);
    }

    #[test]
    fn test_within_radius() {
        assert!(is_within_radius(Some(POTSDAM), Some(BERLIN), 35.0));
        assert!(!is_within_radius(Some(POTSDAM), Some(BERLIN), 20.0));
        assert!(!is_within_radius(None, Some(BERLIN), 35.0));
        assert!(!is_within_radius(Some(POTSDAM), None, 35.0));
    }
}
