/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers to statute miles
pub const KM_TO_MILES: f64 = 0.621371;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two optional coordinate pairs.
///
/// Returns `None` when either point is missing. An unknown distance is not
/// a zero distance; callers must keep the two cases apart.
#[inline]
pub fn distance_km_between(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<f64> {
    match (a, b) {
        (Some((lat1, lon1)), Some((lat2, lon2))) => Some(haversine_km(lat1, lon1, lat2, lon2)),
        _ => None,
    }
}

#[inline]
pub fn km_to_miles(km: f64) -> f64 {
    km * KM_TO_MILES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_london_to_paris() {
        // Distance from London to Paris (approximately 344 km)
        let london_lat = 51.5074;
        let london_lon = -0.1278;
        let paris_lat = 48.8566;
        let paris_lon = 2.3522;

        let distance = haversine_km(london_lat, london_lon, paris_lat, paris_lon);
        assert!(
            (distance - 344.0).abs() < 10.0,
            "Distance should be ~344km, got {}",
            distance
        );
    }

    #[test]
    fn test_haversine_zero_distance() {
        let distance = haversine_km(40.7128, -74.0060, 40.7128, -74.0060);
        assert!(distance < 0.01);
    }

    #[test]
    fn test_missing_point_is_unknown_not_zero() {
        assert_eq!(distance_km_between(None, Some((40.0, -73.0))), None);
        assert_eq!(distance_km_between(Some((40.0, -73.0)), None), None);
        assert_eq!(distance_km_between(None, None), None);

        let known = distance_km_between(Some((40.0, -73.0)), Some((41.0, -73.0)));
        assert!(known.unwrap() > 100.0);
    }

    #[test]
    fn test_km_to_miles() {
        assert!((km_to_miles(100.0) - 62.1371).abs() < 1e-6);
    }
}
