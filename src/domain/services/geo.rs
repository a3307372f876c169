use crate::error::AppError;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two WGS84 coordinates,
/// haversine formula on a spherical earth.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Returns the distance from the geofence center and whether the point is
/// admitted (distance <= radius).
pub fn within_radius(
    center_lat: f64,
    center_lng: f64,
    point_lat: f64,
    point_lng: f64,
    radius_m: f64,
) -> Result<(f64, bool), AppError> {
    let inputs = [center_lat, center_lng, point_lat, point_lng, radius_m];
    if inputs.iter().any(|v| !v.is_finite()) {
        return Err(AppError::Validation("Coordinates and radius must be finite numbers".into()));
    }

    let distance = haversine_distance(center_lat, center_lng, point_lat, point_lng);
    Ok((distance, distance <= radius_m))
}
