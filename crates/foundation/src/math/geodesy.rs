use crate::geo::GeoPoint;

/// Mean Earth radius (kilometers), IUGG value used for haversine distances.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6_371.008_8;

/// Great-circle distance between two points on a sphere of mean Earth radius.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = lat_b - lat_a;
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards asin against rounding just above 1 for antipodal points.
    2.0 * EARTH_MEAN_RADIUS_KM * h.sqrt().min(1.0).asin()
}
