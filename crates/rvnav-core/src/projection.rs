//! Spherical Web-Mercator conversions.

use crate::models::{GeoPoint, ProjectedPoint};
use std::f64::consts::PI;

/// Equatorial radius of the spherical Mercator datum, meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Half the projected world width, meters.
pub const ORIGIN_SHIFT: f64 = 2.0 * PI * EARTH_RADIUS_M / 2.0;

/// Convert a projected map position to latitude/longitude.
pub fn projected_to_geo(point: ProjectedPoint) -> GeoPoint {
    let longitude = point.x / ORIGIN_SHIFT * 180.0;
    let lat = point.y / ORIGIN_SHIFT * 180.0;
    let latitude = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);
    GeoPoint::new(latitude, longitude)
}

/// Inverse of [`projected_to_geo`].
pub fn geo_to_projected(point: GeoPoint) -> ProjectedPoint {
    let x = point.longitude * ORIGIN_SHIFT / 180.0;
    let y = ((90.0 + point.latitude) * PI / 360.0).tan().ln() / (PI / 180.0);
    ProjectedPoint::new(x, y * ORIGIN_SHIFT / 180.0)
}
