//! Exclusion zone construction around hazard points.

use crate::models::{AvoidancePoint, ExclusionZone, GeoPoint};

/// Half-width of the square barrier around a hazard, degrees.
pub const BARRIER_EPSILON_DEG: f64 = 0.0001;

/// Build one square barrier per hazard using [`BARRIER_EPSILON_DEG`].
///
/// Hazards are not deduplicated; identical or overlapping points yield
/// identical or overlapping zones.
pub fn build_zones(points: &[AvoidancePoint]) -> Vec<ExclusionZone> {
    build_zones_with_epsilon(points, BARRIER_EPSILON_DEG)
}

pub fn build_zones_with_epsilon(points: &[AvoidancePoint], epsilon: f64) -> Vec<ExclusionZone> {
    points.iter().map(|p| square_around(p, epsilon)).collect()
}

fn square_around(point: &AvoidancePoint, epsilon: f64) -> ExclusionZone {
    let (lat, lon) = (point.latitude, point.longitude);
    ExclusionZone {
        vertices: [
            GeoPoint::new(lat + epsilon, lon + epsilon),
            GeoPoint::new(lat + epsilon, lon - epsilon),
            GeoPoint::new(lat - epsilon, lon - epsilon),
            GeoPoint::new(lat - epsilon, lon + epsilon),
        ],
    }
}

/// Shoelace area with x = longitude, y = latitude. Positive when counter-clockwise.
pub fn signed_area(ring: &[GeoPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = &ring[(i + 1) % ring.len()];
        sum += a.longitude * b.latitude - b.longitude * a.latitude;
    }
    sum / 2.0
}

/// Closed ring for the zone, oriented clockwise (Esri outer-ring convention).
pub fn clockwise_ring(zone: &ExclusionZone) -> Vec<GeoPoint> {
    let mut ring: Vec<GeoPoint> = zone.vertices.to_vec();
    if signed_area(&ring) > 0.0 {
        ring.reverse();
    }
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}
