//! Core data models for route planning.

use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Spherical Web-Mercator position in meters, as reported by the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Vehicle profile owned by the vehicle store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleProfile {
    pub id: String,
    pub name: String,
    /// Clearance height of the vehicle. `None` until the user fills it in.
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl VehicleProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, height: Option<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            height,
            length: None,
            weight: None,
        }
    }
}

/// Input to the avoidance service for one planning attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub vehicle_height: f64,
    pub start: GeoPoint,
    pub end: GeoPoint,
}

/// Hazard location returned by the avoidance service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvoidancePoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl AvoidancePoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Square barrier polygon around a single hazard.
///
/// Vertices are stored open (the first vertex is not repeated) in the order
/// `(+lat,+lon), (+lat,-lon), (-lat,-lon), (-lat,+lon)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    pub vertices: [GeoPoint; 4],
}

impl ExclusionZone {
    pub fn centroid(&self) -> GeoPoint {
        let (lat, lon) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(lat, lon), v| (lat + v.latitude, lon + v.longitude));
        GeoPoint::new(lat / 4.0, lon / 4.0)
    }
}

/// Ordered list of positions forming a drawable line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<GeoPoint>,
}

impl Polyline {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Route chosen for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub geometry: Polyline,
    pub total_distance_meters: f64,
    pub total_travel_time_minutes: f64,
}

/// Symbol used for point graphics on the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStyle {
    /// Red cross used for hazards.
    Hazard,
    Origin,
    Destination,
}
