//! Capability interfaces for the collaborators around the planning pipeline.

use crate::format::Notice;
use crate::models::{
    AvoidancePoint, ExclusionZone, GeoPoint, MarkerStyle, Polyline, ProjectedPoint, RouteRequest,
    VehicleProfile,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Backend that knows where a vehicle of a given height cannot pass.
#[async_trait]
pub trait AvoidanceService: Send + Sync {
    async fn get_avoidances(&self, request: &RouteRequest) -> anyhow::Result<Vec<AvoidancePoint>>;
}

/// Ordered waypoint submitted to the routing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,
    pub location: GeoPoint,
}

/// Solve parameters, seeded from the engine's defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteParameters {
    pub stops: Vec<Stop>,
    pub polygon_barriers: Vec<ExclusionZone>,
    pub travel_mode: Option<String>,
    pub impedance: Option<String>,
    pub return_directions: bool,
    /// WKID of the geometry returned by the engine.
    pub output_wkid: u32,
}

impl RouteParameters {
    pub fn set_stops(&mut self, stops: Vec<Stop>) {
        self.stops = stops;
    }

    pub fn set_polygon_barriers(&mut self, barriers: Vec<ExclusionZone>) {
        self.polygon_barriers = barriers;
    }
}

/// One candidate route as returned by the routing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedRoute {
    pub name: Option<String>,
    pub geometry: Option<Polyline>,
    pub total_length_meters: f64,
    pub travel_time_minutes: f64,
}

/// External routing engine with a two-phase protocol.
#[async_trait]
pub trait RoutingEngine: Send + Sync {
    async fn default_parameters(&self) -> anyhow::Result<RouteParameters>;

    async fn solve_route(&self, parameters: &RouteParameters) -> anyhow::Result<Vec<SolvedRoute>>;
}

pub trait VehicleStore: Send + Sync {
    fn vehicles(&self) -> Vec<VehicleProfile>;

    fn selected_vehicle(&self) -> Option<VehicleProfile>;
}

/// Drawing surface. Only touched from the UI context.
pub trait MapSurface: Send {
    fn clear_graphics(&mut self);

    fn draw_route(&mut self, geometry: &Polyline);

    fn add_marker(&mut self, location: GeoPoint, style: MarkerStyle);

    fn device_location(&self) -> Option<ProjectedPoint>;
}

pub trait NoticeSurface: Send {
    fn present(&mut self, notice: &Notice);
}
