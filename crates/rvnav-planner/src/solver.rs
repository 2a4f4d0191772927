//! Route solver adapter over an external routing engine.

use rvnav_core::error::PlanError;
use rvnav_core::models::{ExclusionZone, GeoPoint, RouteResult};
use rvnav_core::traits::{RoutingEngine, Stop};
use std::sync::Arc;

#[derive(Clone)]
pub struct RouteSolver {
    engine: Arc<dyn RoutingEngine>,
}

impl RouteSolver {
    pub fn new(engine: Arc<dyn RoutingEngine>) -> Self {
        Self { engine }
    }

    /// Solve a directed route from `start` to `end` avoiding `zones`.
    ///
    /// The first route the engine returns is selected; later candidates are
    /// ignored.
    pub async fn solve(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        zones: Vec<ExclusionZone>,
    ) -> Result<RouteResult, PlanError> {
        let mut parameters = self
            .engine
            .default_parameters()
            .await
            .map_err(PlanError::RouteParameters)?;

        let barrier_count = zones.len();
        parameters.set_stops(vec![
            Stop {
                name: "Origin".to_string(),
                location: start,
            },
            Stop {
                name: "Destination".to_string(),
                location: end,
            },
        ]);
        parameters.set_polygon_barriers(zones);

        tracing::debug!(barriers = barrier_count, "submitting route solve");
        let routes = self
            .engine
            .solve_route(&parameters)
            .await
            .map_err(PlanError::RouteSolve)?;

        if routes.len() > 1 {
            tracing::debug!(candidates = routes.len(), "using first returned route");
        }
        let route = routes.into_iter().next().ok_or(PlanError::NoRoute)?;
        let geometry = route
            .geometry
            .filter(|geometry| !geometry.is_empty())
            .ok_or(PlanError::EmptyGeometry)?;

        Ok(RouteResult {
            geometry,
            total_distance_meters: route.total_length_meters,
            total_travel_time_minutes: route.travel_time_minutes,
        })
    }
}
