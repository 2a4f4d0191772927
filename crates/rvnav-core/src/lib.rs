//! RVNav core - model, geometry and presentation logic for avoidance-aware
//! route planning.

pub mod barriers;
pub mod error;
pub mod format;
pub mod models;
pub mod projection;
pub mod traits;

pub use barriers::{build_zones, build_zones_with_epsilon, BARRIER_EPSILON_DEG};
pub use error::{PlanError, PreconditionError};
pub use format::{FormatLocale, Notice, RouteSummary, UnitSystem};
pub use models::{
    AvoidancePoint, ExclusionZone, GeoPoint, MarkerStyle, Polyline, ProjectedPoint, RouteRequest,
    RouteResult, VehicleProfile,
};
pub use projection::{geo_to_projected, projected_to_geo};
pub use traits::{
    AvoidanceService, MapSurface, NoticeSurface, RouteParameters, RoutingEngine, SolvedRoute,
    Stop, VehicleStore,
};
