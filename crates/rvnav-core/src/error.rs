//! Error taxonomy for a planning attempt.

use thiserror::Error;

/// Inputs that must be present before any network call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("selected vehicle has no height")]
    MissingVehicleHeight,
    #[error("no destination selected")]
    MissingDestination,
    #[error("device location unavailable")]
    MissingDeviceLocation,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Hazard lookup failed. The pipeline continues without barriers.
    #[error("avoidance fetch failed: {0:#}")]
    AvoidanceFetch(#[source] anyhow::Error),

    #[error("default route parameters unavailable: {0:#}")]
    RouteParameters(#[source] anyhow::Error),

    #[error("route solve failed: {0:#}")]
    RouteSolve(#[source] anyhow::Error),

    #[error("routing engine returned no routes")]
    NoRoute,

    #[error("selected route has no geometry")]
    EmptyGeometry,
}

impl PlanError {
    /// Whether the error ends the attempt.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PlanError::AvoidanceFetch(_))
    }

    pub fn precondition(&self) -> Option<PreconditionError> {
        match self {
            PlanError::Precondition(inner) => Some(*inner),
            _ => None,
        }
    }
}
