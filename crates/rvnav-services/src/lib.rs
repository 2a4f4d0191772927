//! RVNav services - HTTP clients for the external collaborators.
//!
//! Handles communication with the avoidance backend and the routing engine.

pub mod arcgis;
pub mod avoidance;

pub use arcgis::{ArcGisRouteClient, ROUTE_WORLD_URL};
pub use avoidance::AvoidanceClient;
