//! RVNav planner - runs avoidance-aware route planning attempts against the
//! avoidance backend and routing engine, and marshals results onto the UI
//! context.

pub mod attempt;
pub mod config;
pub mod pipeline;
pub mod solver;
pub mod ui;
pub mod vehicles;

pub use attempt::{AttemptId, AttemptTracker};
pub use config::Config;
pub use pipeline::{AttemptOutcome, PlanState, PlannerSettings, RoutePlanner};
pub use solver::RouteSolver;
pub use ui::{spawn_ui_context, UiCommand, UiHandle};
pub use vehicles::InMemoryVehicleStore;
