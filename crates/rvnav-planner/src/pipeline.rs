//! Avoidance-aware route planning pipeline.
//!
//! One call to [`RoutePlanner::plan`] runs a single attempt:
//! precondition checks, hazard lookup, barrier construction, route solve and
//! presentation. Stages run sequentially; each network call is a suspension
//! point after which the attempt re-checks that it is still the latest.

use chrono::Utc;
use rvnav_core::barriers::build_zones_with_epsilon;
use rvnav_core::error::{PlanError, PreconditionError};
use rvnav_core::format::{
    error_notice, precondition_notice, summary_notice, FormatLocale, RouteSummary,
};
use rvnav_core::models::{AvoidancePoint, GeoPoint, RouteRequest, RouteResult};
use rvnav_core::projection::projected_to_geo;
use rvnav_core::traits::{AvoidanceService, VehicleStore};
use rvnav_core::BARRIER_EPSILON_DEG;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

use crate::attempt::{AttemptId, AttemptTracker};
use crate::solver::RouteSolver;
use crate::ui::UiHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanState {
    Idle,
    FetchingAvoidances,
    BuildingBarriers,
    SolvingRoute,
    Success,
    Failed,
}

#[derive(Debug)]
pub enum AttemptOutcome {
    Success {
        attempt: AttemptId,
        result: RouteResult,
        summary: RouteSummary,
        hazard_count: usize,
    },
    Failed {
        attempt: AttemptId,
        error: PlanError,
    },
    /// A newer attempt started before this one finished.
    Superseded { attempt: AttemptId },
}

impl AttemptOutcome {
    pub fn attempt(&self) -> AttemptId {
        match self {
            AttemptOutcome::Success { attempt, .. }
            | AttemptOutcome::Failed { attempt, .. }
            | AttemptOutcome::Superseded { attempt } => *attempt,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlannerSettings {
    pub barrier_epsilon_deg: f64,
    pub locale: FormatLocale,
    pub show_hazards: bool,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            barrier_epsilon_deg: BARRIER_EPSILON_DEG,
            locale: FormatLocale::default(),
            show_hazards: true,
        }
    }
}

pub struct RoutePlanner {
    avoidance: Arc<dyn AvoidanceService>,
    solver: RouteSolver,
    vehicles: Arc<dyn VehicleStore>,
    ui: UiHandle,
    tracker: AttemptTracker,
    settings: PlannerSettings,
    state: watch::Sender<PlanState>,
}

impl RoutePlanner {
    pub fn new(
        avoidance: Arc<dyn AvoidanceService>,
        solver: RouteSolver,
        vehicles: Arc<dyn VehicleStore>,
        ui: UiHandle,
        tracker: AttemptTracker,
        settings: PlannerSettings,
    ) -> Self {
        let (state, _) = watch::channel(PlanState::Idle);
        Self {
            avoidance,
            solver,
            vehicles,
            ui,
            tracker,
            settings,
            state,
        }
    }

    /// State of the latest attempt.
    pub fn subscribe_state(&self) -> watch::Receiver<PlanState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PlanState {
        *self.state.borrow()
    }

    /// Run one planning attempt towards `destination`, superseding any
    /// attempt still in flight.
    pub async fn plan(&self, destination: Option<GeoPoint>) -> AttemptOutcome {
        let attempt = self.tracker.begin();
        let started = Utc::now();
        let span = tracing::info_span!("plan", %attempt);

        let outcome = self.run(attempt, destination).instrument(span.clone()).await;

        let elapsed_ms = (Utc::now() - started).num_milliseconds();
        span.in_scope(|| match &outcome {
            AttemptOutcome::Success { summary, .. } => tracing::info!(
                elapsed_ms,
                distance = %summary.distance,
                travel_time = %summary.travel_time,
                "route planned"
            ),
            AttemptOutcome::Failed { error, .. } => {
                tracing::info!(elapsed_ms, error = %error, "route planning failed")
            }
            AttemptOutcome::Superseded { .. } => {
                tracing::info!(elapsed_ms, "attempt superseded")
            }
        });
        outcome
    }

    async fn run(&self, attempt: AttemptId, destination: Option<GeoPoint>) -> AttemptOutcome {
        self.transition(attempt, PlanState::Idle);

        let request = match self.prepare(destination).await {
            Ok(request) => request,
            Err(err) => return self.fail(attempt, err.into()),
        };

        self.transition(attempt, PlanState::FetchingAvoidances);
        let hazards = match self.avoidance.get_avoidances(&request).await {
            Ok(hazards) => hazards,
            Err(err) => {
                let err = PlanError::AvoidanceFetch(err);
                tracing::warn!(error = %err, "continuing without avoidance data");
                Vec::new()
            }
        };
        if !self.tracker.is_current(attempt) {
            return self.superseded(attempt);
        }
        tracing::info!(count = hazards.len(), "avoidances fetched");

        if self.settings.show_hazards && !hazards.is_empty() {
            let markers = hazards.iter().map(AvoidancePoint::location).collect();
            self.ui.show_hazards(attempt, markers);
        }

        self.transition(attempt, PlanState::BuildingBarriers);
        let zones = build_zones_with_epsilon(&hazards, self.settings.barrier_epsilon_deg);

        self.transition(attempt, PlanState::SolvingRoute);
        let result = match self.solver.solve(request.start, request.end, zones).await {
            Ok(result) => result,
            Err(err) => return self.fail(attempt, err),
        };
        if !self.tracker.is_current(attempt) {
            return self.superseded(attempt);
        }

        let summary = RouteSummary::from_result(&result, &self.settings.locale);
        let presented = self
            .ui
            .present_route(
                attempt,
                result.geometry.clone(),
                request.start,
                request.end,
                summary_notice(&summary),
            )
            .await;
        if !presented {
            return self.superseded(attempt);
        }
        self.transition(attempt, PlanState::Success);

        AttemptOutcome::Success {
            attempt,
            result,
            summary,
            hazard_count: hazards.len(),
        }
    }

    async fn prepare(
        &self,
        destination: Option<GeoPoint>,
    ) -> Result<RouteRequest, PreconditionError> {
        let vehicle_height = self
            .vehicles
            .selected_vehicle()
            .and_then(|vehicle| vehicle.height)
            .filter(|height| height.is_finite() && *height > 0.0)
            .ok_or(PreconditionError::MissingVehicleHeight)?;
        let end = destination.ok_or(PreconditionError::MissingDestination)?;
        let location = self
            .ui
            .device_location()
            .await
            .ok_or(PreconditionError::MissingDeviceLocation)?;

        Ok(RouteRequest {
            vehicle_height,
            start: projected_to_geo(location),
            end,
        })
    }

    fn fail(&self, attempt: AttemptId, error: PlanError) -> AttemptOutcome {
        if !self.tracker.is_current(attempt) {
            return self.superseded(attempt);
        }
        let notice = match error.precondition() {
            Some(precondition) => {
                tracing::warn!(error = %precondition, "attempt aborted before any network call");
                precondition_notice(precondition)
            }
            None => {
                tracing::error!(error = %error, "route planning failed");
                error_notice()
            }
        };
        self.ui.show_notice(attempt, notice);
        self.transition(attempt, PlanState::Failed);
        AttemptOutcome::Failed { attempt, error }
    }

    fn superseded(&self, attempt: AttemptId) -> AttemptOutcome {
        tracing::warn!(%attempt, "discarding result of superseded attempt");
        AttemptOutcome::Superseded { attempt }
    }

    fn transition(&self, attempt: AttemptId, next: PlanState) {
        if !self.tracker.is_current(attempt) {
            return;
        }
        tracing::debug!(state = ?next, "state transition");
        self.state.send_replace(next);
    }
}
