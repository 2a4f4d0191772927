//! End-to-end planning scenarios with in-memory collaborators.

use async_trait::async_trait;
use rvnav_core::error::{PlanError, PreconditionError};
use rvnav_core::format::{Notice, GENERIC_ERROR_MESSAGE};
use rvnav_core::models::{
    AvoidancePoint, GeoPoint, MarkerStyle, Polyline, ProjectedPoint, RouteRequest, VehicleProfile,
};
use rvnav_core::projection::geo_to_projected;
use rvnav_core::traits::{
    AvoidanceService, MapSurface, NoticeSurface, RouteParameters, RoutingEngine, SolvedRoute,
};
use rvnav_planner::{
    spawn_ui_context, AttemptOutcome, AttemptTracker, InMemoryVehicleStore, PlanState,
    PlannerSettings, RoutePlanner, RouteSolver, UiHandle,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
enum SurfaceEvent {
    Clear,
    Route(Polyline),
    Marker(GeoPoint, MarkerStyle),
}

#[derive(Clone, Default)]
struct RecordingSurface {
    events: Arc<Mutex<Vec<SurfaceEvent>>>,
    location: Option<ProjectedPoint>,
}

impl RecordingSurface {
    fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap().clone()
    }

    fn routes_drawn(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Route(_)))
            .count()
    }
}

impl MapSurface for RecordingSurface {
    fn clear_graphics(&mut self) {
        self.events.lock().unwrap().push(SurfaceEvent::Clear);
    }

    fn draw_route(&mut self, geometry: &Polyline) {
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Route(geometry.clone()));
    }

    fn add_marker(&mut self, location: GeoPoint, style: MarkerStyle) {
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Marker(location, style));
    }

    fn device_location(&self) -> Option<ProjectedPoint> {
        self.location
    }
}

#[derive(Clone, Default)]
struct RecordingNotices {
    shown: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotices {
    fn shown(&self) -> Vec<Notice> {
        self.shown.lock().unwrap().clone()
    }
}

impl NoticeSurface for RecordingNotices {
    fn present(&mut self, notice: &Notice) {
        self.shown.lock().unwrap().push(notice.clone());
    }
}

/// Parks the first call until released.
#[derive(Default)]
struct Gate {
    entered: Notify,
    release: Notify,
}

#[derive(Default)]
struct FakeAvoidance {
    hazards: Vec<AvoidancePoint>,
    fail: bool,
    gate: Option<Gate>,
    calls: AtomicUsize,
    requests: Mutex<Vec<RouteRequest>>,
}

#[async_trait]
impl AvoidanceService for FakeAvoidance {
    async fn get_avoidances(&self, request: &RouteRequest) -> anyhow::Result<Vec<AvoidancePoint>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(*request);
        if let (0, Some(gate)) = (call, self.gate.as_ref()) {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.fail {
            anyhow::bail!("connection reset by peer");
        }
        Ok(self.hazards.clone())
    }
}

#[derive(Default)]
struct FakeEngine {
    defaults_fail: bool,
    solve_fail: bool,
    routes: Vec<SolvedRoute>,
    submitted: Mutex<Vec<RouteParameters>>,
}

#[async_trait]
impl RoutingEngine for FakeEngine {
    async fn default_parameters(&self) -> anyhow::Result<RouteParameters> {
        if self.defaults_fail {
            anyhow::bail!("route layer unavailable");
        }
        Ok(RouteParameters {
            impedance: Some("TravelTime".to_string()),
            output_wkid: 4326,
            ..Default::default()
        })
    }

    async fn solve_route(&self, parameters: &RouteParameters) -> anyhow::Result<Vec<SolvedRoute>> {
        self.submitted.lock().unwrap().push(parameters.clone());
        if self.solve_fail {
            anyhow::bail!("No solution found.");
        }
        Ok(self.routes.clone())
    }
}

struct Harness {
    planner: Arc<RoutePlanner>,
    ui: UiHandle,
    surface: RecordingSurface,
    notices: RecordingNotices,
    avoidance: Arc<FakeAvoidance>,
    engine: Arc<FakeEngine>,
    tracker: AttemptTracker,
}

const START: GeoPoint = GeoPoint::new(40.0, -74.0);
const END: GeoPoint = GeoPoint::new(40.1, -74.1);

fn route_line() -> Polyline {
    Polyline::new(vec![START, GeoPoint::new(40.05, -74.06), END])
}

fn solved(geometry: Option<Polyline>) -> SolvedRoute {
    SolvedRoute {
        name: Some("Origin - Destination".to_string()),
        geometry,
        total_length_meters: 5_000.0,
        travel_time_minutes: 12.0,
    }
}

fn two_hazards() -> Vec<AvoidancePoint> {
    vec![
        AvoidancePoint::new(40.05, -74.05),
        AvoidancePoint::new(40.07, -74.02),
    ]
}

fn harness(
    avoidance: FakeAvoidance,
    engine: FakeEngine,
    height: Option<f64>,
    location: Option<ProjectedPoint>,
) -> Harness {
    let tracker = AttemptTracker::new();
    let surface = RecordingSurface {
        location,
        ..Default::default()
    };
    let notices = RecordingNotices::default();
    let (ui, _task) = spawn_ui_context(surface.clone(), notices.clone(), tracker.clone());

    let vehicles = Arc::new(InMemoryVehicleStore::new());
    vehicles.upsert(VehicleProfile::new("rv-1", "Class A", height));

    let avoidance = Arc::new(avoidance);
    let engine = Arc::new(engine);
    let planner = RoutePlanner::new(
        avoidance.clone(),
        RouteSolver::new(engine.clone()),
        vehicles,
        ui.clone(),
        tracker.clone(),
        PlannerSettings::default(),
    );

    Harness {
        planner: Arc::new(planner),
        ui,
        surface,
        notices,
        avoidance,
        engine,
        tracker,
    }
}

fn default_harness(avoidance: FakeAvoidance, engine: FakeEngine) -> Harness {
    harness(avoidance, engine, Some(13.5), Some(geo_to_projected(START)))
}

#[tokio::test]
async fn plans_route_around_fetched_hazards() {
    let h = default_harness(
        FakeAvoidance {
            hazards: two_hazards(),
            ..Default::default()
        },
        FakeEngine {
            routes: vec![solved(Some(route_line()))],
            ..Default::default()
        },
    );

    let outcome = h.planner.plan(Some(END)).await;
    h.ui.flush().await;

    let (summary, result, hazard_count) = match outcome {
        AttemptOutcome::Success {
            summary,
            result,
            hazard_count,
            ..
        } => (summary, result, hazard_count),
        other => panic!("expected success, got {:?}", other),
    };
    assert_eq!(summary.distance, "5 km");
    assert_eq!(summary.travel_time, "12 min");
    assert_eq!(hazard_count, 2);
    assert_eq!(result.geometry, route_line());
    assert_eq!(h.planner.state(), PlanState::Success);

    let request = h.avoidance.requests.lock().unwrap()[0];
    assert_eq!(request.vehicle_height, 13.5);
    assert!((request.start.latitude - START.latitude).abs() < 1e-9);
    assert!((request.start.longitude - START.longitude).abs() < 1e-9);
    assert_eq!(request.end, END);

    let submitted = h.engine.submitted.lock().unwrap().clone();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].polygon_barriers.len(), 2);
    assert_eq!(submitted[0].stops[1].location, END);

    let events = h.surface.events();
    assert_eq!(h.surface.routes_drawn(), 1);
    assert_eq!(
        events[events.len() - 3..],
        [
            SurfaceEvent::Route(route_line()),
            SurfaceEvent::Marker(request.start, MarkerStyle::Origin),
            SurfaceEvent::Marker(END, MarkerStyle::Destination),
        ]
    );
    let markers = events
        .iter()
        .rev()
        .take_while(|e| **e != SurfaceEvent::Clear)
        .filter(|e| matches!(e, SurfaceEvent::Marker(_, MarkerStyle::Hazard)))
        .count();
    assert_eq!(markers, 2);

    let notices = h.notices.shown();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Total distance: 5 km\nTravel time: 12 min");
    assert_eq!(notices[0].action, "OK");
}

#[tokio::test]
async fn avoidance_failure_solves_without_barriers() {
    let h = default_harness(
        FakeAvoidance {
            fail: true,
            ..Default::default()
        },
        FakeEngine {
            routes: vec![solved(Some(route_line()))],
            ..Default::default()
        },
    );

    let outcome = h.planner.plan(Some(END)).await;
    h.ui.flush().await;

    assert!(outcome.is_success());
    let submitted = h.engine.submitted.lock().unwrap().clone();
    assert_eq!(submitted.len(), 1);
    assert!(submitted[0].polygon_barriers.is_empty());
    assert!(!h
        .surface
        .events()
        .iter()
        .any(|e| matches!(e, SurfaceEvent::Marker(..))));
    assert_eq!(h.surface.routes_drawn(), 1);
}

#[tokio::test]
async fn route_without_geometry_is_not_drawn() {
    let h = default_harness(
        FakeAvoidance::default(),
        FakeEngine {
            routes: vec![solved(None)],
            ..Default::default()
        },
    );

    let outcome = h.planner.plan(Some(END)).await;
    h.ui.flush().await;

    assert!(matches!(
        outcome,
        AttemptOutcome::Failed {
            error: PlanError::EmptyGeometry,
            ..
        }
    ));
    assert_eq!(h.surface.routes_drawn(), 0);
    assert_eq!(h.planner.state(), PlanState::Failed);
    let notices = h.notices.shown();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn missing_height_aborts_before_network() {
    let h = harness(
        FakeAvoidance::default(),
        FakeEngine::default(),
        None,
        Some(geo_to_projected(START)),
    );

    let outcome = h.planner.plan(Some(END)).await;
    h.ui.flush().await;

    match outcome {
        AttemptOutcome::Failed { error, .. } => {
            assert_eq!(error.precondition(), Some(PreconditionError::MissingVehicleHeight));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(h.avoidance.calls.load(Ordering::SeqCst), 0);
    assert!(h.engine.submitted.lock().unwrap().is_empty());
    let notices = h.notices.shown();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.contains("vehicle"));
}

#[tokio::test]
async fn missing_destination_or_location_aborts() {
    let h = default_harness(FakeAvoidance::default(), FakeEngine::default());
    let outcome = h.planner.plan(None).await;
    assert!(matches!(
        outcome,
        AttemptOutcome::Failed {
            error: PlanError::Precondition(PreconditionError::MissingDestination),
            ..
        }
    ));

    let h = harness(FakeAvoidance::default(), FakeEngine::default(), Some(13.5), None);
    let outcome = h.planner.plan(Some(END)).await;
    assert!(matches!(
        outcome,
        AttemptOutcome::Failed {
            error: PlanError::Precondition(PreconditionError::MissingDeviceLocation),
            ..
        }
    ));
    assert_eq!(h.avoidance.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn parameter_failure_shows_generic_notice() {
    let h = default_harness(
        FakeAvoidance {
            hazards: two_hazards(),
            ..Default::default()
        },
        FakeEngine {
            defaults_fail: true,
            ..Default::default()
        },
    );

    let outcome = h.planner.plan(Some(END)).await;
    h.ui.flush().await;

    assert!(matches!(
        outcome,
        AttemptOutcome::Failed {
            error: PlanError::RouteParameters(_),
            ..
        }
    ));
    assert!(h.engine.submitted.lock().unwrap().is_empty());
    assert_eq!(h.surface.routes_drawn(), 0);
    let notices = h.notices.shown();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, GENERIC_ERROR_MESSAGE);
    assert_eq!(notices[0].action, "Dismiss");
}

#[tokio::test]
async fn solve_failure_shows_generic_notice() {
    let h = default_harness(
        FakeAvoidance::default(),
        FakeEngine {
            solve_fail: true,
            ..Default::default()
        },
    );

    let outcome = h.planner.plan(Some(END)).await;
    h.ui.flush().await;

    assert!(matches!(
        outcome,
        AttemptOutcome::Failed {
            error: PlanError::RouteSolve(_),
            ..
        }
    ));
    assert_eq!(h.notices.shown()[0].message, GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn newer_attempt_supersedes_in_flight_attempt() {
    let h = default_harness(
        FakeAvoidance {
            hazards: two_hazards(),
            gate: Some(Gate::default()),
            ..Default::default()
        },
        FakeEngine {
            routes: vec![solved(Some(route_line()))],
            ..Default::default()
        },
    );

    let planner = h.planner.clone();
    let first = tokio::spawn(async move { planner.plan(Some(END)).await });
    h.avoidance
        .gate
        .as_ref()
        .unwrap()
        .entered
        .notified()
        .await;

    let second = h.planner.plan(Some(END)).await;
    assert!(second.is_success());

    h.avoidance.gate.as_ref().unwrap().release.notify_one();
    let first = first.await.unwrap();
    h.ui.flush().await;

    assert!(matches!(first, AttemptOutcome::Superseded { .. }));
    assert!(first.attempt() < second.attempt());
    assert_eq!(h.engine.submitted.lock().unwrap().len(), 1);
    assert_eq!(h.surface.routes_drawn(), 1);
    assert_eq!(h.notices.shown().len(), 1);
    assert_eq!(h.planner.state(), PlanState::Success);
}

#[tokio::test]
async fn success_is_reported_only_after_route_is_drawn() {
    let h = default_harness(
        FakeAvoidance::default(),
        FakeEngine {
            routes: vec![solved(Some(route_line()))],
            ..Default::default()
        },
    );

    let outcome = h.planner.plan(Some(END)).await;
    assert!(outcome.is_success());
    assert_eq!(h.surface.routes_drawn(), 1);
    assert_eq!(h.notices.shown().len(), 1);

    // A newer attempt starting afterwards must not retract what was shown.
    h.tracker.begin();
    h.ui.flush().await;
    assert_eq!(h.surface.routes_drawn(), 1);
    assert_eq!(h.notices.shown().len(), 1);
}

#[tokio::test]
async fn failed_attempt_keeps_previous_route_visible() {
    let h = default_harness(
        FakeAvoidance {
            hazards: two_hazards(),
            ..Default::default()
        },
        FakeEngine {
            routes: vec![solved(Some(route_line()))],
            ..Default::default()
        },
    );
    assert!(h.planner.plan(Some(END)).await.is_success());

    let failing = RoutePlanner::new(
        h.avoidance.clone(),
        RouteSolver::new(Arc::new(FakeEngine {
            solve_fail: true,
            ..Default::default()
        })),
        Arc::new({
            let vehicles = InMemoryVehicleStore::new();
            vehicles.upsert(VehicleProfile::new("rv-1", "Class A", Some(13.5)));
            vehicles
        }),
        h.ui.clone(),
        h.tracker.clone(),
        PlannerSettings::default(),
    );
    let outcome = failing.plan(Some(END)).await;
    h.ui.flush().await;

    assert!(matches!(
        outcome,
        AttemptOutcome::Failed {
            error: PlanError::RouteSolve(_),
            ..
        }
    ));
    let events = h.surface.events();
    let last_clear = events
        .iter()
        .rposition(|e| *e == SurfaceEvent::Clear)
        .unwrap();
    assert!(events[last_clear..].contains(&SurfaceEvent::Route(route_line())));
    assert_eq!(h.notices.shown().len(), 2);
    assert_eq!(h.notices.shown()[1].message, GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn state_is_observable_while_attempt_runs() {
    let h = default_harness(
        FakeAvoidance {
            gate: Some(Gate::default()),
            ..Default::default()
        },
        FakeEngine {
            routes: vec![solved(Some(route_line()))],
            ..Default::default()
        },
    );
    let mut state = h.planner.subscribe_state();
    assert_eq!(*state.borrow_and_update(), PlanState::Idle);

    let planner = h.planner.clone();
    let attempt = tokio::spawn(async move { planner.plan(Some(END)).await });
    let gate = h.avoidance.gate.as_ref().unwrap();
    gate.entered.notified().await;
    assert_eq!(*state.borrow_and_update(), PlanState::FetchingAvoidances);

    gate.release.notify_one();
    assert!(attempt.await.unwrap().is_success());
    assert!(state.has_changed().unwrap());
    assert_eq!(*state.borrow_and_update(), PlanState::Success);
}
