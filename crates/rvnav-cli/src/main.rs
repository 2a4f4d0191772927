//! rvnav-plan - plan one avoidance-aware RV route from the command line.

mod console;

use anyhow::Result;
use clap::Parser;
use rvnav_core::models::{GeoPoint, ProjectedPoint, VehicleProfile};
use rvnav_core::projection::geo_to_projected;
use rvnav_planner::{
    spawn_ui_context, AttemptOutcome, AttemptTracker, Config, InMemoryVehicleStore, RoutePlanner,
    RouteSolver,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::{ConsoleMap, ConsoleNotices};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Current latitude
    #[arg(long, allow_hyphen_values = true, requires = "start_lon")]
    start_lat: Option<f64>,

    /// Current longitude
    #[arg(long, allow_hyphen_values = true, requires = "start_lat")]
    start_lon: Option<f64>,

    /// Current position as Web-Mercator x in meters
    #[arg(long, allow_hyphen_values = true, requires = "start_y", conflicts_with = "start_lat")]
    start_x: Option<f64>,

    /// Current position as Web-Mercator y in meters
    #[arg(long, allow_hyphen_values = true, requires = "start_x", conflicts_with = "start_lon")]
    start_y: Option<f64>,

    /// Destination latitude
    #[arg(long, allow_hyphen_values = true, requires = "end_lon")]
    end_lat: Option<f64>,

    /// Destination longitude
    #[arg(long, allow_hyphen_values = true, requires = "end_lat")]
    end_lon: Option<f64>,

    /// Vehicle clearance height
    #[arg(long)]
    height: Option<f64>,

    /// Vehicle display name
    #[arg(long, default_value = "My RV")]
    vehicle_name: String,

    /// Avoidance endpoint (overrides RVNAV_AVOIDANCE_URL)
    #[arg(long)]
    avoidance_url: Option<String>,

    /// Route layer URL (overrides RVNAV_ROUTE_SERVICE_URL)
    #[arg(long)]
    route_url: Option<String>,

    /// Formatting locale, e.g. en-US or de-DE (overrides RVNAV_LOCALE)
    #[arg(long)]
    locale: Option<String>,

    /// Do not plot hazard markers
    #[arg(long)]
    no_hazards: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn device_location(&self) -> Option<ProjectedPoint> {
        match (self.start_x, self.start_y, self.start_lat, self.start_lon) {
            (Some(x), Some(y), _, _) => Some(ProjectedPoint::new(x, y)),
            (_, _, Some(lat), Some(lon)) => Some(geo_to_projected(GeoPoint::new(lat, lon))),
            _ => None,
        }
    }

    fn destination(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.end_lat?, self.end_lon?))
    }

    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.avoidance_url {
            config.avoidance_url = url.clone();
        }
        if let Some(url) = &self.route_url {
            config.route_service_url = url.clone();
        }
        if let Some(locale) = &self.locale {
            config.locale = locale.clone();
        }
        if self.no_hazards {
            config.show_hazards = false;
        }
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(
            "rvnav_planner=info,rvnav_services=info,rvnav_plan=info",
        )
    })?;
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.log_json)?;

    let mut config = Config::from_env();
    args.apply(&mut config);
    tracing::info!(
        avoidance_url = %config.avoidance_url,
        route_url = %config.route_service_url,
        "starting route planning"
    );

    let avoidance = Arc::new(config.avoidance_client()?);
    let solver = RouteSolver::new(Arc::new(config.route_client()?));

    let vehicles = Arc::new(InMemoryVehicleStore::new());
    vehicles.upsert(VehicleProfile::new("cli", args.vehicle_name.clone(), args.height));

    let tracker = AttemptTracker::new();
    let (ui, ui_task) = spawn_ui_context(
        ConsoleMap::new(args.device_location()),
        ConsoleNotices,
        tracker.clone(),
    );

    let planner = RoutePlanner::new(
        avoidance,
        solver,
        vehicles,
        ui.clone(),
        tracker,
        config.planner_settings(),
    );

    let outcome = planner.plan(args.destination()).await;
    ui.flush().await;
    drop(planner);
    drop(ui);
    let _ = ui_task.await;

    Ok(match outcome {
        AttemptOutcome::Success { .. } => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
