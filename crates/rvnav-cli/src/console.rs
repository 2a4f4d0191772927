//! Terminal stand-ins for the map and notice surfaces.

use rvnav_core::format::Notice;
use rvnav_core::models::{GeoPoint, MarkerStyle, Polyline, ProjectedPoint};
use rvnav_core::traits::{MapSurface, NoticeSurface};

/// Map surface that logs graphics instead of drawing them.
pub struct ConsoleMap {
    location: Option<ProjectedPoint>,
    markers: usize,
}

impl ConsoleMap {
    pub fn new(location: Option<ProjectedPoint>) -> Self {
        Self {
            location,
            markers: 0,
        }
    }
}

impl MapSurface for ConsoleMap {
    fn clear_graphics(&mut self) {
        self.markers = 0;
        tracing::debug!("map cleared");
    }

    fn draw_route(&mut self, geometry: &Polyline) {
        let first = geometry.points.first();
        let last = geometry.points.last();
        tracing::info!(
            points = geometry.points.len(),
            markers = self.markers,
            from = ?first,
            to = ?last,
            "route drawn"
        );
    }

    fn add_marker(&mut self, location: GeoPoint, style: MarkerStyle) {
        self.markers += 1;
        tracing::info!(
            lat = location.latitude,
            lon = location.longitude,
            style = ?style,
            "marker added"
        );
    }

    fn device_location(&self) -> Option<ProjectedPoint> {
        self.location
    }
}

/// Prints notices to stdout.
pub struct ConsoleNotices;

impl NoticeSurface for ConsoleNotices {
    fn present(&mut self, notice: &Notice) {
        if let Some(title) = &notice.title {
            println!("== {} ==", title);
        }
        println!("{}", notice.message);
        println!("[{}]", notice.action);
    }
}
