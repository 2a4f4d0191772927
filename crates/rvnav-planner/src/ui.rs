//! UI execution context.
//!
//! One task owns the map surface and the notice surface. Pipeline stages run
//! on arbitrary worker tasks and only reach the surfaces through [`UiHandle`].

use crate::attempt::{AttemptId, AttemptTracker};
use rvnav_core::format::Notice;
use rvnav_core::models::{GeoPoint, MarkerStyle, Polyline, ProjectedPoint};
use rvnav_core::traits::{MapSurface, NoticeSurface};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug)]
pub enum UiCommand {
    DeviceLocation {
        reply: oneshot::Sender<Option<ProjectedPoint>>,
    },
    ShowHazards {
        attempt: AttemptId,
        hazards: Vec<GeoPoint>,
    },
    /// Replies `true` once drawn, `false` if the attempt was superseded.
    PresentRoute {
        attempt: AttemptId,
        geometry: Polyline,
        origin: GeoPoint,
        destination: GeoPoint,
        notice: Notice,
        reply: oneshot::Sender<bool>,
    },
    ShowNotice {
        attempt: AttemptId,
        notice: Notice,
    },
    /// Replies once every earlier command has been applied.
    Flush {
        reply: oneshot::Sender<()>,
    },
}

#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiCommand>,
}

impl UiHandle {
    pub async fn device_location(&self) -> Option<ProjectedPoint> {
        let (reply, rx) = oneshot::channel();
        self.send(UiCommand::DeviceLocation { reply });
        rx.await.ok().flatten()
    }

    pub fn show_hazards(&self, attempt: AttemptId, hazards: Vec<GeoPoint>) {
        self.send(UiCommand::ShowHazards { attempt, hazards });
    }

    /// Replace the map contents with the route and show its summary.
    /// Returns `false` when the UI refused the update because a newer
    /// attempt has started.
    pub async fn present_route(
        &self,
        attempt: AttemptId,
        geometry: Polyline,
        origin: GeoPoint,
        destination: GeoPoint,
        notice: Notice,
    ) -> bool {
        let (reply, rx) = oneshot::channel();
        self.send(UiCommand::PresentRoute {
            attempt,
            geometry,
            origin,
            destination,
            notice,
            reply,
        });
        rx.await.unwrap_or(false)
    }

    pub fn show_notice(&self, attempt: AttemptId, notice: Notice) {
        self.send(UiCommand::ShowNotice { attempt, notice });
    }

    pub async fn flush(&self) {
        let (reply, rx) = oneshot::channel();
        self.send(UiCommand::Flush { reply });
        let _ = rx.await;
    }

    fn send(&self, command: UiCommand) {
        if self.tx.send(command).is_err() {
            tracing::warn!("UI context closed, dropping command");
        }
    }
}

struct UiContext<M, N> {
    surface: M,
    notices: N,
    tracker: AttemptTracker,
    hazards: Option<(AttemptId, Vec<GeoPoint>)>,
}

impl<M: MapSurface, N: NoticeSurface> UiContext<M, N> {
    fn apply(&mut self, command: UiCommand) {
        match command {
            UiCommand::DeviceLocation { reply } => {
                let _ = reply.send(self.surface.device_location());
            }
            UiCommand::ShowHazards { attempt, hazards } => {
                if !self.admit(attempt) {
                    return;
                }
                for hazard in &hazards {
                    self.surface.add_marker(*hazard, MarkerStyle::Hazard);
                }
                self.hazards = Some((attempt, hazards));
            }
            UiCommand::PresentRoute {
                attempt,
                geometry,
                origin,
                destination,
                notice,
                reply,
            } => {
                if !self.admit(attempt) {
                    let _ = reply.send(false);
                    return;
                }
                self.surface.clear_graphics();
                if let Some((owner, hazards)) = &self.hazards {
                    if *owner == attempt {
                        for hazard in hazards {
                            self.surface.add_marker(*hazard, MarkerStyle::Hazard);
                        }
                    }
                }
                self.surface.draw_route(&geometry);
                self.surface.add_marker(origin, MarkerStyle::Origin);
                self.surface.add_marker(destination, MarkerStyle::Destination);
                self.notices.present(&notice);
                let _ = reply.send(true);
            }
            UiCommand::ShowNotice { attempt, notice } => {
                if self.admit(attempt) {
                    self.notices.present(&notice);
                }
            }
            UiCommand::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn admit(&self, attempt: AttemptId) -> bool {
        let current = self.tracker.is_current(attempt);
        if !current {
            tracing::debug!(%attempt, "discarding UI update from superseded attempt");
        }
        current
    }
}

/// Spawn the task that owns the surfaces.
pub fn spawn_ui_context<M, N>(
    surface: M,
    notices: N,
    tracker: AttemptTracker,
) -> (UiHandle, JoinHandle<()>)
where
    M: MapSurface + 'static,
    N: NoticeSurface + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut context = UiContext {
        surface,
        notices,
        tracker,
        hazards: None,
    };
    let task = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            context.apply(command);
        }
        tracing::debug!("UI context stopped");
    });
    (UiHandle { tx }, task)
}
