//! Guided navigation along a fetched route.

use crossbeam_channel::Sender;
use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::anchor::{AnchorRegistry, AnchorTransform};
use crate::error::NavError;
use crate::geometry::distance;
use crate::layout::{PathBuilder, RenderSet};
use crate::model::Path;
use crate::store::RouteSource;
use crate::system::messages::SessionEvent;

use super::state::NavigationState;

/// Default arrival distance.
pub const DEFAULT_ARRIVAL_THRESHOLD: f64 = 1.5;

/// Where the user wants to go.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub destination: String,
    /// Beacon the destination is known to be anchored to, if the caller knows it.
    pub expected_beacon: Option<String>,
}

impl RouteRequest {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            expected_beacon: None,
        }
    }

    pub fn with_beacon(mut self, beacon: impl Into<String>) -> Self {
        self.expected_beacon = Some(beacon.into());
        self
    }
}

/// Lays out a route at the scanned marker and watches for arrival.
pub struct NavigationSession {
    request: RouteRequest,
    state: NavigationState,
    registry: AnchorRegistry,
    builder: PathBuilder,
    threshold: f64,
    path: Option<Path>,
    render: RenderSet,
    events: Option<Sender<SessionEvent>>,
}

impl NavigationSession {
    /// Create a session.
    ///
    /// # Arguments
    /// * `request` - Destination to route to
    /// * `builder` - Layout rules for the route
    /// * `threshold` - Arrival distance to the last node
    /// * `events` - Optional sender for UI notifications
    pub fn new(
        request: RouteRequest,
        builder: PathBuilder,
        threshold: f64,
        events: Option<Sender<SessionEvent>>,
    ) -> Self {
        Self {
            request,
            state: NavigationState::default(),
            registry: AnchorRegistry::new(),
            builder,
            threshold,
            path: None,
            render: RenderSet::new(),
            events,
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn request(&self) -> &RouteRequest {
        &self.request
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Route being followed, once laid out.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn render(&self) -> &RenderSet {
        &self.render
    }

    pub fn anchor(&self) -> Option<&AnchorTransform> {
        self.registry.current_origin()
    }

    /// Absolute position of the last node, which is the arrival target.
    pub fn target(&self) -> Option<Vector3<f64>> {
        self.render.last_node().map(|n| *n.position())
    }

    /// Fetch and lay out the route at the scanned marker.
    ///
    /// On any failure the session stays in `AwaitingAnchor` with nothing
    /// locked, so the user can simply scan again.
    pub fn on_anchor_scanned(
        &mut self,
        anchor: AnchorTransform,
        marker_name: &str,
        source: &dyn RouteSource,
    ) -> Result<(), NavError> {
        if self.state != NavigationState::AwaitingAnchor {
            return Err(self.fail(NavError::invalid_transition(
                "on_anchor_scanned",
                self.state,
            )));
        }
        if let Some(ref expected) = self.request.expected_beacon {
            if expected != marker_name {
                return Err(self.fail(NavError::WrongBeacon {
                    expected: expected.clone(),
                    scanned: marker_name.to_string(),
                }));
            }
        }

        let path = match source.fetch_route(&self.request.destination, marker_name) {
            Ok(path) => path,
            Err(e) => {
                return Err(self.fail(NavError::RouteUnavailable(format!("{e:#}"))));
            }
        };
        if path.beacon_name() != marker_name {
            return Err(self.fail(NavError::WrongBeacon {
                expected: path.beacon_name().to_string(),
                scanned: marker_name.to_string(),
            }));
        }

        self.registry
            .lock_origin_named(anchor.clone(), Some(marker_name.to_string()));
        self.emit(SessionEvent::AnchorLocked {
            beacon: Some(marker_name.to_string()),
        });

        self.state = NavigationState::Routing;
        self.render = self.builder.layout(&anchor, path.waypoints());
        info!(
            destination = path.destination(),
            nodes = self.render.nodes.len(),
            "route laid out"
        );
        self.emit(SessionEvent::RouteLaidOut {
            destination: path.destination().to_string(),
            nodes: self.render.nodes.len(),
        });
        self.path = Some(path);
        self.state = NavigationState::Walking;
        Ok(())
    }

    /// Distance from `camera` to the arrival target, if a route is laid out.
    pub fn distance_to_target(&self, camera: &Vector3<f64>) -> Option<f64> {
        self.target().map(|t| distance(camera, &t))
    }

    /// One arrival check. Only acts while `Walking`.
    ///
    /// Returns `true` when this sample completed the route.
    pub fn check_arrival(&mut self, camera: &Vector3<f64>) -> bool {
        if self.state != NavigationState::Walking {
            return false;
        }
        let Some(dist) = self.distance_to_target(camera) else {
            return false;
        };
        debug!(distance = dist, threshold = self.threshold, "arrival check");
        if dist > self.threshold {
            return false;
        }

        self.state = NavigationState::Arrived;
        info!(destination = %self.request.destination, distance = dist, "arrived");
        self.emit(SessionEvent::Arrived {
            destination: self.request.destination.clone(),
            distance: dist,
        });
        true
    }

    /// Abandon the route and wait for a new scan.
    pub fn cancel(&mut self) -> Result<(), NavError> {
        if self.state == NavigationState::AwaitingAnchor {
            return Err(self.fail(NavError::invalid_transition("cancel", self.state)));
        }
        self.reset();
        info!(destination = %self.request.destination, "navigation cancelled");
        self.emit(SessionEvent::Cancelled);
        Ok(())
    }

    /// Drop the route, render objects and origin lock.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.render.clear();
        self.path = None;
        self.state = NavigationState::AwaitingAnchor;
    }

    fn fail(&self, err: NavError) -> NavError {
        warn!(error = %err, "navigation operation rejected");
        self.emit(SessionEvent::Error(err.kind()));
        err
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(ref sender) = self.events {
            let _ = sender.try_send(event);
        }
    }
}
