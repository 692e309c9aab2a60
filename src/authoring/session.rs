//! Interactive path authoring.
//!
//! The user scans a marker, walks, and taps: the first tap drops the start
//! waypoint, later taps drop intermediates, and `end` drops the destination.
//! Each waypoint stores its offset from the previously placed node, expressed
//! in that node's frame (the marker frame), and a preview node is laid out with
//! the same chain rule navigation uses.

use crossbeam_channel::Sender;
use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::anchor::{AnchorRegistry, AnchorTransform};
use crate::error::NavError;
use crate::layout::{PathBuilder, RenderSet};
use crate::model::{Path, Waypoint, WaypointKind};
use crate::system::messages::SessionEvent;

use super::state::AuthoringState;

/// Builds a new [`Path`] from live camera positions and button taps.
pub struct MapAuthoringSession {
    state: AuthoringState,
    registry: AnchorRegistry,
    builder: PathBuilder,
    waypoints: Vec<Waypoint>,
    render: RenderSet,
    events: Option<Sender<SessionEvent>>,
}

impl MapAuthoringSession {
    /// Create a session.
    ///
    /// # Arguments
    /// * `builder` - Layout rules for the preview nodes
    /// * `events` - Optional sender for UI notifications
    pub fn new(builder: PathBuilder, events: Option<Sender<SessionEvent>>) -> Self {
        Self {
            state: AuthoringState::default(),
            registry: AnchorRegistry::new(),
            builder,
            waypoints: Vec::new(),
            render: RenderSet::new(),
            events,
        }
    }

    pub fn state(&self) -> AuthoringState {
        self.state
    }

    /// Waypoints placed so far, in placement order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Preview nodes and edges for the waypoints placed so far.
    pub fn render(&self) -> &RenderSet {
        &self.render
    }

    pub fn anchor(&self) -> Option<&AnchorTransform> {
        self.registry.current_origin()
    }

    pub fn beacon_name(&self) -> Option<&str> {
        self.registry.beacon_name()
    }

    /// Lock the origin to the scanned marker.
    pub fn on_anchor_scanned(
        &mut self,
        anchor: AnchorTransform,
        beacon_name: impl Into<String>,
    ) -> Result<(), NavError> {
        if self.state != AuthoringState::AwaitingAnchor {
            return Err(self.reject("on_anchor_scanned"));
        }
        let beacon = beacon_name.into();
        self.registry.lock_origin_named(anchor, Some(beacon.clone()));
        self.state = AuthoringState::AwaitingStart;

        info!(beacon = %beacon, "authoring anchored");
        self.emit(SessionEvent::AnchorLocked {
            beacon: Some(beacon),
        });
        Ok(())
    }

    /// Place the start waypoint at the camera position.
    pub fn add_start(&mut self, camera: Vector3<f64>) -> Result<(), NavError> {
        if self.state != AuthoringState::AwaitingStart {
            return Err(self.reject("add_start"));
        }
        self.append(WaypointKind::Start, camera, "add_start")?;
        self.state = AuthoringState::Building;
        Ok(())
    }

    /// Place an intermediate waypoint at the camera position.
    pub fn add_intermediate(&mut self, camera: Vector3<f64>) -> Result<(), NavError> {
        if self.state != AuthoringState::Building {
            return Err(self.reject("add_intermediate"));
        }
        self.append(WaypointKind::Intermediate, camera, "add_intermediate")
    }

    /// Place the destination waypoint and close the path.
    pub fn end(&mut self, camera: Vector3<f64>) -> Result<(), NavError> {
        if self.state != AuthoringState::Building || self.waypoints.is_empty() {
            return Err(self.reject("end"));
        }
        self.append(WaypointKind::Destination, camera, "end")?;
        self.state = AuthoringState::Ended;
        Ok(())
    }

    /// Remove the most recent waypoint and its preview node.
    pub fn undo(&mut self) -> Result<(), NavError> {
        if !matches!(
            self.state,
            AuthoringState::Building | AuthoringState::Ended
        ) {
            return Err(self.reject("undo"));
        }
        let Some(removed) = self.waypoints.pop() else {
            return Err(self.reject("undo"));
        };
        self.render.pop_node();

        let index = self.waypoints.len();
        self.state = if self.waypoints.is_empty() {
            AuthoringState::AwaitingStart
        } else {
            AuthoringState::Building
        };
        debug!(index, kind = %removed.kind(), state = ?self.state, "waypoint undone");
        self.emit(SessionEvent::WaypointRemoved { index });
        Ok(())
    }

    /// Finalize the path under `name` and reset for the next one.
    ///
    /// Fails with [`NavError::EmptyPathSave`] while fewer than two waypoints
    /// exist, and with [`NavError::InvalidStateTransition`] when the path has
    /// not been ended yet. Either way the session is left as it was.
    pub fn save(&mut self, name: impl Into<String>) -> Result<Path, NavError> {
        let path = self.finalize(name)?;
        self.mark_saved(&path);
        Ok(path)
    }

    /// Build the [`Path`] that [`save`](Self::save) would produce, leaving the
    /// session untouched.
    ///
    /// Callers that persist the path pair this with
    /// [`mark_saved`](Self::mark_saved) once the write has succeeded.
    pub fn finalize(&self, name: impl Into<String>) -> Result<Path, NavError> {
        match self.state {
            AuthoringState::Ended => {}
            AuthoringState::AwaitingStart | AuthoringState::Building
                if self.waypoints.len() < 2 =>
            {
                let err = NavError::EmptyPathSave {
                    waypoints: self.waypoints.len(),
                };
                return Err(self.fail(err));
            }
            _ => return Err(self.reject("save")),
        }

        let beacon = self.registry.beacon_name().unwrap_or_default().to_string();
        Path::new(name, beacon, self.waypoints.clone()).map_err(|e| self.fail(e))
    }

    /// Announce `path` as saved and reset for the next one.
    pub fn mark_saved(&mut self, path: &Path) {
        info!(
            destination = path.destination(),
            beacon = path.beacon_name(),
            waypoints = path.len(),
            "path saved"
        );
        self.emit(SessionEvent::PathSaved {
            destination: path.destination().to_string(),
            waypoints: path.len(),
        });
        self.reset();
    }

    /// Discard everything and wait for a new marker scan.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.waypoints.clear();
        self.render.clear();
        self.state = AuthoringState::AwaitingAnchor;
    }

    fn append(
        &mut self,
        kind: WaypointKind,
        camera: Vector3<f64>,
        action: &'static str,
    ) -> Result<(), NavError> {
        let Some(anchor) = self.registry.current_origin() else {
            return Err(self.reject(action));
        };
        let last_placed = self
            .render
            .last_node()
            .map(|n| n.pose.clone())
            .unwrap_or_else(|| anchor.pose().clone());

        // Offsets are stored in the last node's frame so the chain lands on `camera`.
        let offset = last_placed.inverse().transform_point(&camera);
        let waypoint = Waypoint::new(kind, offset);
        let placed = self.builder.place_next(&mut self.render, anchor, &waypoint);
        self.waypoints.push(waypoint);

        let index = self.waypoints.len() - 1;
        debug!(index, kind = %kind, position = ?placed.translation, "waypoint added");
        self.emit(SessionEvent::WaypointAdded {
            index,
            kind,
            position: placed.translation,
        });
        Ok(())
    }

    fn reject(&self, action: &'static str) -> NavError {
        self.fail(NavError::invalid_transition(action, self.state))
    }

    fn fail(&self, err: NavError) -> NavError {
        warn!(error = %err, "authoring operation rejected");
        self.emit(SessionEvent::Error(err.kind()));
        err
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(ref sender) = self.events {
            let _ = sender.try_send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::geometry::SE3;
    use approx::assert_relative_eq;
    use crossbeam_channel::unbounded;
    use nalgebra::UnitQuaternion;
    use std::f64::consts::FRAC_PI_2;

    fn anchor_at(p: Vector3<f64>) -> AnchorTransform {
        AnchorTransform::from_pose(SE3::from_translation(p))
    }

    fn anchored_session() -> MapAuthoringSession {
        let mut session = MapAuthoringSession::new(PathBuilder::default(), None);
        session
            .on_anchor_scanned(anchor_at(Vector3::new(0.0, 1.0, 0.0)), "pi")
            .unwrap();
        session
    }

    #[test]
    fn test_full_walk_then_undo_leaves_building() {
        let mut session = anchored_session();
        session.add_start(Vector3::new(0.0, 0.0, -1.0)).unwrap();
        session.add_intermediate(Vector3::new(0.0, 0.0, -3.0)).unwrap();
        session.add_intermediate(Vector3::new(2.0, 0.0, -3.0)).unwrap();
        session.end(Vector3::new(2.0, 0.0, -6.0)).unwrap();
        assert_eq!(session.state(), AuthoringState::Ended);
        assert_eq!(session.waypoints().len(), 4);

        session.undo().unwrap();
        assert_eq!(session.state(), AuthoringState::Building);
        assert_eq!(session.waypoints().len(), 3);
        assert_eq!(session.render().nodes.len(), 3);
        assert_eq!(session.render().edges.len(), 2);
    }

    #[test]
    fn test_offsets_are_relative_to_previous_node() {
        let mut session = anchored_session();
        session.add_start(Vector3::new(0.0, 0.0, -1.0)).unwrap();
        session.add_intermediate(Vector3::new(0.0, 0.0, -3.0)).unwrap();
        session.end(Vector3::new(2.0, 0.0, -3.0)).unwrap();

        let offsets: Vec<_> = session.waypoints().iter().map(|w| *w.offset()).collect();
        assert_relative_eq!(offsets[0], Vector3::new(0.0, -1.0, -1.0));
        assert_relative_eq!(offsets[1], Vector3::new(0.0, 0.0, -2.0));
        assert_relative_eq!(offsets[2], Vector3::new(2.0, 0.0, 0.0));

        // With an unrotated anchor the preview lands on the tapped positions.
        let last = session.render().last_node().unwrap();
        assert_relative_eq!(*last.position(), Vector3::new(2.0, 0.0, -3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rotated_anchor_preview_lands_on_taps() {
        let mut session = MapAuthoringSession::new(PathBuilder::default(), None);
        session.on_anchor_scanned(rotated_anchor(), "pi").unwrap();

        let taps = [
            Vector3::new(3.0, 0.0, 0.0),
            Vector3::new(3.0, 0.0, -2.0),
            Vector3::new(6.0, 0.0, -2.0),
        ];
        session.add_start(taps[0]).unwrap();
        session.add_intermediate(taps[1]).unwrap();
        session.end(taps[2]).unwrap();

        for (node, tap) in session.render().nodes.iter().zip(&taps) {
            assert_relative_eq!(*node.position(), *tap, epsilon = 1e-9);
        }

        // Offsets are marker-frame deltas.
        assert_relative_eq!(
            *session.waypoints()[0].offset(),
            Vector3::new(0.0, 0.0, 2.0),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            *session.waypoints()[1].offset(),
            Vector3::new(2.0, 0.0, 0.0),
            epsilon = 1e-9
        );

        // Replaying the saved path from the same marker reproduces the walk.
        let path = session.save("Lab").unwrap();
        let replay = PathBuilder::default().layout(&rotated_anchor(), path.waypoints());
        for (node, tap) in replay.nodes.iter().zip(&taps) {
            assert_relative_eq!(*node.position(), *tap, epsilon = 1e-9);
        }
    }

    /// Marker at (1, 0, 0) turned 90° about +Y: its +Z points along world +X.
    fn rotated_anchor() -> AnchorTransform {
        AnchorTransform::from_pose(SE3 {
            rotation: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
            translation: Vector3::new(1.0, 0.0, 0.0),
        })
    }

    #[test]
    fn test_undo_to_zero_returns_to_awaiting_start() {
        let mut session = anchored_session();
        session.add_start(Vector3::new(0.0, 0.0, -1.0)).unwrap();
        session.add_intermediate(Vector3::new(0.0, 0.0, -2.0)).unwrap();
        session.end(Vector3::new(0.0, 0.0, -3.0)).unwrap();

        for _ in 0..3 {
            session.undo().unwrap();
        }
        assert_eq!(session.state(), AuthoringState::AwaitingStart);
        assert!(session.waypoints().is_empty());
        assert!(session.render().is_empty());
        assert!(session.anchor().is_some());

        let err = session.undo().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
        assert_eq!(session.state(), AuthoringState::AwaitingStart);
    }

    #[test]
    fn test_save_with_only_start_fails() {
        let mut session = anchored_session();
        session.add_start(Vector3::new(0.0, 0.0, -1.0)).unwrap();

        let err = session.save("Lab").unwrap_err();
        assert_eq!(err, NavError::EmptyPathSave { waypoints: 1 });
        assert_eq!(session.state(), AuthoringState::Building);
        assert_eq!(session.waypoints().len(), 1);
    }

    #[test]
    fn test_save_before_end_is_invalid() {
        let mut session = anchored_session();
        session.add_start(Vector3::new(0.0, 0.0, -1.0)).unwrap();
        session.add_intermediate(Vector3::new(0.0, 0.0, -2.0)).unwrap();

        let err = session.save("Lab").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
        assert_eq!(session.waypoints().len(), 2);
    }

    #[test]
    fn test_save_produces_path_and_resets() {
        let mut session = anchored_session();
        session.add_start(Vector3::new(0.0, 0.0, -1.0)).unwrap();
        session.end(Vector3::new(0.0, 0.0, -4.0)).unwrap();

        let path = session.save("Lab").unwrap();
        assert_eq!(path.destination(), "Lab");
        assert_eq!(path.beacon_name(), "pi");
        assert_eq!(path.len(), 2);
        assert_eq!(path.waypoints()[1].kind(), WaypointKind::Destination);

        assert_eq!(session.state(), AuthoringState::AwaitingAnchor);
        assert!(session.waypoints().is_empty());
        assert!(session.render().is_empty());
        assert!(session.anchor().is_none());
    }

    #[test]
    fn test_wrong_state_calls_leave_list_intact() {
        let mut session = MapAuthoringSession::new(PathBuilder::default(), None);
        assert!(session.add_start(Vector3::zeros()).is_err());
        assert!(session.end(Vector3::zeros()).is_err());
        assert_eq!(session.state(), AuthoringState::AwaitingAnchor);

        let mut session = anchored_session();
        assert!(session.add_intermediate(Vector3::zeros()).is_err());
        assert!(session.end(Vector3::zeros()).is_err());
        session.add_start(Vector3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(session.add_start(Vector3::zeros()).is_err());
        assert!(
            session
                .on_anchor_scanned(anchor_at(Vector3::x()), "other")
                .is_err()
        );
        session.end(Vector3::new(0.0, 0.0, -2.0)).unwrap();
        assert!(session.add_intermediate(Vector3::zeros()).is_err());

        assert_eq!(session.waypoints().len(), 2);
        assert_eq!(session.beacon_name(), Some("pi"));
        assert_eq!(session.state(), AuthoringState::Ended);
    }

    #[test]
    fn test_events_follow_operations() {
        let (tx, rx) = unbounded();
        let mut session = MapAuthoringSession::new(PathBuilder::default(), Some(tx));
        session
            .on_anchor_scanned(anchor_at(Vector3::zeros()), "pi")
            .unwrap();
        session.add_start(Vector3::new(0.0, 0.0, -1.0)).unwrap();
        session.undo().unwrap();
        let _ = session.save("Lab");

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events[0],
            SessionEvent::AnchorLocked {
                beacon: Some("pi".to_string())
            }
        );
        assert!(matches!(
            events[1],
            SessionEvent::WaypointAdded {
                index: 0,
                kind: WaypointKind::Start,
                ..
            }
        ));
        assert_eq!(events[2], SessionEvent::WaypointRemoved { index: 0 });
        assert_eq!(events[3], SessionEvent::Error(ErrorKind::EmptyPathSave));
    }
}
