//! PathBuilder: lay out a waypoint chain rooted at a marker anchor.
//!
//! Placement is a chain. Each node is `previous * translation(offset)`, so an
//! offset is read in the previous node's local frame. Any error in one offset
//! carries into every later node, which means long paths accumulate drift.
//! That matches how recorded paths were authored and is kept as-is.
//!
//! Arrows are raised along the node's local -Z axis. For a wall-mounted marker
//! that axis points up the wall (towards the top edge of the marker image).

use nalgebra::Vector3;
use tracing::debug;

use crate::anchor::AnchorTransform;
use crate::geometry::{SE3, look_rotation};
use crate::model::Waypoint;

use super::render::{RenderArrow, RenderEdge, RenderNode, RenderSet};

/// Default height of direction arrows above their node.
pub const DEFAULT_ARROW_HEIGHT: f64 = 0.1;

/// Converts `(anchor, waypoints)` into render objects.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    arrow_height: f64,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self {
            arrow_height: DEFAULT_ARROW_HEIGHT,
        }
    }
}

impl PathBuilder {
    pub fn new(arrow_height: f64) -> Self {
        Self { arrow_height }
    }

    pub fn arrow_height(&self) -> f64 {
        self.arrow_height
    }

    /// Lay out a full path: `n` nodes, `n - 1` edges, `n - 1` arrows.
    ///
    /// The input waypoints are only read.
    pub fn layout(&self, anchor: &AnchorTransform, waypoints: &[Waypoint]) -> RenderSet {
        let mut set = RenderSet::new();
        for wp in waypoints {
            self.place_next(&mut set, anchor, wp);
        }
        self.place_arrows(&mut set);

        debug!(
            nodes = set.nodes.len(),
            edges = set.edges.len(),
            arrows = set.arrows.len(),
            "path laid out"
        );
        set
    }

    /// Append one waypoint to a partially built set.
    ///
    /// The new node is composed onto the last placed node (the anchor when the
    /// set is empty) and joined to it by an edge.
    pub fn place_next(
        &self,
        set: &mut RenderSet,
        anchor: &AnchorTransform,
        waypoint: &Waypoint,
    ) -> SE3 {
        let last_placed = set
            .last_node()
            .map(|n| n.pose.clone())
            .unwrap_or_else(|| anchor.pose().clone());
        let absolute = last_placed.translated_local(waypoint.offset());

        let index = set.nodes.len();
        if let Some(prev) = set.last_node() {
            set.edges.push(RenderEdge {
                from: prev.index,
                to: index,
                start: prev.pose.translation,
                end: absolute.translation,
            });
        }
        set.nodes.push(RenderNode {
            index,
            kind: waypoint.kind(),
            pose: absolute.clone(),
        });
        absolute
    }

    /// Rebuild the arrow list for the current nodes.
    pub fn place_arrows(&self, set: &mut RenderSet) {
        let raise = Vector3::new(0.0, 0.0, -self.arrow_height);
        let arrows = set
            .nodes
            .windows(2)
            .map(|pair| {
                let (earlier, later) = (&pair[0], &pair[1]);
                let raised = earlier.pose.translated_local(&raise);
                let to_target = later.position() - raised.translation;
                let (rotation, direction) = match look_rotation(&to_target) {
                    Some(rot) => (rot, to_target.normalize()),
                    None => (raised.rotation, Vector3::zeros()),
                };
                RenderArrow {
                    from: earlier.index,
                    to: later.index,
                    pose: SE3 {
                        rotation,
                        translation: raised.translation,
                    },
                    direction,
                }
            })
            .collect();
        set.arrows = arrows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Path, WaypointKind};
    use approx::assert_relative_eq;
    use nalgebra::{Unit, UnitQuaternion};

    fn anchor_identity() -> AnchorTransform {
        AnchorTransform::from_pose(SE3::identity())
    }

    fn square_walk() -> Vec<Waypoint> {
        Path::from_offsets(
            "Lab",
            "pi",
            &[
                Vector3::new(0.0, 0.0, -1.0),
                Vector3::new(2.0, 0.0, 0.0),
                Vector3::new(0.0, 0.0, -2.0),
                Vector3::new(-2.0, 0.0, 0.0),
            ],
        )
        .unwrap()
        .waypoints()
        .to_vec()
    }

    #[test]
    fn test_counts() {
        let builder = PathBuilder::default();
        for n in 1..6 {
            let wps: Vec<Waypoint> = square_walk().into_iter().cycle().take(n).collect();
            let set = builder.layout(&anchor_identity(), &wps);
            assert_eq!(set.nodes.len(), n);
            assert_eq!(set.edges.len(), n - 1);
            assert_eq!(set.arrows.len(), n - 1);
        }
    }

    #[test]
    fn test_single_waypoint_has_no_edges() {
        let builder = PathBuilder::default();
        let wps = vec![Waypoint::start(Vector3::new(0.0, 0.0, -1.0))];
        let set = builder.layout(&anchor_identity(), &wps);
        assert_eq!(set.nodes.len(), 1);
        assert!(set.edges.is_empty());
        assert!(set.arrows.is_empty());
    }

    #[test]
    fn test_positions_accumulate_offsets() {
        let anchor = AnchorTransform::from_pose(SE3::from_translation(Vector3::new(1.0, 1.0, 0.0)));
        let set = PathBuilder::default().layout(&anchor, &square_walk());

        let expected = [
            Vector3::new(1.0, 1.0, -1.0),
            Vector3::new(3.0, 1.0, -1.0),
            Vector3::new(3.0, 1.0, -3.0),
            Vector3::new(1.0, 1.0, -3.0),
        ];
        for (node, want) in set.nodes.iter().zip(expected.iter()) {
            assert_relative_eq!(*node.position(), *want, epsilon = 1e-12);
        }
        assert_eq!(set.nodes[0].kind, WaypointKind::Start);
        assert_eq!(set.nodes[3].kind, WaypointKind::Destination);
    }

    #[test]
    fn test_offsets_follow_anchor_rotation() {
        // Anchor turned 90° about +Y: local +X points along world -Z.
        let anchor = AnchorTransform::from_pose(SE3 {
            rotation: UnitQuaternion::from_axis_angle(
                &Unit::new_normalize(Vector3::y()),
                std::f64::consts::FRAC_PI_2,
            ),
            translation: Vector3::zeros(),
        });
        let wps = vec![
            Waypoint::start(Vector3::new(1.0, 0.0, 0.0)),
            Waypoint::destination(Vector3::new(1.0, 0.0, 0.0)),
        ];
        let set = PathBuilder::default().layout(&anchor, &wps);

        assert_relative_eq!(*set.nodes[0].position(), Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-10);
        assert_relative_eq!(*set.nodes[1].position(), Vector3::new(0.0, 0.0, -2.0), epsilon = 1e-10);
    }

    #[test]
    fn test_edges_connect_consecutive_nodes() {
        let set = PathBuilder::default().layout(&anchor_identity(), &square_walk());
        for (i, edge) in set.edges.iter().enumerate() {
            assert_eq!(edge.from, i);
            assert_eq!(edge.to, i + 1);
            assert_eq!(edge.start, *set.nodes[i].position());
            assert_eq!(edge.end, *set.nodes[i + 1].position());
        }
    }

    #[test]
    fn test_arrows_raised_and_facing_next_node() {
        let builder = PathBuilder::new(0.25);
        let set = builder.layout(&anchor_identity(), &square_walk());

        for arrow in &set.arrows {
            let earlier = set.nodes[arrow.from].position();
            let later = set.nodes[arrow.to].position();
            assert_relative_eq!(
                *arrow.position(),
                earlier + Vector3::new(0.0, 0.0, -0.25),
                epsilon = 1e-12
            );

            let facing = arrow.pose.rotation * -Vector3::z();
            let expected = (later - arrow.position()).normalize();
            assert_relative_eq!(facing, expected, epsilon = 1e-10);
            assert_relative_eq!(arrow.direction, expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_layout_does_not_touch_input() {
        let wps = square_walk();
        let before = wps.clone();
        let _ = PathBuilder::default().layout(&anchor_identity(), &wps);
        assert_eq!(wps, before);
    }
}
