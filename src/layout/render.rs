//! Ephemeral scene objects derived from a path.
//!
//! These are rebuilt from scratch whenever a path is (re)laid out and are
//! owned by the session that built them. Nothing here is persisted.

use nalgebra::Vector3;

use crate::geometry::SE3;
use crate::model::WaypointKind;

/// Absolute placement of one waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    /// Index of the waypoint this node was placed for.
    pub index: usize,
    pub kind: WaypointKind,
    /// Absolute pose: anchor composed with every offset up to this waypoint.
    pub pose: SE3,
}

impl RenderNode {
    pub fn position(&self) -> &Vector3<f64> {
        &self.pose.translation
    }
}

/// Line segment between two consecutive nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderEdge {
    pub from: usize,
    pub to: usize,
    pub start: Vector3<f64>,
    pub end: Vector3<f64>,
}

impl RenderEdge {
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn midpoint(&self) -> Vector3<f64> {
        (self.start + self.end) * 0.5
    }
}

/// Direction marker raised above an edge, pointing from `from` towards `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderArrow {
    pub from: usize,
    pub to: usize,
    /// Arrow pose; its local -Z axis faces the later node.
    pub pose: SE3,
    /// Unit vector from the arrow towards the later node (zero if they coincide).
    pub direction: Vector3<f64>,
}

impl RenderArrow {
    pub fn position(&self) -> &Vector3<f64> {
        &self.pose.translation
    }
}

/// Everything rendered for one path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSet {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub arrows: Vec<RenderArrow>,
}

impl RenderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn last_node(&self) -> Option<&RenderNode> {
        self.nodes.last()
    }

    /// Remove the most recent node together with its incoming edge and any
    /// arrow touching it.
    pub fn pop_node(&mut self) -> Option<RenderNode> {
        let node = self.nodes.pop()?;
        self.edges.retain(|e| e.to != node.index && e.from != node.index);
        self.arrows.retain(|a| a.to != node.index && a.from != node.index);
        Some(node)
    }

    /// Drop every scene object.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.arrows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(index: usize, x: f64) -> RenderNode {
        RenderNode {
            index,
            kind: WaypointKind::Intermediate,
            pose: SE3::from_translation(Vector3::new(x, 0.0, 0.0)),
        }
    }

    #[test]
    fn test_pop_node_removes_incoming_edge() {
        let mut set = RenderSet::new();
        set.nodes.push(node(0, 0.0));
        set.nodes.push(node(1, 2.0));
        set.edges.push(RenderEdge {
            from: 0,
            to: 1,
            start: Vector3::zeros(),
            end: Vector3::new(2.0, 0.0, 0.0),
        });

        let popped = set.pop_node().unwrap();
        assert_eq!(popped.index, 1);
        assert_eq!(set.nodes.len(), 1);
        assert!(set.edges.is_empty());
    }

    #[test]
    fn test_edge_geometry() {
        let edge = RenderEdge {
            from: 0,
            to: 1,
            start: Vector3::new(0.0, 0.0, 0.0),
            end: Vector3::new(0.0, 3.0, 4.0),
        };
        assert_eq!(edge.length(), 5.0);
        assert_eq!(edge.midpoint(), Vector3::new(0.0, 1.5, 2.0));
    }
}
