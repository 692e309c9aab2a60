//! Rerun-based visualization of laid-out paths.
//!
//! Entity hierarchy:
//!     status               - Session state and distance to target
//!     world/
//!         anchor           - Locked world origin (marker pose)
//!         camera           - Live camera position
//!         trail            - Camera positions seen so far (gray, thin)
//!         path/nodes       - Waypoint nodes, colored by kind
//!         path/edges       - Segments between consecutive nodes
//!         path/arrows      - Direction arrows above each edge
//!
//! Everything is logged in the viewer's right-forward-up frame; scene
//! coordinates are converted on the way in.

use anyhow::{Context, Result};
use nalgebra::Vector3;
use rerun::{RecordingStream, external::glam};

use crate::anchor::AnchorTransform;
use crate::geometry::frames::{scene_pose_to_viz, scene_position_to_viz};
use crate::layout::RenderSet;
use crate::model::WaypointKind;

/// Length of logged arrows, in scene units.
const ARROW_LENGTH: f64 = 0.3;

pub struct RerunVisualizer {
    rec: RecordingStream,
    start_timestamp_ms: Option<u64>,
}

impl RerunVisualizer {
    pub fn new(app_name: &str) -> Result<Self> {
        // Runs rerun viewer in a separate process
        let rec = rerun::RecordingStreamBuilder::new(app_name)
            .spawn()
            .context("Failed to spawn rerun viewer")?;

        rec.log_static("world", &rerun::ViewCoordinates::RFU()).ok();

        Ok(Self {
            rec,
            start_timestamp_ms: None,
        })
    }

    /// Set the current timestamp for all subsequent logs (relative to the first call).
    pub fn set_time(&mut self, timestamp_ms: u64) {
        let start_ms = *self.start_timestamp_ms.get_or_insert(timestamp_ms);
        let relative_sec = timestamp_ms.saturating_sub(start_ms) as f64 / 1e3;
        self.rec.set_duration_secs("time", relative_sec);
    }

    pub fn log_status(&self, text: &str) {
        self.rec
            .log(
                "status",
                &rerun::TextDocument::new(text).with_media_type(rerun::MediaType::markdown()),
            )
            .ok();
    }

    /// Log the locked origin as a transform.
    pub fn log_anchor(&self, anchor: &AnchorTransform) {
        let pose = scene_pose_to_viz(anchor.pose());
        let t = &pose.translation;
        let q = &pose.rotation;
        let translation = glam::Vec3::new(t.x as f32, t.y as f32, t.z as f32);
        let rotation = glam::Quat::from_xyzw(
            q.coords.x as f32,
            q.coords.y as f32,
            q.coords.z as f32,
            q.w as f32,
        );
        self.rec
            .log(
                "world/anchor",
                &rerun::Transform3D::from_translation_rotation(translation, rotation),
            )
            .ok();
    }

    pub fn log_camera(&self, position: &Vector3<f64>) {
        self.rec
            .log(
                "world/camera",
                &rerun::Points3D::new([to_f32(&scene_position_to_viz(position))])
                    .with_colors([[255u8, 255, 255]])
                    .with_radii([0.05f32]),
            )
            .ok();
    }

    /// Log the camera trail as a thin gray line.
    pub fn log_trail(&self, positions: &[Vector3<f64>]) {
        if positions.len() < 2 {
            return;
        }
        let pts: Vec<[f32; 3]> = positions
            .iter()
            .map(|p| to_f32(&scene_position_to_viz(p)))
            .collect();
        self.rec
            .log(
                "world/trail",
                &rerun::LineStrips3D::new([pts])
                    .with_colors([[128u8, 128, 128]])
                    .with_radii([0.005f32]),
            )
            .ok();
    }

    /// Replace the logged path with `set`.
    pub fn log_render_set(&self, set: &RenderSet) {
        self.clear_path();
        if set.is_empty() {
            return;
        }

        let nodes: Vec<[f32; 3]> = set
            .nodes
            .iter()
            .map(|n| to_f32(&scene_position_to_viz(n.position())))
            .collect();
        let colors: Vec<[u8; 3]> = set.nodes.iter().map(|n| kind_color(n.kind)).collect();
        let labels: Vec<String> = set
            .nodes
            .iter()
            .map(|n| format!("{} {}", n.index, n.kind))
            .collect();
        self.rec
            .log(
                "world/path/nodes",
                &rerun::Points3D::new(nodes)
                    .with_colors(colors)
                    .with_labels(labels)
                    .with_radii([0.08f32]),
            )
            .ok();

        if !set.edges.is_empty() {
            let strips: Vec<Vec<[f32; 3]>> = set
                .edges
                .iter()
                .map(|e| {
                    vec![
                        to_f32(&scene_position_to_viz(&e.start)),
                        to_f32(&scene_position_to_viz(&e.end)),
                    ]
                })
                .collect();
            self.rec
                .log(
                    "world/path/edges",
                    &rerun::LineStrips3D::new(strips)
                        .with_colors([[0u8, 160, 255]])
                        .with_radii([0.02f32]),
                )
                .ok();
        }

        if !set.arrows.is_empty() {
            let origins: Vec<[f32; 3]> = set
                .arrows
                .iter()
                .map(|a| to_f32(&scene_position_to_viz(a.position())))
                .collect();
            let vectors: Vec<[f32; 3]> = set
                .arrows
                .iter()
                .map(|a| to_f32(&scene_position_to_viz(&(a.direction * ARROW_LENGTH))))
                .collect();
            self.rec
                .log(
                    "world/path/arrows",
                    &rerun::Arrows3D::from_vectors(vectors)
                        .with_origins(origins)
                        .with_colors([[255u8, 200, 0]]),
                )
                .ok();
        }
    }

    pub fn clear_path(&self) {
        self.rec
            .log("world/path", &rerun::Clear::recursive())
            .ok();
    }
}

fn to_f32(p: &Vector3<f64>) -> [f32; 3] {
    [p.x as f32, p.y as f32, p.z as f32]
}

fn kind_color(kind: WaypointKind) -> [u8; 3] {
    match kind {
        WaypointKind::Start => [0, 255, 0],
        WaypointKind::Intermediate => [255, 255, 0],
        WaypointKind::Destination => [255, 0, 0],
    }
}
