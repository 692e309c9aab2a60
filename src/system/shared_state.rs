//! State shared between the input thread and the arrival monitor.
//!
//! The input side writes the latest camera position as frames arrive; the
//! arrival monitor reads it on every tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nalgebra::Vector3;
use parking_lot::RwLock;

use crate::navigation::PoseSource;

pub struct SharedState {
    /// Latest camera position in scene coordinates.
    /// Protected by RwLock: input writes, the monitor reads.
    camera_position: RwLock<Option<Vector3<f64>>>,

    /// Set while an arrival monitor is running.
    monitoring: AtomicBool,
}

impl SharedState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record the latest camera position.
    pub fn set_camera_position(&self, position: Vector3<f64>) {
        *self.camera_position.write() = Some(position);
    }

    /// Forget the camera position (tracking lost or session reset).
    pub fn clear_camera_position(&self) {
        *self.camera_position.write() = None;
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::SeqCst)
    }

    pub fn set_monitoring(&self, value: bool) {
        self.monitoring.store(value, Ordering::SeqCst);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            camera_position: RwLock::new(None),
            monitoring: AtomicBool::new(false),
        }
    }
}

impl PoseSource for SharedState {
    fn camera_position(&self) -> Option<Vector3<f64>> {
        *self.camera_position.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_position_roundtrip() {
        let shared = SharedState::new();
        assert!(shared.camera_position().is_none());

        shared.set_camera_position(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(shared.camera_position(), Some(Vector3::new(1.0, 2.0, 3.0)));

        shared.clear_camera_position();
        assert!(shared.camera_position().is_none());
    }
}
