//! World-origin lock for the active session.
//!
//! The first marker scanned in a session becomes the coordinate origin for
//! the rest of that session. Later scans never move it; only a session
//! reset releases the lock.

use tracing::debug;

use super::transform::AnchorTransform;

/// Tracks which scanned marker is the authoritative origin.
#[derive(Debug, Clone, Default)]
pub struct AnchorRegistry {
    origin: Option<LockedOrigin>,
}

#[derive(Debug, Clone)]
struct LockedOrigin {
    transform: AnchorTransform,
    beacon_name: Option<String>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the world origin to `transform`.
    ///
    /// Returns `true` only for the call that took the lock; once locked,
    /// further calls are ignored until [`reset`](Self::reset).
    pub fn lock_origin(&mut self, transform: AnchorTransform) -> bool {
        self.lock_origin_named(transform, None)
    }

    /// Lock the world origin and remember which beacon produced it.
    pub fn lock_origin_named(
        &mut self,
        transform: AnchorTransform,
        beacon_name: Option<String>,
    ) -> bool {
        if self.origin.is_some() {
            debug!("origin already locked, ignoring rescan");
            return false;
        }
        debug!(
            beacon = beacon_name.as_deref().unwrap_or("<unnamed>"),
            "world origin locked"
        );
        self.origin = Some(LockedOrigin {
            transform,
            beacon_name,
        });
        true
    }

    pub fn is_locked(&self) -> bool {
        self.origin.is_some()
    }

    pub fn current_origin(&self) -> Option<&AnchorTransform> {
        self.origin.as_ref().map(|o| &o.transform)
    }

    /// Beacon name recorded with the lock, if one was given.
    pub fn beacon_name(&self) -> Option<&str> {
        self.origin.as_ref().and_then(|o| o.beacon_name.as_deref())
    }

    /// Release the lock (session reset).
    pub fn reset(&mut self) {
        self.origin = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SE3;
    use nalgebra::Vector3;

    fn anchor_at(x: f64) -> AnchorTransform {
        AnchorTransform::from_pose(SE3::from_translation(Vector3::new(x, 0.0, 0.0)))
    }

    #[test]
    fn test_lock_is_idempotent() {
        let mut registry = AnchorRegistry::new();
        assert!(!registry.is_locked());
        assert!(registry.current_origin().is_none());

        assert!(registry.lock_origin(anchor_at(1.0)));
        assert!(!registry.lock_origin(anchor_at(2.0)));

        assert!(registry.is_locked());
        assert_eq!(registry.current_origin(), Some(&anchor_at(1.0)));
    }

    #[test]
    fn test_reset_releases_lock() {
        let mut registry = AnchorRegistry::new();
        registry.lock_origin_named(anchor_at(1.0), Some("pi".to_string()));
        assert_eq!(registry.beacon_name(), Some("pi"));

        registry.reset();
        assert!(!registry.is_locked());
        assert!(registry.beacon_name().is_none());

        assert!(registry.lock_origin(anchor_at(3.0)));
        assert_eq!(registry.current_origin(), Some(&anchor_at(3.0)));
    }
}
