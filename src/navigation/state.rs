//! Navigation state machine states.

/// State of a navigation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    /// Waiting for the destination's marker to be scanned.
    AwaitingAnchor,
    /// Route fetched, layout in progress.
    Routing,
    /// Path on screen; arrival polling is active.
    Walking,
    /// Destination reached. Polling has stopped.
    Arrived,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::AwaitingAnchor
    }
}
