//! Authoring state machine states.

/// State of a map-authoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthoringState {
    /// Waiting for the first marker scan to fix the origin.
    AwaitingAnchor,
    /// Origin locked; the next tap places the start waypoint.
    AwaitingStart,
    /// Start placed; taps add intermediates or end the path.
    Building,
    /// Destination placed; the path can be saved or undone.
    Ended,
}

impl Default for AuthoringState {
    fn default() -> Self {
        Self::AwaitingAnchor
    }
}
