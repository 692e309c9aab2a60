//! Error types for navigation and authoring operations.
//!
//! [`NavError`] is value-returned from every session operation. None of its
//! variants is fatal: resetting the active session always recovers.

/// Errors raised by the navigation engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum NavError {
    /// An authoring or navigation action was invoked outside its valid state.
    ///
    /// The session is left untouched.
    #[error("`{action}` is not valid while {state}")]
    InvalidStateTransition {
        /// The rejected action.
        action: &'static str,
        /// Debug rendering of the state the session was in.
        state: String,
    },

    /// The scanned marker does not match the beacon the route is anchored to.
    #[error("scanned beacon `{scanned}` does not match expected beacon `{expected}`")]
    WrongBeacon {
        /// Beacon recorded for the destination.
        expected: String,
        /// Beacon that was actually scanned.
        scanned: String,
    },

    /// The route source could not supply a waypoint list.
    #[error("route unavailable: {0}")]
    RouteUnavailable(String),

    /// A decoded path violates the wire contract and was rejected wholesale.
    #[error("malformed path: {0}")]
    MalformedPath(String),

    /// A path with fewer than two waypoints cannot be saved.
    #[error("cannot save a path with {waypoints} waypoint(s), need at least 2")]
    EmptyPathSave {
        /// Number of waypoints in the rejected path.
        waypoints: usize,
    },
}

impl NavError {
    /// Build an `InvalidStateTransition` from any debuggable state.
    pub fn invalid_transition(action: &'static str, state: impl std::fmt::Debug) -> Self {
        Self::InvalidStateTransition {
            action,
            state: format!("{state:?}"),
        }
    }

    /// Payload-free classification, carried by session events.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            Self::WrongBeacon { .. } => ErrorKind::WrongBeacon,
            Self::RouteUnavailable(_) => ErrorKind::RouteUnavailable,
            Self::MalformedPath(_) => ErrorKind::MalformedPath,
            Self::EmptyPathSave { .. } => ErrorKind::EmptyPathSave,
        }
    }
}

/// Classification of a [`NavError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidStateTransition,
    WrongBeacon,
    RouteUnavailable,
    MalformedPath,
    EmptyPathSave,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_mention_details() {
        let err = NavError::WrongBeacon {
            expected: "pi".to_string(),
            scanned: "1".to_string(),
        };
        assert!(err.to_string().contains("`1`"));
        assert_eq!(err.kind(), ErrorKind::WrongBeacon);

        let err = NavError::EmptyPathSave { waypoints: 1 };
        assert!(err.to_string().contains("1 waypoint"));
    }

    #[test]
    fn test_invalid_transition_renders_state() {
        #[derive(Debug)]
        enum Dummy {
            Ended,
        }
        let err = NavError::invalid_transition("undo", Dummy::Ended);
        assert_eq!(
            err,
            NavError::InvalidStateTransition {
                action: "undo",
                state: "Ended".to_string()
            }
        );
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
    }
}
