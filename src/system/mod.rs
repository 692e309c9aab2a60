//! Session coordination.
//!
//! This module contains the top-level `NavSystem` that owns the active
//! session and the arrival monitor thread, along with the shared camera
//! state and the session event types.

pub mod messages;
pub mod nav_system;
pub mod shared_state;

pub use messages::SessionEvent;
pub use nav_system::{NavSystem, SessionMode};
pub use shared_state::SharedState;
