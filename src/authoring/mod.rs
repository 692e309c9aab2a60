//! Map authoring: record a new path by walking it.

pub mod session;
pub mod state;

pub use session::MapAuthoringSession;
pub use state::AuthoringState;
