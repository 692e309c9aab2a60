//! Navigation: lay out a fetched route and detect arrival.

pub mod arrival;
pub mod session;
pub mod state;

pub use arrival::{
    ArrivalMonitor, ArrivalOutcome, IntervalTicker, ManualTicker, PoseSource, StopHandle, Ticker,
};
pub use session::{DEFAULT_ARRIVAL_THRESHOLD, NavigationSession, RouteRequest};
pub use state::NavigationState;
