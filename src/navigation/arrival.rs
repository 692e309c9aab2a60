//! Arrival polling loop.
//!
//! A background thread samples the live camera position on a fixed interval
//! and asks the shared [`NavigationSession`] whether the user has arrived.
//! Every check runs under the session mutex, so an arrival check never
//! interleaves with `cancel()` from the UI side.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use nalgebra::Vector3;
use parking_lot::Mutex;
use tracing::debug;

use super::session::NavigationSession;
use super::state::NavigationState;

/// Live camera position provider (the render subsystem).
pub trait PoseSource: Send + Sync {
    /// Latest camera position in scene coordinates, if tracking has one.
    fn camera_position(&self) -> Option<Vector3<f64>>;
}

/// Paces the polling loop.
pub trait Ticker: Send {
    /// Block until the next sample is due. Returns `false` once stopped.
    fn wait(&mut self) -> bool;
}

/// Stops an [`IntervalTicker`]. Dropping every handle also stops it.
#[derive(Debug, Clone)]
pub struct StopHandle {
    sender: Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.sender.try_send(());
    }
}

/// Wall-clock ticker. Waiting on the stop channel doubles as the sleep, so a
/// stop request wakes the loop immediately rather than after the interval.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Duration,
    stop: Receiver<()>,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> (Self, StopHandle) {
        let (sender, stop) = bounded(1);
        (Self { interval, stop }, StopHandle { sender })
    }
}

impl Ticker for IntervalTicker {
    fn wait(&mut self) -> bool {
        match self.stop.recv_timeout(self.interval) {
            Err(RecvTimeoutError::Timeout) => true,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

/// Ticker driven by hand: one message on the paired sender is one tick, and
/// dropping the sender stops the loop.
#[derive(Debug)]
pub struct ManualTicker {
    ticks: Receiver<()>,
}

impl ManualTicker {
    pub fn new() -> (Self, Sender<()>) {
        let (sender, ticks) = unbounded();
        (Self { ticks }, sender)
    }
}

impl Ticker for ManualTicker {
    fn wait(&mut self) -> bool {
        self.ticks.recv().is_ok()
    }
}

/// How a polling loop ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrivalOutcome {
    /// This loop observed arrival on its `samples`-th check.
    Arrived { distance: f64, samples: usize },
    /// The session left `Walking` without this loop observing arrival.
    Cancelled,
    /// The ticker was stopped.
    Stopped,
}

/// Polls a navigation session for arrival.
pub struct ArrivalMonitor<T: Ticker> {
    session: Arc<Mutex<NavigationSession>>,
    poses: Arc<dyn PoseSource>,
    ticker: T,
}

impl<T: Ticker> ArrivalMonitor<T> {
    pub fn new(
        session: Arc<Mutex<NavigationSession>>,
        poses: Arc<dyn PoseSource>,
        ticker: T,
    ) -> Self {
        Self {
            session,
            poses,
            ticker,
        }
    }

    /// Run until arrival, cancellation or stop.
    pub fn run(mut self) -> ArrivalOutcome {
        let mut samples = 0;
        loop {
            if !self.ticker.wait() {
                debug!(samples, "arrival monitor stopped");
                return ArrivalOutcome::Stopped;
            }

            let mut session = self.session.lock();
            if session.state() != NavigationState::Walking {
                debug!(state = ?session.state(), "arrival monitor interrupted");
                return ArrivalOutcome::Cancelled;
            }

            let Some(camera) = self.poses.camera_position() else {
                continue;
            };
            samples += 1;
            if session.check_arrival(&camera) {
                let distance = session.distance_to_target(&camera).unwrap_or_default();
                return ArrivalOutcome::Arrived { distance, samples };
            }
        }
    }
}

impl<T: Ticker + 'static> ArrivalMonitor<T> {
    /// Run the loop on its own thread.
    pub fn spawn(self) -> JoinHandle<ArrivalOutcome> {
        thread::spawn(move || self.run())
    }
}
