//! NavSystem: top-level coordinator.
//!
//! Owns the local map store, the shared camera state and the event channel,
//! and hosts at most one session at a time: idle, authoring or navigating.
//! While navigating it also owns the arrival monitor thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, bounded};
use nalgebra::Vector3;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::anchor::AnchorTransform;
use crate::authoring::MapAuthoringSession;
use crate::config::NavConfig;
use crate::error::NavError;
use crate::layout::PathBuilder;
use crate::model::Path;
use crate::navigation::{
    ArrivalMonitor, ArrivalOutcome, IntervalTicker, NavigationSession, RouteRequest, StopHandle,
};
use crate::store::{MapRepository, MapStore, RouteSource};

use super::messages::SessionEvent;
use super::shared_state::SharedState;

/// Which kind of session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Idle,
    Authoring,
    Navigating,
}

enum ActiveSession {
    Idle,
    Authoring(MapAuthoringSession),
    Navigating(Navigation),
}

impl ActiveSession {
    fn mode(&self) -> SessionMode {
        match self {
            Self::Idle => SessionMode::Idle,
            Self::Authoring(_) => SessionMode::Authoring,
            Self::Navigating(_) => SessionMode::Navigating,
        }
    }
}

struct Navigation {
    session: Arc<Mutex<NavigationSession>>,
    monitor: Option<RunningMonitor>,
}

struct RunningMonitor {
    stop: StopHandle,
    handle: JoinHandle<ArrivalOutcome>,
}

impl RunningMonitor {
    fn finish(self) -> Option<ArrivalOutcome> {
        self.stop.stop();
        match self.handle.join() {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                warn!("arrival monitor thread panicked");
                None
            }
        }
    }
}

pub struct NavSystem {
    config: NavConfig,

    /// Camera position shared with the arrival monitor.
    shared: Arc<SharedState>,

    store: MapStore,

    event_sender: Sender<SessionEvent>,
    event_receiver: Receiver<SessionEvent>,

    active: ActiveSession,
}

impl NavSystem {
    /// Create a system backed by the store file named in `config`.
    pub fn new(config: NavConfig) -> Result<Self> {
        let store = MapStore::open(&config.store_path)?;
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: NavConfig, store: MapStore) -> Self {
        let (event_sender, event_receiver) = bounded(config.event_channel_capacity);
        Self {
            config,
            shared: SharedState::new(),
            store,
            event_sender,
            event_receiver,
            active: ActiveSession::Idle,
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn store(&self) -> &MapStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MapStore {
        &mut self.store
    }

    /// Subscribe to session events.
    pub fn events(&self) -> Receiver<SessionEvent> {
        self.event_receiver.clone()
    }

    pub fn shared_state(&self) -> &Arc<SharedState> {
        &self.shared
    }

    pub fn mode(&self) -> SessionMode {
        self.active.mode()
    }

    /// Feed the latest camera position from the render subsystem.
    pub fn update_camera(&self, position: Vector3<f64>) {
        self.shared.set_camera_position(position);
    }

    fn builder(&self) -> PathBuilder {
        PathBuilder::new(self.config.layout.arrow_height)
    }

    fn require_idle(&self, action: &'static str) -> Result<(), NavError> {
        match self.mode() {
            SessionMode::Idle => Ok(()),
            mode => {
                let err = NavError::invalid_transition(action, mode);
                warn!(error = %err, "session already active");
                let _ = self.event_sender.try_send(SessionEvent::Error(err.kind()));
                Err(err)
            }
        }
    }

    /// Begin authoring a new path.
    pub fn start_authoring(&mut self) -> Result<&mut MapAuthoringSession, NavError> {
        self.require_idle("start_authoring")?;
        let session = MapAuthoringSession::new(self.builder(), Some(self.event_sender.clone()));
        self.active = ActiveSession::Authoring(session);
        info!("authoring started");
        match self.active {
            ActiveSession::Authoring(ref mut session) => Ok(session),
            _ => Err(NavError::invalid_transition("start_authoring", SessionMode::Idle)),
        }
    }

    /// The active authoring session, if any.
    pub fn authoring(&mut self) -> Option<&mut MapAuthoringSession> {
        match self.active {
            ActiveSession::Authoring(ref mut session) => Some(session),
            _ => None,
        }
    }

    /// Save the authored path under `name` and persist it to the local store.
    ///
    /// The authoring session is reset only after the store has been written.
    /// If the write fails the store is rolled back and the walk is kept, so
    /// the save can be retried.
    pub fn save_authored(&mut self, name: &str) -> Result<Path> {
        let mode = self.mode();
        let ActiveSession::Authoring(ref mut session) = self.active else {
            return Err(NavError::invalid_transition("save_authored", mode).into());
        };
        let path = session.finalize(name)?;

        let previous = self.store.get(path.destination()).cloned();
        self.store.save(path.clone());
        if let Err(e) = self.store.flush() {
            match previous {
                Some(previous) => {
                    self.store.save(previous);
                }
                None => {
                    self.store.remove(path.destination());
                }
            }
            return Err(e.context(format!("Failed to persist map `{name}`")));
        }

        session.mark_saved(&path);
        Ok(path)
    }

    /// Begin navigating towards `request.destination`.
    pub fn start_navigation(&mut self, request: RouteRequest) -> Result<(), NavError> {
        self.require_idle("start_navigation")?;
        info!(destination = %request.destination, "navigation started");
        let session = NavigationSession::new(
            request,
            self.builder(),
            self.config.arrival.threshold,
            Some(self.event_sender.clone()),
        );
        self.active = ActiveSession::Navigating(Navigation {
            session: Arc::new(Mutex::new(session)),
            monitor: None,
        });
        Ok(())
    }

    /// The active navigation session, if any.
    pub fn navigation(&self) -> Option<Arc<Mutex<NavigationSession>>> {
        match self.active {
            ActiveSession::Navigating(ref nav) => Some(Arc::clone(&nav.session)),
            _ => None,
        }
    }

    /// Marker scanned while navigating: fetch the route from `source`, lay it
    /// out and start arrival polling.
    pub fn on_navigation_anchor(
        &mut self,
        anchor: AnchorTransform,
        marker_name: &str,
        source: &dyn RouteSource,
    ) -> Result<(), NavError> {
        begin_walk(
            &mut self.active,
            &self.shared,
            &self.config,
            anchor,
            marker_name,
            source,
        )
    }

    /// Same as [`on_navigation_anchor`](Self::on_navigation_anchor), routing
    /// from the local map store.
    pub fn on_navigation_anchor_local(
        &mut self,
        anchor: AnchorTransform,
        marker_name: &str,
    ) -> Result<(), NavError> {
        begin_walk(
            &mut self.active,
            &self.shared,
            &self.config,
            anchor,
            marker_name,
            &self.store,
        )
    }

    /// Cancel the current route. The session stays open, awaiting a new scan.
    pub fn cancel_navigation(&mut self) -> Result<(), NavError> {
        let mode = self.mode();
        let ActiveSession::Navigating(ref mut nav) = self.active else {
            return Err(NavError::invalid_transition("cancel_navigation", mode));
        };
        nav.session.lock().cancel()?;
        if let Some(monitor) = nav.monitor.take() {
            monitor.finish();
        }
        Ok(())
    }

    /// Stop the arrival monitor, if one is running, and report how it ended.
    pub fn stop_monitor(&mut self) -> Option<ArrivalOutcome> {
        match self.active {
            ActiveSession::Navigating(ref mut nav) => nav.monitor.take()?.finish(),
            _ => None,
        }
    }

    /// Close whatever session is active and return to idle.
    pub fn finish(&mut self) {
        match std::mem::replace(&mut self.active, ActiveSession::Idle) {
            ActiveSession::Idle => {}
            ActiveSession::Authoring(mut session) => session.reset(),
            ActiveSession::Navigating(mut nav) => {
                if let Some(monitor) = nav.monitor.take() {
                    monitor.finish();
                }
                nav.session.lock().reset();
            }
        }
        self.shared.clear_camera_position();
    }

    /// Download a map from the relay and upsert it into the local store.
    pub fn download_map(
        &mut self,
        repo: &dyn MapRepository,
        uid: &str,
        map_name: &str,
    ) -> Result<Path> {
        let path = repo.download(uid, map_name)?;
        let replaced = self.store.save(path.clone());
        self.store.flush()?;
        info!(map = map_name, replaced, "map downloaded");
        Ok(path)
    }

    /// Upload a locally stored map to the relay.
    pub fn upload_map(&self, repo: &dyn MapRepository, uid: &str, destination: &str) -> Result<String> {
        let path = self
            .store
            .get(destination)
            .with_context(|| format!("No local map named `{destination}`"))?;
        repo.upload(uid, path)
    }

    /// Shut down gracefully, joining the arrival monitor if it is running.
    pub fn shutdown(&mut self) {
        self.finish();
    }
}

impl Drop for NavSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn begin_walk(
    active: &mut ActiveSession,
    shared: &Arc<SharedState>,
    config: &NavConfig,
    anchor: AnchorTransform,
    marker_name: &str,
    source: &dyn RouteSource,
) -> Result<(), NavError> {
    let mode = active.mode();
    let ActiveSession::Navigating(nav) = active else {
        return Err(NavError::invalid_transition("on_navigation_anchor", mode));
    };
    nav.session.lock().on_anchor_scanned(anchor, marker_name, source)?;

    if let Some(stale) = nav.monitor.take() {
        stale.finish();
    }
    nav.monitor = Some(spawn_monitor(Arc::clone(&nav.session), Arc::clone(shared), config));
    Ok(())
}

fn spawn_monitor(
    session: Arc<Mutex<NavigationSession>>,
    shared: Arc<SharedState>,
    config: &NavConfig,
) -> RunningMonitor {
    let (ticker, stop) = IntervalTicker::new(config.arrival.poll_interval());
    let monitor = ArrivalMonitor::new(session, shared.clone(), ticker);
    shared.set_monitoring(true);
    let handle = thread::spawn(move || {
        let outcome = monitor.run();
        shared.set_monitoring(false);
        outcome
    });
    RunningMonitor { stop, handle }
}
