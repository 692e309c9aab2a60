use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};

use indoor_nav::anchor::AnchorTransform;
use indoor_nav::authoring::AuthoringState;
use indoor_nav::config::NavConfig;
use indoor_nav::geometry::SE3;
use indoor_nav::io::{WalkEvent, WalkLog};
use indoor_nav::navigation::{ArrivalOutcome, RouteRequest};
use indoor_nav::relay::HttpRelay;
use indoor_nav::store::MapStore;
use indoor_nav::system::{NavSystem, SessionEvent};
#[cfg(feature = "viz")]
use indoor_nav::viz::RerunVisualizer;

const USAGE: &str = "\
usage: indoor-nav author   <walk.csv> <destination> [config.yaml]
       indoor-nav navigate <walk.csv> <destination> [config.yaml]
       indoor-nav list     [config.yaml]
       indoor-nav download <uid> <map_name> [config.yaml]
       indoor-nav upload   <uid> <destination> [config.yaml]";

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match (args.first().map(String::as_str), args.len()) {
        (Some("author"), 3 | 4) => run_author(&args[1], &args[2], load_config(args.get(3))?),
        (Some("navigate"), 3 | 4) => run_navigate(&args[1], &args[2], load_config(args.get(3))?),
        (Some("list"), 1 | 2) => run_list(load_config(args.get(1))?),
        (Some("download"), 3 | 4) => run_download(&args[1], &args[2], load_config(args.get(3))?),
        (Some("upload"), 3 | 4) => run_upload(&args[1], &args[2], load_config(args.get(3))?),
        _ => bail!("{USAGE}"),
    }
}

fn load_config(path: Option<&String>) -> Result<NavConfig> {
    match path {
        Some(path) => NavConfig::from_yaml_file(path),
        None => Ok(NavConfig::default()),
    }
}

/// Markers in walk logs carry a position only; orientation is taken as level.
fn anchor_at(position: &nalgebra::Vector3<f64>) -> AnchorTransform {
    AnchorTransform::from_pose(SE3::from_translation(*position))
}

fn run_author(walk_path: &str, destination: &str, config: NavConfig) -> Result<()> {
    let log = WalkLog::load(walk_path)?;
    println!(
        "Loaded {} walk events spanning {:.1} s",
        log.len(),
        log.span_ms() as f64 / 1e3
    );

    let mut system = NavSystem::new(config)?;
    #[cfg(feature = "viz")]
    let mut viz = RerunVisualizer::new("indoor-nav-author")?;

    let session = system.start_authoring()?;
    for entry in &log.entries {
        let result = match &entry.event {
            WalkEvent::Anchor { position, marker } => {
                session.on_anchor_scanned(anchor_at(position), marker.clone())
            }
            WalkEvent::Camera(_) => Ok(()),
            WalkEvent::Add(p) if session.state() == AuthoringState::AwaitingStart => {
                session.add_start(*p)
            }
            WalkEvent::Add(p) => session.add_intermediate(*p),
            WalkEvent::End(p) => session.end(*p),
            WalkEvent::Undo => session.undo(),
        };
        if let Err(e) = result {
            warn!(timestamp_ms = entry.timestamp_ms, error = %e, "walk event rejected");
        }

        #[cfg(feature = "viz")]
        {
            viz.set_time(entry.timestamp_ms);
            if let Some(p) = entry.event.camera() {
                viz.log_camera(p);
            }
            if let Some(anchor) = session.anchor() {
                viz.log_anchor(anchor);
            }
            viz.log_render_set(session.render());
            viz.log_status(&format!(
                "**{:?}** | waypoints: {}",
                session.state(),
                session.waypoints().len()
            ));
        }
    }

    let path = system.save_authored(destination)?;
    println!(
        "Saved `{}` anchored to `{}` with {} waypoints to {}",
        path.destination(),
        path.beacon_name(),
        path.len(),
        system.config().store_path.display()
    );
    Ok(())
}

fn run_navigate(walk_path: &str, destination: &str, config: NavConfig) -> Result<()> {
    let log = WalkLog::load(walk_path)?;
    let poll_interval = config.arrival.poll_interval();

    let mut system = NavSystem::new(config)?;
    let events = system.events();
    #[cfg(feature = "viz")]
    let mut viz = RerunVisualizer::new("indoor-nav-navigate")?;
    #[cfg(feature = "viz")]
    let mut trail = Vec::new();

    system.start_navigation(RouteRequest::new(destination))?;

    let mut arrived = false;
    let mut last_ts = None;
    for entry in &log.entries {
        // Replay at recorded pace so the arrival monitor sees each position.
        if let Some(prev) = last_ts {
            thread::sleep(Duration::from_millis(entry.timestamp_ms.saturating_sub(prev)));
        }
        last_ts = Some(entry.timestamp_ms);

        match &entry.event {
            WalkEvent::Anchor { position, marker } => {
                if let Err(e) = system.on_navigation_anchor_local(anchor_at(position), marker) {
                    warn!(timestamp_ms = entry.timestamp_ms, error = %e, "scan rejected");
                }
            }
            event => {
                if let Some(p) = event.camera() {
                    system.update_camera(*p);
                }
            }
        }

        #[cfg(feature = "viz")]
        {
            viz.set_time(entry.timestamp_ms);
            if let Some(p) = entry.event.camera() {
                trail.push(*p);
                viz.log_camera(p);
                viz.log_trail(&trail);
            }
            if let Some(session) = system.navigation() {
                let session = session.lock();
                if let Some(anchor) = session.anchor() {
                    viz.log_anchor(anchor);
                }
                viz.log_render_set(session.render());
            }
        }

        arrived |= drain_events(&events);
        if arrived {
            break;
        }
    }

    if !arrived {
        // Give the monitor one more tick on the final position.
        thread::sleep(poll_interval);
        arrived = drain_events(&events);
    }
    match system.stop_monitor() {
        Some(ArrivalOutcome::Arrived { distance, samples }) => {
            println!("Arrived at `{destination}` ({distance:.2} from target after {samples} samples)")
        }
        _ if arrived => println!("Arrived at `{destination}`"),
        _ => println!("Walk ended before reaching `{destination}`"),
    }
    system.finish();
    Ok(())
}

/// Log pending session events; returns `true` if one of them was an arrival.
fn drain_events(events: &crossbeam_channel::Receiver<SessionEvent>) -> bool {
    let mut arrived = false;
    for event in events.try_iter() {
        match &event {
            SessionEvent::Arrived { .. } => arrived = true,
            SessionEvent::Error(kind) => warn!(?kind, "session error"),
            _ => {}
        }
        info!(?event, "session event");
    }
    arrived
}

fn run_list(config: NavConfig) -> Result<()> {
    let store = MapStore::open(&config.store_path)?;
    if store.is_empty() {
        println!("No maps in {}", config.store_path.display());
    }
    for path in store.list() {
        println!(
            "{:<24} beacon={:<12} waypoints={}",
            path.destination(),
            path.beacon_name(),
            path.len()
        );
    }
    Ok(())
}

fn run_download(uid: &str, map_name: &str, config: NavConfig) -> Result<()> {
    let relay = HttpRelay::new(&config.relay)?;
    let mut system = NavSystem::new(config)?;
    let path = system.download_map(&relay, uid, map_name)?;
    println!("Downloaded `{}` ({} waypoints)", path.destination(), path.len());
    Ok(())
}

fn run_upload(uid: &str, destination: &str, config: NavConfig) -> Result<()> {
    let relay = HttpRelay::new(&config.relay)?;
    let system = NavSystem::new(config)?;
    let reply = system.upload_map(&relay, uid, destination)?;
    println!("{reply}");
    Ok(())
}
