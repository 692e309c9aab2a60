//! Runtime configuration, loaded from YAML.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Arrival polling parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArrivalConfig {
    /// Interval between camera samples, in milliseconds.
    pub poll_interval_ms: u64,
    /// Distance (scene units) at or below which the user has arrived.
    pub threshold: f64,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            threshold: 1.5,
        }
    }
}

impl ArrivalConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of direction arrows above the node they start from.
    pub arrow_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { arrow_height: 0.1 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub arrival: ArrivalConfig,
    pub layout: LayoutConfig,
    pub relay: RelayConfig,
    /// JSON file backing the local map store.
    pub store_path: PathBuf,
    /// Capacity of the bounded session event channel.
    pub event_channel_capacity: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            arrival: ArrivalConfig::default(),
            layout: LayoutConfig::default(),
            relay: RelayConfig::default(),
            store_path: PathBuf::from("maps.json"),
            event_channel_capacity: 64,
        }
    }
}

impl NavConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let config: Self = serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime cannot work with.
    ///
    /// A zero-capacity event channel would drop every event, and a zero poll
    /// interval would spin the arrival monitor.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.event_channel_capacity > 0,
            "event_channel_capacity must be at least 1"
        );
        ensure!(
            self.arrival.poll_interval_ms > 0,
            "arrival.poll_interval_ms must be at least 1"
        );
        ensure!(
            self.arrival.threshold.is_finite() && self.arrival.threshold >= 0.0,
            "arrival.threshold must be a non-negative distance, got {}",
            self.arrival.threshold
        );
        Ok(())
    }
}
