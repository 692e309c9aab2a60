//! Local map store: one JSON array of paths on disk.
//!
//! Entries are keyed by destination name; saving a path whose destination
//! already exists replaces it in place.

use std::fs;
use std::path::{Path as FsPath, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::model::Path;

use super::source::RouteSource;

#[derive(Debug, Default)]
pub struct MapStore {
    file: Option<PathBuf>,
    maps: Vec<Path>,
}

impl MapStore {
    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store backed by `file`. A missing file is an empty store.
    pub fn open(file: impl AsRef<FsPath>) -> Result<Self> {
        let file = file.as_ref().to_path_buf();
        let maps = if file.exists() {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            if text.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse {}", file.display()))?
            }
        } else {
            Vec::new()
        };
        debug!(file = %file.display(), maps = maps.len(), "map store opened");
        Ok(Self {
            file: Some(file),
            maps,
        })
    }

    pub fn list(&self) -> &[Path] {
        &self.maps
    }

    pub fn names(&self) -> Vec<String> {
        self.maps.iter().map(|p| p.destination().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn get(&self, destination: &str) -> Option<&Path> {
        self.maps.iter().find(|p| p.destination() == destination)
    }

    /// Insert or overwrite by destination. Returns `true` if an entry was replaced.
    pub fn save(&mut self, path: Path) -> bool {
        match self
            .maps
            .iter_mut()
            .find(|p| p.destination() == path.destination())
        {
            Some(existing) => {
                *existing = path;
                true
            }
            None => {
                self.maps.push(path);
                false
            }
        }
    }

    pub fn remove(&mut self, destination: &str) -> Option<Path> {
        let idx = self.maps.iter().position(|p| p.destination() == destination)?;
        Some(self.maps.remove(idx))
    }

    /// Write the store to its backing file (no-op for in-memory stores).
    ///
    /// The file is replaced atomically via a sibling temporary file.
    pub fn flush(&self) -> Result<()> {
        let Some(ref file) = self.file else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.maps)?;

        let tmp = file.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, file)
            .with_context(|| format!("Failed to replace {}", file.display()))?;

        info!(file = %file.display(), maps = self.maps.len(), "map store flushed");
        Ok(())
    }
}

impl RouteSource for MapStore {
    fn fetch_route(&self, destination: &str, _scanned_beacon: &str) -> Result<Path> {
        match self.get(destination) {
            Some(path) => Ok(path.clone()),
            None => bail!("no saved map for `{destination}`"),
        }
    }

    fn destinations(&self) -> Result<Vec<String>> {
        Ok(self.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn path(destination: &str, n: usize) -> Path {
        let offsets: Vec<_> = (0..n).map(|i| Vector3::new(i as f64, 0.0, -1.0)).collect();
        Path::from_offsets(destination, "pi", &offsets).unwrap()
    }

    #[test]
    fn test_save_overwrites_same_destination() {
        let mut store = MapStore::in_memory();
        assert!(!store.save(path("Lab", 2)));
        assert!(!store.save(path("Library", 3)));
        assert!(store.save(path("Lab", 4)));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("Lab").unwrap().len(), 4);
        assert_eq!(store.names(), vec!["Lab".to_string(), "Library".to_string()]);
    }

    #[test]
    fn test_remove() {
        let mut store = MapStore::in_memory();
        store.save(path("Lab", 2));
        assert!(store.remove("Library").is_none());
        assert_eq!(store.remove("Lab").unwrap().destination(), "Lab");
        assert!(store.is_empty());
    }

    #[test]
    fn test_flush_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("maps.json");

        let mut store = MapStore::open(&file).unwrap();
        assert!(store.is_empty());
        store.save(path("Lab", 3));
        store.save(path("Cafe", 2));
        store.flush().unwrap();

        let reopened = MapStore::open(&file).unwrap();
        assert_eq!(reopened.list(), store.list());
        assert!(!dir.path().join("maps.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("maps.json");
        fs::write(&file, r#"[{"destination":"Lab","beacon_name":"pi","node_count":3,"nodes":{"index":[]}}]"#)
            .unwrap();
        assert!(MapStore::open(&file).is_err());
    }

    #[test]
    fn test_route_source_lookup() {
        let mut store = MapStore::in_memory();
        store.save(path("Lab", 2));

        assert_eq!(store.fetch_route("Lab", "pi").unwrap().len(), 2);
        assert!(store.fetch_route("Gym", "pi").is_err());
        assert_eq!(store.destinations().unwrap(), vec!["Lab".to_string()]);
    }
}
