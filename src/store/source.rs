//! Collaborator seams for route lookup and map exchange.

use anyhow::Result;

use crate::model::Path;

/// Supplies destination lists and waypoint lists for navigation.
pub trait RouteSource {
    /// Path for `destination`, as seen from the scanned marker.
    fn fetch_route(&self, destination: &str, scanned_beacon: &str) -> Result<Path>;

    /// Names of every destination this source can route to.
    fn destinations(&self) -> Result<Vec<String>>;
}

/// Per-user remote storage of authored maps.
pub trait MapRepository {
    /// Upload a map; returns the server's acknowledgement text.
    fn upload(&self, uid: &str, path: &Path) -> Result<String>;

    fn map_names(&self, uid: &str) -> Result<Vec<String>>;

    fn download(&self, uid: &str, map_name: &str) -> Result<Path>;
}
