//! Request bodies for the relay endpoints.

use serde::Serialize;

use crate::model::Path;

/// `POST /NavigationInstructions`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRequest<'a> {
    pub destination: &'a str,
    pub scanned_beacon_name: &'a str,
}

/// `POST /UploadCustomMap`: the path's own fields with `uid` merged in.
#[derive(Debug, Serialize)]
pub struct UploadRequest<'a> {
    #[serde(flatten)]
    pub path: &'a Path,
    pub uid: &'a str,
}

/// `POST /DownloadCustomMapNames`
#[derive(Debug, Serialize)]
pub struct MapNamesRequest<'a> {
    pub uid: &'a str,
}

/// `POST /DownloadCustomMap`
#[derive(Debug, Serialize)]
pub struct DownloadRequest<'a> {
    pub uid: &'a str,
    pub map_name: &'a str,
}
