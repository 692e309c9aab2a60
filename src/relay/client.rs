//! Blocking HTTP client for the relay server.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use tracing::debug;

use crate::config::RelayConfig;
use crate::model::Path;
use crate::store::{MapRepository, RouteSource};

use super::messages::{DownloadRequest, MapNamesRequest, NavigationRequest, UploadRequest};

pub struct HttpRelay {
    base_url: String,
    client: Client,
}

impl HttpRelay {
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| anyhow!("failed to build http client: {e}"))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    fn post<B: Serialize + ?Sized>(&self, name: &str, body: Option<&B>) -> Result<Response> {
        let url = self.endpoint(name);
        debug!(url = %url, "relay request");
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request
            .send()
            .map_err(|e| anyhow!("failed to reach relay at {url}: {e}"))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            bail!("relay http error {status} from {name}: {text}");
        }
        Ok(resp)
    }

    fn post_path<B: Serialize>(&self, name: &str, body: &B) -> Result<Path> {
        let bytes = self.post(name, Some(body))?.bytes()?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            bail!("relay returned no path from {name}");
        }
        Ok(Path::from_json_slice(&bytes)?)
    }

    fn post_names<B: Serialize + ?Sized>(&self, name: &str, body: Option<&B>) -> Result<Vec<String>> {
        self.post(name, body)?
            .json()
            .with_context(|| format!("relay returned an invalid name list from {name}"))
    }
}

impl RouteSource for HttpRelay {
    fn fetch_route(&self, destination: &str, scanned_beacon: &str) -> Result<Path> {
        self.post_path(
            "NavigationInstructions",
            &NavigationRequest {
                destination,
                scanned_beacon_name: scanned_beacon,
            },
        )
        .with_context(|| format!("no route to `{destination}`"))
    }

    fn destinations(&self) -> Result<Vec<String>> {
        self.post_names::<()>("DestinationList", None)
    }
}

impl MapRepository for HttpRelay {
    fn upload(&self, uid: &str, path: &Path) -> Result<String> {
        let text = self
            .post("UploadCustomMap", Some(&UploadRequest { path, uid }))?
            .text()?;
        Ok(text)
    }

    fn map_names(&self, uid: &str) -> Result<Vec<String>> {
        self.post_names("DownloadCustomMapNames", Some(&MapNamesRequest { uid }))
    }

    fn download(&self, uid: &str, map_name: &str) -> Result<Path> {
        self.post_path("DownloadCustomMap", &DownloadRequest { uid, map_name })
            .with_context(|| format!("failed to download map `{map_name}`"))
    }
}
