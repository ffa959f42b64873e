//! Asynchronous data loading. Each load runs as its own task and hands a
//! complete collection to the host loop over a channel.

use formats::feed::HeatIslandFeed;
use formats::regions::parse_region_catalog;
use scene::region::RegionCatalog;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::ViewerError;

#[derive(Debug, Clone, PartialEq)]
pub enum DataEvent {
    Anomalies(HeatIslandFeed),
    Regions(RegionCatalog),
}

fn is_remote(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://")
}

#[derive(Debug, Clone, Default)]
pub struct Loader {
    http: reqwest::Client,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `uri` over HTTP(S), or from the filesystem for anything else.
    pub async fn fetch_text(&self, uri: &str) -> Result<String, ViewerError> {
        if !is_remote(uri) {
            return Ok(tokio::fs::read_to_string(uri).await?);
        }
        let fetch_failed = |e: reqwest::Error| ViewerError::UpstreamFetch {
            uri: uri.to_string(),
            reason: e.to_string(),
        };
        let resp = self
            .http
            .get(uri)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_failed)?;
        resp.text().await.map_err(fetch_failed)
    }

    /// The heat-island feed, or an empty one if the fetch or decode fails.
    pub async fn load_feed(&self, url: &str) -> HeatIslandFeed {
        let result = match self.fetch_text(url).await {
            Ok(body) => HeatIslandFeed::from_json_str(&body).map_err(ViewerError::from),
            Err(err) => Err(err),
        };
        match result {
            Ok(feed) => {
                info!(
                    anomalies = feed.anomalies.len(),
                    total = feed.summary.total_count,
                    "heat-island feed loaded"
                );
                feed
            }
            Err(err) => {
                warn!(%url, %err, "heat-island feed unavailable, continuing with no anomalies");
                HeatIslandFeed::default()
            }
        }
    }

    /// The neighborhood catalog; `None` leaves the regions layer out.
    pub async fn load_regions(&self, uri: &str) -> Option<RegionCatalog> {
        let result = match self.fetch_text(uri).await {
            Ok(body) => parse_region_catalog(&body).map_err(ViewerError::from),
            Err(err) => Err(err),
        };
        match result {
            Ok(catalog) => {
                info!(regions = catalog.len(), "region catalog loaded");
                Some(catalog)
            }
            Err(err) => {
                warn!(%uri, %err, "region catalog unavailable");
                None
            }
        }
    }
}

/// Spawns the initial feed and region loads on the current runtime.
pub fn spawn_initial_loads(
    loader: Loader,
    feed_url: String,
    regions_uri: String,
    tx: mpsc::Sender<DataEvent>,
) {
    let feed_loader = loader.clone();
    let feed_tx = tx.clone();
    tokio::spawn(async move {
        let feed = feed_loader.load_feed(&feed_url).await;
        // The host may already have exited.
        let _ = feed_tx.send(DataEvent::Anomalies(feed)).await;
    });
    tokio::spawn(async move {
        if let Some(catalog) = loader.load_regions(&regions_uri).await {
            let _ = tx.send(DataEvent::Regions(catalog)).await;
        }
    });
}
