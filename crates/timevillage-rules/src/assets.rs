//! In-memory asset cache using moka

use crate::error::{Error, Result};
use crate::slot::CatalogSlot;
use moka::future::Cache;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Outcome of a preload pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub loaded: usize,
    pub failed: Vec<String>,
}

impl PreloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Downloaded building assets keyed by resolved URL
#[derive(Clone)]
pub struct AssetCache {
    cache: Cache<String, Arc<[u8]>>,
    client: Client,
}

impl AssetCache {
    /// Create a cache holding at most `max_entries` assets
    pub fn new(max_entries: u64, timeout: Duration) -> Result<Self> {
        let cache = Cache::builder().max_capacity(max_entries).build();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { cache, client })
    }

    /// Get a cached asset
    pub async fn get(&self, url: &str) -> Option<Arc<[u8]>> {
        self.cache.get(url).await
    }

    /// Insert an asset obtained elsewhere
    pub async fn insert(&self, url: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.cache.insert(url.into(), bytes.into()).await;
    }

    /// Return the cached asset, downloading it on a miss
    pub async fn fetch(&self, url: &str) -> Result<Arc<[u8]>> {
        if let Some(bytes) = self.cache.get(url).await {
            return Ok(bytes);
        }
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes: Arc<[u8]> = Arc::from(response.bytes().await?.as_ref());
        self.cache.insert(url.to_string(), bytes.clone()).await;
        Ok(bytes)
    }

    /// Download every URL, reporting progress in `0.0..=1.0`
    ///
    /// A failed asset does not stop the pass; it is listed in the report.
    pub async fn preload(&self, urls: &[String], progress: &watch::Sender<f32>) -> PreloadReport {
        let mut report = PreloadReport::default();
        if urls.is_empty() {
            progress.send_replace(1.0);
            return report;
        }

        let total = urls.len();
        for (i, url) in urls.iter().enumerate() {
            match self.fetch(url).await {
                Ok(_) => report.loaded += 1,
                Err(err) => {
                    tracing::warn!(
                        target: "timevillage::rules",
                        url = %url,
                        error = %err,
                        "Asset preload failed"
                    );
                    report.failed.push(url.clone());
                }
            }
            progress.send_replace((i + 1) as f32 / total as f32);
        }

        tracing::info!(
            target: "timevillage::rules",
            loaded = report.loaded,
            failed = report.failed.len(),
            "Asset preload finished"
        );
        report
    }

    /// Wait for the catalog, then preload every asset it references
    pub async fn preload_when_ready(
        &self,
        slot: &CatalogSlot,
        attempts: u32,
        interval: Duration,
        progress: &watch::Sender<f32>,
    ) -> Result<PreloadReport> {
        let catalog = slot
            .wait_ready(attempts, interval)
            .await
            .ok_or(Error::RulesUnavailable { attempts })?;
        Ok(self.preload(&catalog.asset_urls(), progress).await)
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
