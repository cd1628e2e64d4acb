//! Remote rules fetch with bounded retry and builtin fallback
//!
//! The rules document is fetched once at cold start. Transport failures are
//! retried with a fixed backoff; a document that downloads but fails to
//! parse or validate is not retried. Either way the bundled default takes
//! over, so loading never leaves the game without a catalog.

use crate::builtin::builtin_catalog;
use crate::error::{Error, Result};
use crate::loader::Loader;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use timevillage_core::Catalog;

/// Where the active catalog came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    Remote,
    Builtin,
}

/// A catalog together with its origin
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Arc<Catalog>,
    pub origin: CatalogOrigin,
}

/// Something that can produce the raw rules document
pub trait RulesSource {
    /// Fetch the document body
    fn fetch(&self) -> impl Future<Output = Result<String>> + Send;
}

/// Rules document served over HTTP
#[derive(Debug, Clone)]
pub struct HttpRulesSource {
    client: Client,
    url: String,
}

impl HttpRulesSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RulesSource for HttpRulesSource {
    async fn fetch(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Rules fetch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Rules document URL; `None` uses the bundled default only
    pub url: Option<String>,
    /// Total fetch attempts before falling back
    pub attempts: u32,
    /// Delay between attempts
    pub backoff_ms: u64,
    /// Per-request timeout
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: None,
            attempts: 50,
            backoff_ms: 200,
            timeout_ms: 10_000,
        }
    }
}

fn builtin() -> Result<LoadedCatalog> {
    Ok(LoadedCatalog {
        catalog: Arc::new(builtin_catalog()?),
        origin: CatalogOrigin::Builtin,
    })
}

fn parse_remote(body: &str) -> Result<Catalog> {
    let mut loader = Loader::new();
    loader.load_json_str(body)?;
    loader.finish()
}

/// Fetch and parse the remote catalog, falling back to the builtin one
///
/// Only fails if the bundled default itself cannot be parsed.
pub async fn load_catalog<S: RulesSource>(
    source: &S,
    attempts: u32,
    backoff: Duration,
) -> Result<LoadedCatalog> {
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        match source.fetch().await {
            Ok(body) => match parse_remote(&body) {
                Ok(catalog) => {
                    tracing::info!(
                        target: "timevillage::rules",
                        attempt,
                        building_types = catalog.buildings.len(),
                        "Loaded remote rules"
                    );
                    return Ok(LoadedCatalog {
                        catalog: Arc::new(catalog),
                        origin: CatalogOrigin::Remote,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        target: "timevillage::rules",
                        error = %err,
                        "Remote rules rejected; using bundled rules"
                    );
                    return builtin();
                }
            },
            Err(err) => {
                tracing::debug!(
                    target: "timevillage::rules",
                    attempt,
                    attempts,
                    error = %err,
                    "Rules fetch failed"
                );
                if attempt < attempts {
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    let err = Error::RulesUnavailable { attempts };
    tracing::warn!(target: "timevillage::rules", error = %err, "Using bundled rules");
    builtin()
}

/// Load the catalog as configured
pub async fn load_configured(config: &FetchConfig) -> Result<LoadedCatalog> {
    let Some(url) = config.url.as_deref() else {
        tracing::info!(
            target: "timevillage::rules",
            "No rules URL configured; using bundled rules"
        );
        return builtin();
    };

    let source = HttpRulesSource::new(url, Duration::from_millis(config.timeout_ms))?;
    load_catalog(
        &source,
        config.attempts,
        Duration::from_millis(config.backoff_ms),
    )
    .await
}
