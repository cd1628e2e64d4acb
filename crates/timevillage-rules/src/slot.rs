//! Readiness slot for the active catalog

use std::sync::{Arc, OnceLock};
use std::time::Duration;
use timevillage_core::Catalog;

/// Holds the catalog once loading finishes
///
/// The slot is written once; later writes are ignored. Consumers that start
/// before loading completes can poll with [`CatalogSlot::wait_ready`].
#[derive(Debug, Default)]
pub struct CatalogSlot {
    catalog: OnceLock<Arc<Catalog>>,
}

impl CatalogSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the catalog; returns false if one was already set
    pub fn set(&self, catalog: Arc<Catalog>) -> bool {
        self.catalog.set(catalog).is_ok()
    }

    pub fn get(&self) -> Option<Arc<Catalog>> {
        self.catalog.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.catalog.get().is_some()
    }

    /// Poll until the catalog is available, giving up after `attempts` checks
    pub async fn wait_ready(&self, attempts: u32, interval: Duration) -> Option<Arc<Catalog>> {
        for attempt in 0..attempts.max(1) {
            if let Some(catalog) = self.get() {
                return Some(catalog);
            }
            if attempt + 1 < attempts {
                tokio::time::sleep(interval).await;
            }
        }
        let catalog = self.get();
        if catalog.is_none() {
            tracing::warn!(target: "timevillage::rules", attempts, "Catalog not ready");
        }
        catalog
    }
}
