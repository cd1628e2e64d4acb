//! Time Village Rules - rules table loading and asset preloading
//!
//! Loads the building catalog from:
//! - the remote JSON rules document (fetched once at cold start, bounded retry)
//! - the bundled RON default, used whenever the remote copy is unavailable
//!
//! Also provides a readiness slot for the loaded catalog and an in-memory
//! asset cache that preloads every asset the catalog references.

mod assets;
mod builtin;
mod error;
mod fetch;
mod loader;
mod schema;
mod slot;

pub use assets::{AssetCache, PreloadReport};
pub use builtin::builtin_catalog;
pub use error::{Error, Result};
pub use fetch::{
    load_catalog, load_configured, CatalogOrigin, FetchConfig, HttpRulesSource, LoadedCatalog,
    RulesSource,
};
pub use loader::Loader;
pub use schema::{BuildingDef, LevelDef, RulesDocument, ServerSettings};
pub use slot::CatalogSlot;
