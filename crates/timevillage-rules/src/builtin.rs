//! Bundled default rules table

use crate::error::Result;
use crate::loader::Loader;
use timevillage_core::Catalog;

const DEFAULT_CATALOG: &str = include_str!("../data/default_catalog.ron");

/// Parse the rules table shipped with the binary
pub fn builtin_catalog() -> Result<Catalog> {
    let mut loader = Loader::new();
    loader.load_ron_str(DEFAULT_CATALOG)?;
    loader.finish()
}
