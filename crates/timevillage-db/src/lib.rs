//! Time Village DB - Local durable store using native_db
//!
//! Provides persistent storage for:
//! - Placed buildings (unique per grid cell)
//! - The singleton ledger row
//! - Timer categories
//!
//! Multi-row changes (purchase, upgrade, full replacement from the cloud)
//! run in a single read-write transaction.

mod error;
mod models;
mod queries;
mod store;

pub use error::{Error, Result};
pub use store::Store;
