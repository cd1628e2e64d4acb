//! Time Village Sync - cloud reconciliation
//!
//! Whole-state, last-write-wins reconciliation between the local store and a
//! remote user document:
//! - `push` overwrites the remote document with the local ledger and buildings
//! - `pull` replaces the local ledger balances and buildings with the remote
//!   document, or seeds the remote document when none exists
//!
//! There is no merge and no conflict detection. Failures are logged and
//! reported; they never block local play.

mod cloud;
mod config;
mod document;
mod error;
mod identity;
mod remote;

pub use cloud::{AutoPush, CloudSync, PullOutcome};
pub use config::CloudConfig;
pub use document::{RemoteBuilding, UserDocument};
pub use error::{Error, Result};
pub use identity::{IdentityProvider, StaticIdentity};
pub use remote::{HttpRemote, MemoryRemote, RemoteStore};
