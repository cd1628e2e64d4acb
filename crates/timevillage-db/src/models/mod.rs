//! Database models for persistent storage.

mod building;
mod profile;

pub use building::*;
pub use profile::*;
