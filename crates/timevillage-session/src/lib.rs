//! Time Village Session - the per-user mutation context
//!
//! A [`Session`] owns the store handle, the active catalog and the selected
//! progression policy. Every change to the ledger or the building table goes
//! through it, one at a time, and every change is pushed to live-view
//! subscribers.
//!
//! ```text
//! Session
//!  ├── Store (timevillage-db)      durable ledger / buildings / categories
//!  ├── Catalog + ProgressionPolicy build / upgrade gating
//!  ├── TimerEngine + ticker task   one tick per period while running
//!  └── Subjects                    village / timer / category live views
//! ```

mod categories;
mod config;
mod error;
mod session;
mod ticker;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use session::Session;
