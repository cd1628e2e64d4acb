//! Time Village Core - Progression and economy engine
//!
//! This crate provides the pure domain of the time village:
//! - Identifiers for buildings, categories and building types
//! - The economy `Ledger` (spendable and lifetime time balances)
//! - The rules `Catalog` mapping building type + level to cost, unlock and grid size
//! - `ProgressionPolicy` implementations selected at composition time
//! - The `Village` state machine (build / upgrade gated by balance and rules)
//! - The single-session `TimerEngine`
//! - `Subject` / `Subscription` for push-based live views
//!
//! Nothing in here performs I/O. Persistence lives in `timevillage-db`,
//! orchestration in `timevillage-session`.

mod building;
mod catalog;
mod category;
mod error;
mod identity;
mod ledger;
pub mod observe;
pub mod policy;
pub mod timer;
mod view;
mod village;

pub use building::{Building, Cell};
pub use catalog::{BuildingRules, Catalog, LevelRule, RuleEntry};
pub use category::{next_position, plan_move, Category, MoveDirection, DEFAULT_COLOR};
pub use error::{Rejection, Result};
pub use identity::{BuildingId, BuildingType, CategoryId};
pub use ledger::Ledger;
pub use observe::{Subject, Subscription};
pub use policy::{FixedCap, HubCapped, PolicyKind, ProgressionPolicy};
pub use timer::{TimerEngine, TimerPhase, TimerView};
pub use view::VillageView;
pub use village::{Village, VillageState};
