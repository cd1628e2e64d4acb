//! Ledger and category models for database storage.

use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use timevillage_core::{Category, CategoryId, Ledger};

/// Primary key of the single ledger row.
pub const LEDGER_KEY: &str = "ledger";

/// Stored ledger state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct StoredLedger {
    /// Always "ledger" - single row.
    #[primary_key]
    pub id: String,
    /// Player display name.
    pub nickname: String,
    /// Spendable seconds.
    pub accumulated_time: u64,
    /// Lifetime seconds.
    pub global_time: u64,
}

impl StoredLedger {
    /// Create from a Ledger.
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            id: LEDGER_KEY.to_string(),
            nickname: ledger.nickname.clone(),
            accumulated_time: ledger.accumulated_time,
            global_time: ledger.global_time,
        }
    }

    /// Convert to a Ledger.
    pub fn to_ledger(&self) -> Ledger {
        Ledger {
            nickname: self.nickname.clone(),
            accumulated_time: self.accumulated_time,
            global_time: self.global_time,
        }
    }
}

/// Stored timer category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct StoredCategory {
    /// Primary key - category ID.
    #[primary_key]
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Hex colour.
    pub color_hex: String,
    /// Display order.
    pub position: i32,
}

impl StoredCategory {
    /// Create from a Category.
    pub fn from_category(category: &Category) -> Self {
        Self {
            id: category.id.raw(),
            name: category.name.clone(),
            color_hex: category.color_hex.clone(),
            position: category.position,
        }
    }

    /// Convert to a Category.
    pub fn to_category(&self) -> Category {
        Category {
            id: CategoryId::new(self.id),
            name: self.name.clone(),
            color_hex: self.color_hex.clone(),
            position: self.position,
        }
    }
}

/// Key of the category ID counter.
pub const CATEGORY_COUNTER: &str = "category";

/// Monotonic ID counter; IDs handed out are never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 4, version = 1)]
#[native_db]
pub struct StoredCounter {
    /// Counter name.
    #[primary_key]
    pub name: String,
    /// Last ID handed out.
    pub last: u64,
}
