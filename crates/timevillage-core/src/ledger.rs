//! Economy ledger
//!
//! Holds the spendable balance (`accumulated_time`) and the lifetime total
//! (`global_time`), both in seconds of tracked activity. Only two mutators
//! exist: `credit` (timer commits) and `debit` (spending).

use crate::{Rejection, Result};
use serde::{Deserialize, Serialize};

/// Singleton balance row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Player display name
    pub nickname: String,
    /// Spendable balance in seconds
    pub accumulated_time: u64,
    /// Lifetime tracked seconds, never decreases
    pub global_time: u64,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            accumulated_time: 0,
            global_time: 0,
        }
    }

    /// Add tracked seconds to both balances
    pub fn credit(&mut self, seconds: u64) {
        self.accumulated_time = self.accumulated_time.saturating_add(seconds);
        self.global_time = self.global_time.saturating_add(seconds);
    }

    /// Spend from the accumulated balance
    ///
    /// Refuses (and leaves the ledger untouched) when `amount` exceeds the
    /// spendable balance. `global_time` is never touched.
    pub fn debit(&mut self, amount: u64) -> Result<()> {
        if amount > self.accumulated_time {
            return Err(Rejection::InsufficientBalance {
                required: amount,
                available: self.accumulated_time,
            });
        }
        self.accumulated_time -= amount;
        Ok(())
    }

    /// Whether `amount` can currently be spent
    pub fn can_afford(&self, amount: u64) -> bool {
        amount <= self.accumulated_time
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new("Player")
    }
}
