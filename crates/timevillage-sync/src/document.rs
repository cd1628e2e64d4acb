//! Remote user document
//!
//! Wire shape (camelCase JSON):
//! `{ accumulatedTime, globalTime, nickname, buildings: [{type, level, x, y}], lastSyncTimestamp }`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use timevillage_core::{BuildingType, Cell, VillageState};

/// One building as stored remotely (no id; ids are local)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBuilding {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_level")]
    pub level: u32,
    pub x: i32,
    pub y: i32,
}

fn default_level() -> u32 {
    1
}

/// Whole-state snapshot keyed by user id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default)]
    pub accumulated_time: u64,
    #[serde(default)]
    pub global_time: u64,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub buildings: Vec<RemoteBuilding>,
    #[serde(default)]
    pub last_sync_timestamp: DateTime<Utc>,
}

impl UserDocument {
    /// Snapshot local state
    pub fn from_state(state: &VillageState, synced_at: DateTime<Utc>) -> Self {
        Self {
            accumulated_time: state.ledger.accumulated_time,
            global_time: state.ledger.global_time,
            nickname: state.ledger.nickname.clone(),
            buildings: state
                .buildings
                .iter()
                .map(|b| RemoteBuilding {
                    kind: b.kind.as_str().to_string(),
                    level: b.level,
                    x: b.cell.x,
                    y: b.cell.y,
                })
                .collect(),
            last_sync_timestamp: synced_at,
        }
    }

    /// Buildings as (type, level, cell) rows
    pub fn building_rows(&self) -> impl Iterator<Item = (BuildingType, u32, Cell)> + '_ {
        self.buildings
            .iter()
            .map(|b| (BuildingType::new(b.kind.clone()), b.level, Cell::new(b.x, b.y)))
    }
}
