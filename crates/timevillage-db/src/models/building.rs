//! Building models for database storage.

use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use timevillage_core::{Building, BuildingId, BuildingType, Cell};

/// Stored building in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredBuilding {
    /// Primary key - building ID.
    #[primary_key]
    pub id: u64,
    /// Building type.
    #[secondary_key]
    pub kind: String,
    /// Current level.
    pub level: u32,
    /// Grid column.
    pub x: i32,
    /// Grid row.
    pub y: i32,
    /// "x:y" - at most one building per cell.
    #[secondary_key(unique)]
    pub cell: String,
}

impl StoredBuilding {
    /// Create from a core Building.
    pub fn from_building(building: &Building) -> Self {
        Self {
            id: building.id.raw(),
            kind: building.kind.as_str().to_string(),
            level: building.level,
            x: building.cell.x,
            y: building.cell.y,
            cell: building.cell.key(),
        }
    }

    /// Convert to a core Building.
    pub fn to_building(&self) -> Building {
        Building::new(
            BuildingId::new(self.id),
            BuildingType::new(self.kind.clone()),
            self.level,
            Cell::new(self.x, self.y),
        )
    }
}
