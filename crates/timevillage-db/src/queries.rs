//! Common query patterns for the database.

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::Store;
use timevillage_core::{Building, BuildingType};

impl Store {
    /// Get all buildings of a specific type.
    pub fn buildings_by_type(&self, kind: &BuildingType) -> Result<Vec<Building>> {
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredBuilding>(StoredBuildingKey::kind)?;
        let iter = scan.start_with(kind.as_str().to_string())?;
        let buildings: std::result::Result<Vec<StoredBuilding>, _> = iter.collect();
        let buildings = buildings.map_err(|e| Error::Database(e.to_string()))?;
        Ok(buildings
            .iter()
            .filter(|b| b.kind == kind.as_str())
            .map(StoredBuilding::to_building)
            .collect())
    }

    /// Get the MAIN building, if placed.
    pub fn main_building(&self) -> Result<Option<Building>> {
        Ok(self
            .buildings_by_type(&BuildingType::main())?
            .into_iter()
            .next())
    }

    /// Count placed buildings.
    pub fn count_buildings(&self) -> Result<usize> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredBuilding>()?;
        let iter = scan.all()?;
        Ok(iter.count())
    }
}
