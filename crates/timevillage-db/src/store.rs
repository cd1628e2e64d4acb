//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use native_db::*;
use std::path::Path;
use std::sync::LazyLock;
use timevillage_core::{Building, BuildingId, Category, CategoryId, Cell, Ledger, VillageState};

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models
        .define::<StoredBuilding>()
        .expect("StoredBuilding model");
    models.define::<StoredLedger>().expect("StoredLedger model");
    models
        .define::<StoredCategory>()
        .expect("StoredCategory model");
    models.define::<StoredCounter>().expect("StoredCounter model");
    models
});

/// Database store for persistent village state.
///
/// One store is opened at startup and shared (behind an `Arc`) for the whole
/// process lifetime.
pub struct Store {
    pub(crate) db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Load the ledger row, if it was ever written.
    pub fn load_ledger(&self) -> Result<Option<Ledger>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredLedger> = r.get().primary(LEDGER_KEY.to_string())?;
        Ok(stored.map(|s| s.to_ledger()))
    }

    /// Save the ledger row.
    pub fn save_ledger(&self, ledger: &Ledger) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.upsert(StoredLedger::from_ledger(ledger))?;
        rw.commit()?;
        Ok(())
    }

    /// Load every building, ordered by ID.
    pub fn load_buildings(&self) -> Result<Vec<Building>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredBuilding>()?;
        let iter = scan.all()?;
        let buildings: std::result::Result<Vec<StoredBuilding>, _> = iter.collect();
        let buildings = buildings.map_err(|e| Error::Database(e.to_string()))?;
        Ok(buildings.iter().map(StoredBuilding::to_building).collect())
    }

    /// Load a building by ID.
    pub fn load_building(&self, id: BuildingId) -> Result<Option<Building>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredBuilding> = r.get().primary(id.raw())?;
        Ok(stored.map(|s| s.to_building()))
    }

    /// Building occupying a cell.
    pub fn building_at(&self, cell: Cell) -> Result<Option<Building>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredBuilding> =
            r.get().secondary(StoredBuildingKey::cell, cell.key())?;
        Ok(stored.map(|s| s.to_building()))
    }

    /// Insert a new building; fails if its cell is taken.
    pub fn insert_building(&self, building: &Building) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        Self::insert_checked(&rw, building)?;
        rw.commit()?;
        Ok(())
    }

    /// Load ledger and buildings in one read.
    ///
    /// A missing ledger row yields `Ledger::new(default_nickname)`.
    pub fn load_state(&self, default_nickname: &str) -> Result<VillageState> {
        let ledger = self
            .load_ledger()?
            .unwrap_or_else(|| Ledger::new(default_nickname));
        Ok(VillageState::new(ledger, self.load_buildings()?))
    }

    /// Persist a purchase: new building plus debited ledger, atomically.
    ///
    /// The occupancy check runs inside the same transaction as the insert.
    pub fn commit_purchase(&self, ledger: &Ledger, building: &Building) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        Self::insert_checked(&rw, building)?;
        rw.upsert(StoredLedger::from_ledger(ledger))?;
        rw.commit()?;
        Ok(())
    }

    /// Persist an upgrade: replaced building row plus debited ledger, atomically.
    pub fn commit_upgrade(&self, ledger: &Ledger, building: &Building) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        let existing: Option<StoredBuilding> = rw.get().primary(building.id.raw())?;
        if existing.is_none() {
            return Err(Error::NotFound(building.id.to_string()));
        }
        rw.upsert(StoredBuilding::from_building(building))?;
        rw.upsert(StoredLedger::from_ledger(ledger))?;
        rw.commit()?;
        Ok(())
    }

    /// Replace every building and the ledger in one transaction.
    ///
    /// Used when pulling the cloud copy: delete-all, insert-all, overwrite
    /// balances. If any insert fails nothing is changed.
    pub fn replace_village(&self, ledger: &Ledger, buildings: &[Building]) -> Result<()> {
        let rw = self.db.rw_transaction()?;

        let existing: Vec<StoredBuilding> = {
            let scan = rw.scan().primary::<StoredBuilding>()?;
            let iter = scan.all()?;
            let all: std::result::Result<Vec<StoredBuilding>, _> = iter.collect();
            all.map_err(|e| Error::Database(e.to_string()))?
        };
        for stored in existing {
            rw.remove(stored)?;
        }

        for building in buildings {
            Self::insert_checked(&rw, building)?;
        }
        rw.upsert(StoredLedger::from_ledger(ledger))?;

        rw.commit()?;
        Ok(())
    }

    /// Load every category, ordered by position then ID.
    pub fn load_categories(&self) -> Result<Vec<Category>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredCategory>()?;
        let iter = scan.all()?;
        let categories: std::result::Result<Vec<StoredCategory>, _> = iter.collect();
        let categories = categories.map_err(|e| Error::Database(e.to_string()))?;
        let mut categories: Vec<Category> = categories
            .iter()
            .map(StoredCategory::to_category)
            .collect();
        categories.sort_by_key(|c| (c.position, c.id));
        Ok(categories)
    }

    /// Load a category by ID.
    pub fn load_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredCategory> = r.get().primary(id.raw())?;
        Ok(stored.map(|s| s.to_category()))
    }

    /// Insert a new category with a never-used ID.
    pub fn insert_category(&self, name: &str, color_hex: &str, position: i32) -> Result<Category> {
        let rw = self.db.rw_transaction()?;
        let counter: Option<StoredCounter> = rw.get().primary(CATEGORY_COUNTER.to_string())?;
        let highest = {
            let scan = rw.scan().primary::<StoredCategory>()?;
            let iter = scan.all()?;
            let all: std::result::Result<Vec<StoredCategory>, _> = iter.collect();
            let all = all.map_err(|e| Error::Database(e.to_string()))?;
            all.iter().map(|c| c.id).max().unwrap_or(0)
        };
        let next_id = counter.map_or(0, |c| c.last).max(highest) + 1;
        rw.upsert(StoredCounter {
            name: CATEGORY_COUNTER.to_string(),
            last: next_id,
        })?;
        let category = Category {
            id: CategoryId::new(next_id),
            name: name.to_string(),
            color_hex: color_hex.to_string(),
            position,
        };
        rw.insert(StoredCategory::from_category(&category))?;
        rw.commit()?;
        Ok(category)
    }

    /// Save (upsert) categories in one transaction.
    pub fn save_categories(&self, categories: &[Category]) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        for category in categories {
            rw.upsert(StoredCategory::from_category(category))?;
        }
        rw.commit()?;
        Ok(())
    }

    /// Delete a category; returns whether it existed.
    pub fn delete_category(&self, id: CategoryId) -> Result<bool> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredCategory> = rw.get().primary(id.raw())?;
        let existed = stored.is_some();
        if let Some(s) = stored {
            rw.remove(s)?;
        }
        rw.commit()?;
        Ok(existed)
    }

    /// Clear all data.
    pub fn clear(&self) -> Result<()> {
        let rw = self.db.rw_transaction()?;

        let buildings: Vec<StoredBuilding> = {
            let scan = rw.scan().primary::<StoredBuilding>()?;
            let iter = scan.all()?;
            let all: std::result::Result<Vec<StoredBuilding>, _> = iter.collect();
            all.map_err(|e| Error::Database(e.to_string()))?
        };
        for building in buildings {
            rw.remove(building)?;
        }

        let categories: Vec<StoredCategory> = {
            let scan = rw.scan().primary::<StoredCategory>()?;
            let iter = scan.all()?;
            let all: std::result::Result<Vec<StoredCategory>, _> = iter.collect();
            all.map_err(|e| Error::Database(e.to_string()))?
        };
        for category in categories {
            rw.remove(category)?;
        }

        if let Some(ledger) = rw.get().primary::<StoredLedger>(LEDGER_KEY.to_string())? {
            rw.remove(ledger)?;
        }

        rw.commit()?;
        Ok(())
    }

    fn insert_checked(rw: &transaction::RwTransaction<'_>, building: &Building) -> Result<()> {
        let occupant: Option<StoredBuilding> = rw
            .get()
            .secondary(StoredBuildingKey::cell, building.cell.key())?;
        if let Some(occupant) = occupant {
            return Err(Error::DuplicateKey(format!(
                "cell {} taken by building {}",
                building.cell, occupant.id
            )));
        }
        rw.insert(StoredBuilding::from_building(building))?;
        Ok(())
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}
