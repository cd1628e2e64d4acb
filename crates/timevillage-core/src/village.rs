//! Village state machine
//!
//! `VillageState` is the ledger plus every placed building. `Village` binds a
//! catalog and a progression policy and exposes the gated operations. Every
//! operation either applies completely or returns a `Rejection` and leaves the
//! state exactly as it was.

use crate::{
    Building, BuildingId, BuildingType, Catalog, Cell, Ledger, ProgressionPolicy, Rejection,
    Result,
};
use serde::{Deserialize, Serialize};

/// Ledger and buildings, as loaded from the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillageState {
    pub ledger: Ledger,
    pub buildings: Vec<Building>,
}

impl VillageState {
    /// Create a state from its parts
    pub fn new(ledger: Ledger, buildings: Vec<Building>) -> Self {
        Self { ledger, buildings }
    }

    /// The hub building
    pub fn main(&self) -> Option<&Building> {
        self.buildings.iter().find(|b| b.is_main())
    }

    /// Current level of the hub building
    pub fn main_level(&self) -> Option<u32> {
        self.main().map(|b| b.level)
    }

    /// Building occupying a cell
    pub fn at(&self, cell: Cell) -> Option<&Building> {
        self.buildings.iter().find(|b| b.cell == cell)
    }

    /// Building by ID
    pub fn get(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// ID the next inserted building will receive
    pub fn next_id(&self) -> BuildingId {
        BuildingId::new(self.buildings.iter().map(|b| b.id.raw()).max().unwrap_or(0) + 1)
    }
}

/// Gated build / upgrade operations over a `VillageState`
#[derive(Clone, Copy)]
pub struct Village<'a> {
    catalog: &'a Catalog,
    policy: &'a dyn ProgressionPolicy,
}

impl<'a> Village<'a> {
    /// Bind a catalog and a policy
    pub fn new(catalog: &'a Catalog, policy: &'a dyn ProgressionPolicy) -> Self {
        Self { catalog, policy }
    }

    /// The rules table in use
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Side length of the current grid
    pub fn grid_size(&self, state: &VillageState) -> u32 {
        let main_level = state
            .main_level()
            .unwrap_or_else(|| self.policy.starting_main_level());
        self.policy.grid_size(self.catalog, main_level)
    }

    /// Whether a new building of `kind` is unlocked
    pub fn can_build_new(&self, state: &VillageState, kind: &BuildingType) -> bool {
        self.policy.can_build_new(self.catalog, state, kind)
    }

    /// Validate a purchase and return its cost
    pub fn check_buy(&self, state: &VillageState, kind: &BuildingType, cell: Cell) -> Result<u64> {
        self.policy.check_build(self.catalog, state, kind)?;
        let grid_size = self.grid_size(state);
        if !cell.within(grid_size) {
            return Err(Rejection::OutsideGrid { cell, grid_size });
        }
        if state.at(cell).is_some() {
            return Err(Rejection::OccupiedCell(cell));
        }
        let cost = self
            .catalog
            .cost(kind, 1)
            .ok_or_else(|| Rejection::MaxLevel {
                kind: kind.clone(),
                level: 0,
            })?;
        if !state.ledger.can_afford(cost) {
            return Err(Rejection::InsufficientBalance {
                required: cost,
                available: state.ledger.accumulated_time,
            });
        }
        Ok(cost)
    }

    /// Place a new level-1 building, debiting its cost
    pub fn buy(
        &self,
        state: &mut VillageState,
        kind: &BuildingType,
        cell: Cell,
    ) -> Result<Building> {
        let cost = self.check_buy(state, kind, cell)?;
        state.ledger.debit(cost)?;
        let building = Building::new(state.next_id(), kind.clone(), 1, cell);
        state.buildings.push(building.clone());
        Ok(building)
    }

    /// Validate an upgrade and return its cost
    pub fn check_upgrade(&self, state: &VillageState, building: &Building) -> Result<u64> {
        self.policy.check_upgrade(self.catalog, state, building)?;
        let next = building.level + 1;
        let cost = self
            .catalog
            .cost(&building.kind, next)
            .ok_or_else(|| Rejection::MaxLevel {
                kind: building.kind.clone(),
                level: building.level,
            })?;
        if !state.ledger.can_afford(cost) {
            return Err(Rejection::InsufficientBalance {
                required: cost,
                available: state.ledger.accumulated_time,
            });
        }
        Ok(cost)
    }

    /// Whether `building` may go up one level (ignoring balance)
    pub fn can_upgrade(&self, state: &VillageState, building: &Building) -> bool {
        self.policy
            .check_upgrade(self.catalog, state, building)
            .is_ok()
            && self
                .catalog
                .level(&building.kind, building.level + 1)
                .is_some()
    }

    /// Raise a building by one level, debiting the cost
    ///
    /// The building keeps its ID and cell.
    pub fn upgrade(&self, state: &mut VillageState, id: BuildingId) -> Result<Building> {
        let current = state
            .get(id)
            .cloned()
            .ok_or(Rejection::BuildingNotFound(id))?;
        let cost = self.check_upgrade(state, &current)?;
        state.ledger.debit(cost)?;
        let upgraded = Building {
            level: current.level + 1,
            ..current
        };
        if let Some(slot) = state.buildings.iter_mut().find(|b| b.id == id) {
            *slot = upgraded.clone();
        }
        Ok(upgraded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::{FixedCap, HubCapped};

    fn village_with(balance: u64, main_level: u32) -> VillageState {
        let mut ledger = Ledger::default();
        ledger.credit(balance);
        VillageState::new(
            ledger,
            vec![Building::new(
                BuildingId::new(1),
                BuildingType::main(),
                main_level,
                Cell::ORIGIN,
            )],
        )
    }

    #[test]
    fn test_buy_house() {
        let catalog = sample_catalog();
        let village = Village::new(&catalog, &HubCapped);
        let mut state = village_with(1000, 1);

        let house = village
            .buy(&mut state, &"HOUSE".into(), Cell::new(1, 0))
            .unwrap();
        assert_eq!(house.kind.as_str(), "HOUSE");
        assert_eq!(house.level, 1);
        assert_eq!(house.cell, Cell::new(1, 0));
        assert_eq!(house.id, BuildingId::new(2));
        assert_eq!(state.ledger.accumulated_time, 700);
        assert_eq!(state.ledger.global_time, 1000);
        assert_eq!(state.buildings.len(), 2);
    }

    #[test]
    fn test_buy_without_balance_is_noop() {
        let catalog = sample_catalog();
        let village = Village::new(&catalog, &HubCapped);
        let mut state = village_with(200, 1);
        let before = state.clone();

        let err = village
            .buy(&mut state, &"HOUSE".into(), Cell::new(1, 0))
            .unwrap_err();
        assert_eq!(
            err,
            Rejection::InsufficientBalance {
                required: 300,
                available: 200
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_buy_on_occupied_cell_is_noop() {
        let catalog = sample_catalog();
        let village = Village::new(&catalog, &HubCapped);
        let mut state = village_with(5000, 1);
        village
            .buy(&mut state, &"HOUSE".into(), Cell::new(0, 1))
            .unwrap();
        let before = state.clone();

        assert_eq!(
            village.buy(&mut state, &"HOUSE".into(), Cell::new(0, 1)),
            Err(Rejection::OccupiedCell(Cell::new(0, 1)))
        );
        assert_eq!(
            village.buy(&mut state, &"HOUSE".into(), Cell::ORIGIN),
            Err(Rejection::OccupiedCell(Cell::ORIGIN))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_buy_outside_grid_or_locked() {
        let catalog = sample_catalog();
        let village = Village::new(&catalog, &HubCapped);
        let mut state = village_with(5000, 1);

        assert!(matches!(
            village.buy(&mut state, &"HOUSE".into(), Cell::new(3, 0)),
            Err(Rejection::OutsideGrid { grid_size: 5, .. })
        ));
        assert!(matches!(
            village.buy(&mut state, &"FORGE".into(), Cell::new(1, 1)),
            Err(Rejection::LockedByProgression { .. })
        ));
        assert!(matches!(
            village.buy(&mut state, &BuildingType::main(), Cell::new(1, 1)),
            Err(Rejection::SingleMain(_))
        ));
        assert_eq!(state.ledger.accumulated_time, 5000);
    }

    #[test]
    fn test_upgrade_capped_by_main_level() {
        let catalog = sample_catalog();
        let village = Village::new(&catalog, &HubCapped);
        let mut state = village_with(10_000, 2);
        state
            .buildings
            .push(Building::new(BuildingId::new(2), "HOUSE", 2, Cell::new(1, 0)));
        assert_eq!(village.grid_size(&state), 7);

        let house = state.get(BuildingId::new(2)).cloned().unwrap();
        assert!(!village.can_upgrade(&state, &house));
        let before = state.clone();
        assert!(matches!(
            village.upgrade(&mut state, house.id),
            Err(Rejection::LockedByProgression { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_upgrade_main_until_table_ends() {
        let catalog = sample_catalog();
        let village = Village::new(&catalog, &HubCapped);
        let mut state = village_with(10_000, 1);

        let main = village.upgrade(&mut state, BuildingId::new(1)).unwrap();
        assert_eq!(main.level, 2);
        assert_eq!(main.cell, Cell::ORIGIN);
        assert_eq!(state.ledger.accumulated_time, 8200);

        village.upgrade(&mut state, BuildingId::new(1)).unwrap();
        assert_eq!(state.ledger.accumulated_time, 4600);
        assert!(matches!(
            village.upgrade(&mut state, BuildingId::new(1)),
            Err(Rejection::MaxLevel { level: 3, .. })
        ));
        assert_eq!(state.ledger.accumulated_time, 4600);
    }

    #[test]
    fn test_upgrade_missing_building() {
        let catalog = sample_catalog();
        let village = Village::new(&catalog, &HubCapped);
        let mut state = village_with(10_000, 1);
        assert_eq!(
            village.upgrade(&mut state, BuildingId::new(99)),
            Err(Rejection::BuildingNotFound(BuildingId::new(99)))
        );
    }

    #[test]
    fn test_fixed_cap_starts_locked() {
        let catalog = sample_catalog();
        let policy = FixedCap::default();
        let village = Village::new(&catalog, &policy);
        let mut state = village_with(10_000, 0);

        assert_eq!(village.grid_size(&state), 3);
        assert!(!village.can_build_new(&state, &"HOUSE".into()));

        // level 0 -> 1 costs the level 1 rule
        village.upgrade(&mut state, BuildingId::new(1)).unwrap();
        assert_eq!(village.grid_size(&state), 5);
        assert!(village.can_build_new(&state, &"HOUSE".into()));
    }
}
