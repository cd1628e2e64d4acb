//! Progression policies
//!
//! Two balance policies exist and produce different gameplay, so they are
//! kept as separate implementations of one trait and chosen at composition
//! time (see [`PolicyKind`]):
//!
//! - [`HubCapped`]: grid size and unlocks come from the rules table; satellite
//!   buildings may never out-level the MAIN building.
//! - [`FixedCap`]: grid grows by a fixed formula; every building stops at
//!   level 3.

use crate::{Building, BuildingType, Catalog, Rejection, Result, VillageState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Rules that decide what may be built or upgraded
pub trait ProgressionPolicy: Send + Sync + fmt::Debug {
    /// Which policy this is
    fn kind(&self) -> PolicyKind;

    /// Level of the MAIN building placed on first launch
    fn starting_main_level(&self) -> u32;

    /// Side length of the square grid for a MAIN level
    fn grid_size(&self, catalog: &Catalog, main_level: u32) -> u32;

    /// Check whether a new building of `kind` may be placed at all
    fn check_build(
        &self,
        catalog: &Catalog,
        state: &VillageState,
        kind: &BuildingType,
    ) -> Result<()>;

    /// Check whether `building` may go up one level
    ///
    /// Existence of a rule for the next level is checked separately by the
    /// village; this only covers the policy cap.
    fn check_upgrade(
        &self,
        catalog: &Catalog,
        state: &VillageState,
        building: &Building,
    ) -> Result<()>;

    /// Convenience wrapper over `check_build`
    fn can_build_new(
        &self,
        catalog: &Catalog,
        state: &VillageState,
        kind: &BuildingType,
    ) -> bool {
        self.check_build(catalog, state, kind).is_ok()
    }
}

/// Policy selector used by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Table-driven grid, satellites capped by the MAIN level
    #[default]
    HubCapped,
    /// Formula grid, every building capped at a fixed level
    FixedCap,
}

impl PolicyKind {
    /// Instantiate the policy
    pub fn build(self) -> Arc<dyn ProgressionPolicy> {
        match self {
            PolicyKind::HubCapped => Arc::new(HubCapped),
            PolicyKind::FixedCap => Arc::new(FixedCap::default()),
        }
    }
}

fn main_level(state: &VillageState) -> Result<u32> {
    state.main_level().ok_or(Rejection::NoMainBuilding)
}

fn reject_main(kind: &BuildingType) -> Result<()> {
    if kind.is_main() {
        return Err(Rejection::SingleMain(kind.clone()));
    }
    Ok(())
}

/// Table-driven policy (cloud-synced variant)
#[derive(Debug, Clone, Copy, Default)]
pub struct HubCapped;

impl ProgressionPolicy for HubCapped {
    fn kind(&self) -> PolicyKind {
        PolicyKind::HubCapped
    }

    fn starting_main_level(&self) -> u32 {
        1
    }

    fn grid_size(&self, catalog: &Catalog, main_level: u32) -> u32 {
        catalog.main().map(|m| m.grid_size(main_level)).unwrap_or(1)
    }

    fn check_build(
        &self,
        catalog: &Catalog,
        state: &VillageState,
        kind: &BuildingType,
    ) -> Result<()> {
        reject_main(kind)?;
        let rules = catalog
            .get(kind)
            .ok_or_else(|| Rejection::UnknownBuildingType(kind.clone()))?;
        let main_level = main_level(state)?;
        if main_level < rules.unlock_at_main_level {
            return Err(Rejection::LockedByProgression {
                kind: kind.clone(),
                required: rules.unlock_at_main_level,
                main_level,
            });
        }
        Ok(())
    }

    fn check_upgrade(
        &self,
        _catalog: &Catalog,
        state: &VillageState,
        building: &Building,
    ) -> Result<()> {
        if building.is_main() {
            return Ok(());
        }
        let main_level = main_level(state)?;
        if building.level >= main_level {
            return Err(Rejection::LockedByProgression {
                kind: building.kind.clone(),
                required: building.level + 1,
                main_level,
            });
        }
        Ok(())
    }
}

/// Formula-driven policy (offline variant)
#[derive(Debug, Clone, Copy)]
pub struct FixedCap {
    /// Highest level any building may reach
    pub max_level: u32,
}

impl Default for FixedCap {
    fn default() -> Self {
        Self { max_level: 3 }
    }
}

impl ProgressionPolicy for FixedCap {
    fn kind(&self) -> PolicyKind {
        PolicyKind::FixedCap
    }

    fn starting_main_level(&self) -> u32 {
        0
    }

    fn grid_size(&self, _catalog: &Catalog, main_level: u32) -> u32 {
        3 + main_level * 2
    }

    fn check_build(
        &self,
        catalog: &Catalog,
        state: &VillageState,
        kind: &BuildingType,
    ) -> Result<()> {
        reject_main(kind)?;
        if catalog.get(kind).is_none() {
            return Err(Rejection::UnknownBuildingType(kind.clone()));
        }
        let main_level = main_level(state)?;
        if main_level == 0 {
            return Err(Rejection::LockedByProgression {
                kind: kind.clone(),
                required: 1,
                main_level,
            });
        }
        let grid_size = self.grid_size(catalog, main_level);
        let cells = u64::from(grid_size) * u64::from(grid_size);
        if state.buildings.len() as u64 >= cells {
            return Err(Rejection::GridFull { grid_size });
        }
        Ok(())
    }

    fn check_upgrade(
        &self,
        _catalog: &Catalog,
        _state: &VillageState,
        building: &Building,
    ) -> Result<()> {
        if building.level >= self.max_level {
            return Err(Rejection::MaxLevel {
                kind: building.kind.clone(),
                level: building.level,
            });
        }
        Ok(())
    }
}
