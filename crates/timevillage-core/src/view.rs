//! Derived village state for live views

use crate::{Building, Village, VillageState};
use serde::{Deserialize, Serialize};

/// Everything a village screen renders, recomputed after each mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillageView {
    pub nickname: String,
    pub accumulated_time: u64,
    pub global_time: u64,
    pub buildings: Vec<Building>,
    pub main_level: Option<u32>,
    pub grid_size: u32,
}

impl VillageView {
    /// Derive the view from the current state
    pub fn derive(village: &Village<'_>, state: &VillageState) -> Self {
        Self {
            nickname: state.ledger.nickname.clone(),
            accumulated_time: state.ledger.accumulated_time,
            global_time: state.ledger.global_time,
            buildings: state.buildings.clone(),
            main_level: state.main_level(),
            grid_size: village.grid_size(state),
        }
    }
}
