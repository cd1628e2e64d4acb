//! Rejection reasons for economy and village operations
//!
//! A rejection is never fatal: the operation that produced it left every
//! piece of persisted state untouched.

use crate::{BuildingId, BuildingType, CategoryId, Cell};
use thiserror::Error;

/// Why a ledger, village or category operation was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("cell {0} is already occupied")]
    OccupiedCell(Cell),

    #[error("cell {cell} is outside the {grid_size}x{grid_size} grid")]
    OutsideGrid { cell: Cell, grid_size: u32 },

    #[error("the {grid_size}x{grid_size} grid is full")]
    GridFull { grid_size: u32 },

    #[error("{kind} requires main level {required}, main is at {main_level}")]
    LockedByProgression {
        kind: BuildingType,
        required: u32,
        main_level: u32,
    },

    #[error("{kind} cannot go past level {level}")]
    MaxLevel { kind: BuildingType, level: u32 },

    #[error("only one {0} building may exist")]
    SingleMain(BuildingType),

    #[error("unknown building type: {0}")]
    UnknownBuildingType(BuildingType),

    #[error("building not found: {0}")]
    BuildingNotFound(BuildingId),

    #[error("village has no main building")]
    NoMainBuilding,

    #[error("category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("category name must not be blank")]
    BlankCategoryName,

    #[error("invalid color: {0}")]
    InvalidColor(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Rejection>;
