//! Placed buildings and grid cells

use crate::{BuildingId, BuildingType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid coordinate; the MAIN building sits at the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    /// The grid origin
    pub const ORIGIN: Cell = Cell { x: 0, y: 0 };

    /// Create a new cell
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether this cell lies inside a square grid of odd side `size`
    /// centered on the origin
    pub fn within(&self, size: u32) -> bool {
        let radius = (size.saturating_sub(1) / 2) as i64;
        (self.x as i64).abs() <= radius && (self.y as i64).abs() <= radius
    }

    /// Storage key used for the uniqueness constraint
    pub fn key(&self) -> String {
        format!("{}:{}", self.x, self.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A building placed on the village grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingType,
    pub level: u32,
    pub cell: Cell,
}

impl Building {
    /// Create a new building
    pub fn new(id: BuildingId, kind: impl Into<BuildingType>, level: u32, cell: Cell) -> Self {
        Self {
            id,
            kind: kind.into(),
            level,
            cell,
        }
    }

    /// Whether this is the hub building
    pub fn is_main(&self) -> bool {
        self.kind.is_main()
    }
}
