//! Timer categories and their display ordering

use crate::{CategoryId, Rejection, Result};
use serde::{Deserialize, Serialize};

/// Colour given to new categories
pub const DEFAULT_COLOR: &str = "#4CAF50";

/// A user-defined timer bucket ("study", "work", ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// `#RRGGBB` or `#AARRGGBB`
    pub color_hex: String,
    /// Display order; not necessarily contiguous
    pub position: i32,
}

impl Category {
    /// Validate a display name
    pub fn check_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Rejection::BlankCategoryName);
        }
        Ok(())
    }

    /// Validate a hex colour string
    pub fn check_color(color: &str) -> Result<()> {
        let valid = color
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 || hex.len() == 8)
            .map(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .unwrap_or(false);
        if valid {
            Ok(())
        } else {
            Err(Rejection::InvalidColor(color.to_string()))
        }
    }
}

/// Direction for reordering a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Position for a category appended to `ordered`
pub fn next_position(ordered: &[Category]) -> i32 {
    ordered
        .iter()
        .map(|c| c.position)
        .max()
        .map(|p| p + 1)
        .unwrap_or(0)
}

/// Plan a swap of `id` with its neighbour in `ordered` (sorted by position)
///
/// Returns the two rows with their new positions, or `None` when the
/// category is already at that end of the list. When both rows share a
/// position the list indices are used instead so the swap still takes effect.
pub fn plan_move(
    ordered: &[Category],
    id: CategoryId,
    direction: MoveDirection,
) -> Result<Option<(Category, Category)>> {
    let index = ordered
        .iter()
        .position(|c| c.id == id)
        .ok_or(Rejection::CategoryNotFound(id))?;
    let target_index = match direction {
        MoveDirection::Up => match index.checked_sub(1) {
            Some(i) => i,
            None => return Ok(None),
        },
        MoveDirection::Down => index + 1,
    };
    let Some(target) = ordered.get(target_index) else {
        return Ok(None);
    };
    let current = &ordered[index];

    let (current_pos, target_pos) = if current.position == target.position {
        (index as i32, target_index as i32)
    } else {
        (current.position, target.position)
    };

    let moved = Category {
        position: target_pos,
        ..current.clone()
    };
    let displaced = Category {
        position: current_pos,
        ..target.clone()
    };
    Ok(Some((moved, displaced)))
}
