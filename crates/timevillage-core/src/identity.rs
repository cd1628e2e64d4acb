//! Identity types for buildings, categories and building types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a placed building
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u64);

impl BuildingId {
    /// Create a new building ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "building:{}", self.0)
    }
}

/// Unique identifier for a timer category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub u64);

impl CategoryId {
    /// Create a new category ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category:{}", self.0)
    }
}

/// Building type as named by the rules document (e.g. "MAIN", "HOUSE")
///
/// Uses a string-based ID so remote catalogs can introduce new types
/// without a code change.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingType(pub String);

impl BuildingType {
    /// Type name of the hub building at the grid origin
    pub const MAIN: &'static str = "MAIN";

    /// Create a new building type
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// The hub building type
    pub fn main() -> Self {
        Self::new(Self::MAIN)
    }

    /// Whether this is the hub building type
    pub fn is_main(&self) -> bool {
        self.0 == Self::MAIN
    }

    /// Get the type as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BuildingType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BuildingType {
    fn from(s: String) -> Self {
        Self(s)
    }
}
