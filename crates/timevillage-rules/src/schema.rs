//! Rules document schema
//!
//! Field names follow the published rules document (`type`, `name_by_lvl`,
//! `unlock_at_main_lvl`, `lvl`, `url`, ...). The same structs deserialize the
//! bundled RON default.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use timevillage_core::{BuildingRules, BuildingType, Catalog, LevelRule};

/// Root of a rules document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesDocument {
    #[serde(default)]
    pub server_settings: Option<ServerSettings>,
    #[serde(default)]
    pub buildings: Vec<BuildingDef>,
}

/// Server-side settings carried by the document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Base URL for relative asset references
    #[serde(default)]
    pub base_url: String,
}

/// Definition of one building type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingDef {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "name_by_lvl")]
    pub names_by_level: Option<Vec<String>>,
    #[serde(default, rename = "grid_size_by_lvl")]
    pub grid_size_by_level: Option<Vec<u32>>,
    #[serde(default = "default_unlock", rename = "unlock_at_main_lvl")]
    pub unlock_at_main_level: u32,
    #[serde(default)]
    pub levels: Vec<LevelDef>,
}

fn default_unlock() -> u32 {
    1
}

/// Definition of one level of a building type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDef {
    #[serde(default = "default_level", rename = "lvl")]
    pub level: u32,
    #[serde(default)]
    pub cost: u64,
    /// Asset reference (relative to `base_url` or absolute)
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub frames: Option<u32>,
}

fn default_level() -> u32 {
    1
}

impl BuildingDef {
    /// Validate and convert into core rules
    pub fn into_rules(self) -> Result<BuildingRules> {
        if self.kind.trim().is_empty() {
            return Err(Error::InvalidSchema("building type must not be empty".to_string()));
        }
        if self.levels.is_empty() {
            return Err(Error::InvalidSchema(format!("{} has no levels", self.kind)));
        }
        let mut previous = 0;
        for level in &self.levels {
            if level.level <= previous {
                return Err(Error::InvalidSchema(format!(
                    "{} levels must increase from 1, found {} after {}",
                    self.kind, level.level, previous
                )));
            }
            previous = level.level;
        }

        Ok(BuildingRules {
            kind: BuildingType::new(self.kind),
            names_by_level: self.names_by_level.unwrap_or_default(),
            grid_size_by_level: self.grid_size_by_level.unwrap_or_default(),
            unlock_at_main_level: self.unlock_at_main_level,
            levels: self
                .levels
                .into_iter()
                .map(|l| LevelRule {
                    level: l.level,
                    cost: l.cost,
                    asset: l.url.filter(|u| !u.is_empty()),
                    frames: l.frames.unwrap_or(1).max(1),
                })
                .collect(),
        })
    }
}

impl RulesDocument {
    /// Validate and convert into a catalog
    pub fn into_catalog(self) -> Result<Catalog> {
        let mut catalog = Catalog::new();
        catalog.base_url = self
            .server_settings
            .map(|s| s.base_url)
            .filter(|u| !u.is_empty());

        let mut seen = HashSet::new();
        for def in self.buildings {
            if !seen.insert(def.kind.clone()) {
                return Err(Error::DuplicateDefinition(def.kind));
            }
            catalog.insert(def.into_rules()?);
        }

        if catalog.main().is_none() {
            return Err(Error::InvalidSchema(format!(
                "catalog has no {} building",
                BuildingType::MAIN
            )));
        }
        Ok(catalog)
    }
}
