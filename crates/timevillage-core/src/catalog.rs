//! Rules table: building type + level -> cost, unlock threshold, asset, grid size
//!
//! A `Catalog` is built once (from the bundled default or a fetched rules
//! document) and is immutable for the rest of the process.

use crate::BuildingType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-level rule for one building type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRule {
    /// Level this rule applies to (starting at 1)
    pub level: u32,
    /// Cost in seconds of accumulated time to reach this level
    pub cost: u64,
    /// Asset reference, relative to the catalog base URL or absolute
    pub asset: Option<String>,
    /// Number of animation frames in the asset
    pub frames: u32,
}

/// All rules for one building type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingRules {
    pub kind: BuildingType,
    /// Display names, index `level - 1`
    pub names_by_level: Vec<String>,
    /// Grid side length, index `level - 1` (only meaningful for MAIN)
    pub grid_size_by_level: Vec<u32>,
    /// Minimum MAIN level before this type can be built
    pub unlock_at_main_level: u32,
    /// Level rules, strictly increasing by level
    pub levels: Vec<LevelRule>,
}

impl BuildingRules {
    /// Rule for a specific level
    pub fn level(&self, level: u32) -> Option<&LevelRule> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// Highest level defined
    pub fn max_level(&self) -> u32 {
        self.levels.iter().map(|l| l.level).max().unwrap_or(0)
    }

    /// Display name for a level, falling back to the type name
    pub fn name(&self, level: u32) -> &str {
        level
            .checked_sub(1)
            .and_then(|i| self.names_by_level.get(i as usize))
            .map(String::as_str)
            .unwrap_or(self.kind.as_str())
    }

    /// Grid size for a MAIN level
    ///
    /// Levels past the end of the table keep the last size; an empty table
    /// (or level 0) yields a single cell.
    pub fn grid_size(&self, level: u32) -> u32 {
        if level == 0 {
            return 1;
        }
        self.grid_size_by_level
            .get(level as usize - 1)
            .or_else(|| self.grid_size_by_level.last())
            .copied()
            .unwrap_or(1)
    }
}

/// Flattened view of one (type, level) row of the rules table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry<'a> {
    pub kind: &'a BuildingType,
    pub level: u32,
    pub cost: u64,
    pub unlock_at_main_level: u32,
    pub grid_size: Option<u32>,
    pub asset: Option<String>,
    pub frames: u32,
}

/// The complete rules table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Base URL for relative asset references
    pub base_url: Option<String>,
    /// Rules by building type, in document order
    pub buildings: IndexMap<BuildingType, BuildingRules>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rules for a building type
    pub fn insert(&mut self, rules: BuildingRules) {
        self.buildings.insert(rules.kind.clone(), rules);
    }

    /// Rules for a building type
    pub fn get(&self, kind: &BuildingType) -> Option<&BuildingRules> {
        self.buildings.get(kind)
    }

    /// Rules for the MAIN building
    pub fn main(&self) -> Option<&BuildingRules> {
        self.buildings.get(&BuildingType::main())
    }

    /// Rule for a building type at a level
    pub fn level(&self, kind: &BuildingType, level: u32) -> Option<&LevelRule> {
        self.get(kind).and_then(|r| r.level(level))
    }

    /// Cost to reach `level` for `kind`
    pub fn cost(&self, kind: &BuildingType, level: u32) -> Option<u64> {
        self.level(kind, level).map(|l| l.cost)
    }

    /// Frame count for an asset, 1 when unknown
    pub fn frames(&self, kind: &BuildingType, level: u32) -> u32 {
        self.level(kind, level).map(|l| l.frames).unwrap_or(1)
    }

    /// Flattened rules table row
    pub fn entry(&self, kind: &BuildingType, level: u32) -> Option<RuleEntry<'_>> {
        let rules = self.get(kind)?;
        let rule = rules.level(level)?;
        Some(RuleEntry {
            kind: &rules.kind,
            level,
            cost: rule.cost,
            unlock_at_main_level: rules.unlock_at_main_level,
            grid_size: (!rules.grid_size_by_level.is_empty()).then(|| rules.grid_size(level)),
            asset: self.resolve(rule.asset.as_deref()),
            frames: rule.frames,
        })
    }

    /// Types that can be offered in a shop (everything except MAIN)
    pub fn buildable_types(&self) -> impl Iterator<Item = &BuildingType> {
        self.buildings.keys().filter(|k| !k.is_main())
    }

    /// Resolved asset URL for a building at a level
    pub fn asset_url(&self, kind: &BuildingType, level: u32) -> Option<String> {
        self.resolve(self.level(kind, level)?.asset.as_deref())
    }

    /// Every distinct resolved asset URL, in catalog order
    pub fn asset_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for rules in self.buildings.values() {
            for rule in &rules.levels {
                if let Some(url) = self.resolve(rule.asset.as_deref()) {
                    if !urls.contains(&url) {
                        urls.push(url);
                    }
                }
            }
        }
        urls
    }

    fn resolve(&self, asset: Option<&str>) -> Option<String> {
        let asset = asset?;
        if asset.starts_with("http") {
            return Some(asset.to_string());
        }
        match self.base_url.as_deref() {
            Some(base) if !base.is_empty() => Some(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                asset.trim_start_matches('/')
            )),
            _ => Some(asset.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn level(level: u32, cost: u64, asset: Option<&str>) -> LevelRule {
        LevelRule {
            level,
            cost,
            asset: asset.map(str::to_string),
            frames: 1,
        }
    }

    /// Catalog shared by the village and policy tests
    pub(crate) fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.base_url = Some("http://assets.local/".to_string());
        catalog.insert(BuildingRules {
            kind: BuildingType::main(),
            names_by_level: vec!["Bonfire".into(), "Camp".into(), "Hall".into()],
            grid_size_by_level: vec![5, 7, 9],
            unlock_at_main_level: 1,
            levels: vec![
                level(1, 0, Some("main1.png")),
                level(2, 1800, Some("main2.png")),
                level(3, 3600, Some("http://cdn.local/main3.png")),
            ],
        });
        catalog.insert(BuildingRules {
            kind: "HOUSE".into(),
            names_by_level: vec!["Hut".into()],
            grid_size_by_level: vec![],
            unlock_at_main_level: 1,
            levels: vec![
                level(1, 300, Some("house1.png")),
                level(2, 600, Some("house2.png")),
                level(3, 1200, Some("house1.png")),
            ],
        });
        catalog.insert(BuildingRules {
            kind: "FORGE".into(),
            names_by_level: vec![],
            grid_size_by_level: vec![],
            unlock_at_main_level: 2,
            levels: vec![level(1, 900, None), level(2, 1800, None)],
        });
        catalog
    }

    #[test]
    fn test_grid_size_lookup() {
        let catalog = sample_catalog();
        let main = catalog.main().unwrap();
        assert_eq!(main.grid_size(1), 5);
        assert_eq!(main.grid_size(2), 7);
        assert_eq!(main.grid_size(9), 9);
        assert_eq!(main.grid_size(0), 1);
    }

    #[test]
    fn test_entry_flattens_rules() {
        let catalog = sample_catalog();
        let entry = catalog.entry(&"HOUSE".into(), 2).unwrap();
        assert_eq!(entry.cost, 600);
        assert_eq!(entry.unlock_at_main_level, 1);
        assert_eq!(entry.grid_size, None);
        assert_eq!(entry.asset.as_deref(), Some("http://assets.local/house2.png"));

        assert!(catalog.entry(&"HOUSE".into(), 4).is_none());
        assert!(catalog.entry(&"CASTLE".into(), 1).is_none());
    }

    #[test]
    fn test_asset_urls_are_distinct_and_resolved() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.asset_urls(),
            vec![
                "http://assets.local/main1.png",
                "http://assets.local/main2.png",
                "http://cdn.local/main3.png",
                "http://assets.local/house1.png",
                "http://assets.local/house2.png",
            ]
        );
    }

    #[test]
    fn test_names_fall_back_to_type() {
        let catalog = sample_catalog();
        assert_eq!(catalog.main().unwrap().name(2), "Camp");
        assert_eq!(catalog.get(&"FORGE".into()).unwrap().name(1), "FORGE");
    }

    #[test]
    fn test_buildable_types_skip_main() {
        let catalog = sample_catalog();
        let types: Vec<_> = catalog.buildable_types().map(|t| t.as_str()).collect();
        assert_eq!(types, vec!["HOUSE", "FORGE"]);
    }
}
