//! Rules document loader

use crate::error::{Error, Result};
use crate::schema::{BuildingDef, RulesDocument, ServerSettings};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use timevillage_core::Catalog;

/// Collects building definitions from one or more documents
///
/// Documents may be JSON (the published wire format) or RON (the bundled
/// default). A building type may only be defined once across everything
/// loaded.
#[derive(Debug, Default)]
pub struct Loader {
    server_settings: Option<ServerSettings>,
    buildings: Vec<BuildingDef>,
    seen: HashSet<String>,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON rules document
    pub fn load_json_str(&mut self, content: &str) -> Result<()> {
        let doc: RulesDocument = serde_json::from_str(content)?;
        self.add_document(doc)
    }

    /// Load a RON rules document
    pub fn load_ron_str(&mut self, content: &str) -> Result<()> {
        let doc: RulesDocument = ron::from_str(content)?;
        self.add_document(doc)
    }

    /// Load a rules file, choosing the format from its extension
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => self.load_json_str(&content),
            Some("ron") => self.load_ron_str(&content),
            _ => {
                if content.trim_start().starts_with('{') {
                    self.load_json_str(&content)
                } else {
                    self.load_ron_str(&content)
                }
            }
        }
    }

    fn add_document(&mut self, doc: RulesDocument) -> Result<()> {
        if let Some(settings) = doc.server_settings {
            self.server_settings = Some(settings);
        }
        for def in doc.buildings {
            if !self.seen.insert(def.kind.clone()) {
                return Err(Error::DuplicateDefinition(def.kind));
            }
            self.buildings.push(def);
        }
        Ok(())
    }

    /// Number of building types loaded so far
    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    /// Whether nothing has been loaded
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Validate everything loaded and build the catalog
    pub fn finish(self) -> Result<Catalog> {
        RulesDocument {
            server_settings: self.server_settings,
            buildings: self.buildings,
        }
        .into_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use timevillage_core::BuildingType;

    const MAIN_RON: &str = r#"(
        buildings: [
            (type: "MAIN", grid_size_by_lvl: Some([3, 5]), levels: [(lvl: 1), (lvl: 2, cost: 60)]),
        ],
    )"#;

    const HOUSE_JSON: &str = r#"{
        "server_settings": { "base_url": "https://cdn.example/assets" },
        "buildings": [
            { "type": "HOUSE", "levels": [ { "lvl": 1, "cost": 30, "url": "h1.png" } ] }
        ]
    }"#;

    #[test]
    fn test_load_mixed_formats() {
        let mut loader = Loader::new();
        loader.load_ron_str(MAIN_RON).unwrap();
        loader.load_json_str(HOUSE_JSON).unwrap();
        assert_eq!(loader.len(), 2);

        let catalog = loader.finish().unwrap();
        assert_eq!(catalog.cost(&BuildingType::main(), 2), Some(60));
        assert_eq!(catalog.main().unwrap().unlock_at_main_level, 1);
        assert_eq!(
            catalog.asset_url(&"HOUSE".into(), 1).as_deref(),
            Some("https://cdn.example/assets/h1.png")
        );
    }

    #[test]
    fn test_duplicate_across_documents() {
        let mut loader = Loader::new();
        loader.load_ron_str(MAIN_RON).unwrap();
        let result = loader.load_ron_str(MAIN_RON);
        assert!(matches!(result, Err(Error::DuplicateDefinition(kind)) if kind == "MAIN"));
    }

    #[test]
    fn test_empty_loader_has_no_main() {
        assert!(Loader::new().is_empty());
        assert!(matches!(
            Loader::new().finish(),
            Err(Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        let mut loader = Loader::new();
        assert!(matches!(
            loader.load_json_str("{ not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_load_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(
            br#"{"buildings":[{"type":"MAIN","levels":[{"lvl":1,"cost":0}]}]}"#,
        )
        .unwrap();

        let mut loader = Loader::new();
        loader.load_file(&path).unwrap();
        assert!(loader.finish().unwrap().main().is_some());
    }
}
