//! Entity files on disk
//!
//! Each entity lives in `entities/<prefix>/<ID>.rc.yaml`. Files hold the
//! relation members only; counts are never persisted.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::core::identity::EntityId;

/// Suffix shared by all entity files
pub const ENTITY_FILE_SUFFIX: &str = ".rc.yaml";

/// Serialized form of an entity file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDocument {
    /// Unique identifier
    pub id: EntityId,

    /// Short title
    pub title: String,

    /// Author (person who created the entity)
    #[serde(default)]
    pub author: String,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Free-form labels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Relation name to member ids
    #[serde(default)]
    pub relations: BTreeMap<String, Vec<EntityId>>,
}

impl EntityDocument {
    /// Read and parse an entity file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).into_diagnostic()?;
        Self::parse(&content)
            .map_err(|e| miette::miette!("Failed to parse {}: {}", path.display(), e))
    }

    /// Parse entity YAML
    pub fn parse(content: &str) -> std::result::Result<Self, serde_yml::Error> {
        serde_yml::from_str(content)
    }

    /// Write the entity file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }
        let yaml = serde_yml::to_string(self).into_diagnostic()?;
        fs::write(path, yaml).into_diagnostic()?;
        Ok(())
    }
}

/// Whether a path names an entity file
pub fn is_entity_file(path: &Path) -> bool {
    path.to_string_lossy().ends_with(ENTITY_FILE_SUFFIX)
}

/// All entity files below `dir`, sorted by path
pub fn entity_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_entity_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use tempfile::TempDir;

    fn id(prefix: &str) -> EntityId {
        EntityId::new(EntityPrefix::new(prefix).unwrap())
    }

    #[test]
    fn test_document_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let owner = id("ORD");
        let mut relations = BTreeMap::new();
        relations.insert("items".to_string(), vec![id("ITM"), id("ITM")]);
        let doc = EntityDocument {
            id: owner.clone(),
            title: "Weekly order".to_string(),
            author: "tester".to_string(),
            created: Utc::now(),
            tags: vec![],
            relations,
        };

        let path = tmp.path().join("ord").join(format!("{}.rc.yaml", owner));
        doc.save(&path).unwrap();

        let loaded = EntityDocument::load(&path).unwrap();
        assert_eq!(loaded.id, owner);
        assert_eq!(loaded.relations["items"].len(), 2);
        assert_eq!(entity_files(tmp.path()), vec![path]);
    }

    #[test]
    fn test_relations_default_to_empty() {
        let owner = id("TAG");
        let yaml = format!(
            "id: {}\ntitle: rust\ncreated: 2024-01-01T00:00:00Z\n",
            owner
        );
        let doc = EntityDocument::parse(&yaml).unwrap();
        assert!(doc.relations.is_empty());
        assert!(doc.author.is_empty());
    }

    #[test]
    fn test_entity_files_ignores_other_yaml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.yaml"), "a: 1").unwrap();
        fs::write(tmp.path().join("ORD-x.rc.yaml"), "a: 1").unwrap();
        let files = entity_files(tmp.path());
        assert_eq!(files.len(), 1);
    }
}
