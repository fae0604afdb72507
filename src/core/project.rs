//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::document::ENTITY_FILE_SUFFIX;
use crate::core::identity::EntityId;

/// Marker directory holding config and the index
pub const META_DIR: &str = ".relcache";

/// Directory holding entity files
pub const ENTITIES_DIR: &str = "entities";

/// Represents a relcache project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .relcache/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(META_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(META_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::init_force(&root)
    }

    /// Initialize even if .relcache/ exists; existing entity files are kept
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let meta_dir = root.join(META_DIR);

        std::fs::create_dir_all(&meta_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(meta_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(meta_dir.join(".gitignore"), "index.db*\n")
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::create_dir_all(root.join(ENTITIES_DIR))
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# relcache project configuration

# Default author for new entities (can be overridden by global config)
# author: ""

# Default output format (auto, tsv, json, yaml)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .relcache configuration directory
    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    /// Get the directory holding entity files
    pub fn entities_dir(&self) -> PathBuf {
        self.root.join(ENTITIES_DIR)
    }

    /// Get the path for an entity file
    pub fn entity_path(&self, id: &EntityId) -> PathBuf {
        self.entities_dir()
            .join(id.prefix().dir_name())
            .join(format!("{}{}", id, ENTITY_FILE_SUFFIX))
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a relcache project (searched from {searched_from:?}). Run 'relcache init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("relcache project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.meta_dir().exists());
        assert!(project.meta_dir().join("config.yaml").exists());
        assert!(project.entities_dir().is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_discover_finds_meta_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_meta_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_entity_path_groups_by_prefix() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let id = EntityId::new(EntityPrefix::new("ORD").unwrap());

        let path = project.entity_path(&id);
        assert!(path.starts_with(project.entities_dir().join("ord")));
        assert!(path.to_string_lossy().ends_with(".rc.yaml"));
    }
}
