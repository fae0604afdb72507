//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::Project;

/// relcache configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author for new entities
    pub author: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources for a project (or none),
    /// merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/relcache/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // Project config (.relcache/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.meta_dir().join("config.yaml"))
            {
                config.merge(project_config);
            }
        }

        // Environment variables
        if let Ok(author) = std::env::var("RELCACHE_AUTHOR") {
            config.author = Some(author);
        }
        if let Ok(format) = std::env::var("RELCACHE_FORMAT") {
            config.default_format = Some(format);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "relcache")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            author: Some("base".to_string()),
            default_format: Some("tsv".to_string()),
        };
        base.merge(Config {
            author: Some("project".to_string()),
            default_format: None,
        });
        assert_eq!(base.author.as_deref(), Some("project"));
        assert_eq!(base.default_format.as_deref(), Some("tsv"));
    }

    #[test]
    fn test_explicit_author_wins() {
        let config = Config {
            author: Some("alice".to_string()),
            default_format: None,
        };
        assert_eq!(config.author(), "alice");
    }

    #[test]
    fn test_project_config_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(
            project.meta_dir().join("config.yaml"),
            "default_format: json\n",
        )
        .unwrap();

        let config = Config::load_for(Some(&project));
        if std::env::var("RELCACHE_FORMAT").is_err() {
            assert_eq!(config.default_format.as_deref(), Some("json"));
        }
    }
}
