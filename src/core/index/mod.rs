//! SQLite-backed index of entity files
//!
//! The index mirrors the YAML files under `entities/` and stores, for every
//! relation, its member count alongside the ordered member rows. That lets
//! a record come back from the index with lazy relations that already know
//! their size, so counting never reads member rows.
//!
//! The index is user-local and gitignored; it can always be rebuilt from
//! the entity files.

mod queries;
mod schema;
mod sync;
mod types;

pub use queries::escape_like;
pub use types::*;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use miette::{IntoDiagnostic, Result};
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::core::document::entity_files;
use crate::core::project::{Project, ENTITIES_DIR, META_DIR};

/// Index file name inside the project's meta directory
const INDEX_FILE: &str = "index.db";

/// Current schema version - index is rebuilt on version mismatch
const SCHEMA_VERSION: i32 = 1;

/// The entity index backed by SQLite
pub struct EntityIndex {
    conn: Connection,
    project_root: PathBuf,
}

impl EntityIndex {
    /// Open or create the index for a project
    ///
    /// A missing index is created and populated. An existing one is synced
    /// against the entity files if anything changed.
    pub fn open(project: &Project) -> Result<Self> {
        let index_path = Self::index_path(project.root());
        let needs_init = !index_path.exists();
        let mut index = Self::open_without_sync(project)?;

        if needs_init {
            index.rebuild()?;
        } else {
            if index.needs_schema_rebuild()? {
                index.reinitialize_schema()?;
            }
            index.auto_sync()?;
        }

        Ok(index)
    }

    /// Open the index without syncing it
    pub fn open_without_sync(project: &Project) -> Result<Self> {
        let index_path = Self::index_path(project.root());
        if let Some(parent) = index_path.parent() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }

        let conn = Connection::open(&index_path).into_diagnostic()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .into_diagnostic()?;

        let mut index = Self {
            conn,
            project_root: project.root().to_path_buf(),
        };
        index.init_schema()?;
        Ok(index)
    }

    /// Location of the index database for a project root
    pub fn index_path(project_root: &Path) -> PathBuf {
        project_root.join(META_DIR).join(INDEX_FILE)
    }

    fn entities_dir(&self) -> PathBuf {
        self.project_root.join(ENTITIES_DIR)
    }

    /// Check if schema version matches current version
    fn needs_schema_rebuild(&self) -> Result<bool> {
        let current_version: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()
            .into_diagnostic()?;

        Ok(current_version != Some(SCHEMA_VERSION))
    }

    /// Drop all tables and reinitialize schema, then rebuild
    fn reinitialize_schema(&mut self) -> Result<()> {
        tracing::debug!("index schema changed, rebuilding");
        self.conn
            .execute_batch(
                r#"
                DROP TABLE IF EXISTS schema_version;
                DROP TABLE IF EXISTS entities;
                DROP TABLE IF EXISTS relations;
                DROP TABLE IF EXISTS relation_members;
                "#,
            )
            .into_diagnostic()?;

        self.init_schema()?;
        self.rebuild()?;
        Ok(())
    }

    /// Sync only if some file is newer than the index or a file disappeared
    fn auto_sync(&mut self) -> Result<()> {
        let cached_max_mtime: Option<i64> = self
            .conn
            .query_row("SELECT MAX(file_mtime) FROM entities", [], |row| row.get(0))
            .optional()
            .into_diagnostic()?
            .flatten();
        let cached_count: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
            .into_diagnostic()?;

        let files = entity_files(&self.entities_dir());
        let mut needs_sync = files.len() != cached_count;
        if !needs_sync {
            let max = cached_max_mtime.unwrap_or(0);
            for path in &files {
                if get_file_mtime(path)? > max {
                    needs_sync = true;
                    break;
                }
            }
        }

        if needs_sync {
            self.sync()?;
        }
        Ok(())
    }

    /// Get index statistics
    pub fn statistics(&self) -> Result<IndexStats> {
        let total_entities: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
            .into_diagnostic()?;

        let total_relations: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM relations", [], |row| row.get(0))
            .into_diagnostic()?;

        let total_members: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM relation_members", [], |row| row.get(0))
            .into_diagnostic()?;

        let mut by_prefix = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT prefix, COUNT(*) FROM entities GROUP BY prefix")
                .into_diagnostic()?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
                })
                .into_diagnostic()?;

            for row in rows {
                let (prefix, count) = row.into_diagnostic()?;
                by_prefix.insert(prefix, count);
            }
        }

        let db_size_bytes = fs::metadata(Self::index_path(&self.project_root))
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(IndexStats {
            total_entities,
            total_relations,
            total_members,
            by_prefix,
            db_size_bytes,
        })
    }
}

/// Get file modification time in nanoseconds since the epoch
fn get_file_mtime(path: &Path) -> Result<i64> {
    let metadata = fs::metadata(path).into_diagnostic()?;
    let mtime = metadata
        .modified()
        .into_diagnostic()?
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0);
    Ok(mtime)
}

/// Compute SHA256 hash of content
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Parse datetime string to DateTime<Utc>
fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
