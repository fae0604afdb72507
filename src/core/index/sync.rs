//! Index synchronization with the entity files
//!
//! Methods for rebuilding and incrementally syncing the index.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use rusqlite::{params, OptionalExtension};

use super::{compute_hash, get_file_mtime, EntityIndex, SyncStats};
use crate::core::document::{entity_files, EntityDocument};
use crate::core::identity::EntityId;

impl EntityIndex {
    /// Full rebuild of the index from the entity files
    pub fn rebuild(&mut self) -> Result<SyncStats> {
        let start = std::time::Instant::now();
        let mut stats = SyncStats::default();

        self.conn
            .execute_batch(
                r#"
            DELETE FROM entities;
            DELETE FROM relations;
            DELETE FROM relation_members;
            "#,
            )
            .into_diagnostic()?;

        for path in entity_files(&self.entities_dir()) {
            stats.files_scanned += 1;
            match self.index_file(&path) {
                Ok(()) => stats.entities_added += 1,
                Err(e) => {
                    stats.files_failed += 1;
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to index entity file"
                    );
                }
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            files = stats.files_scanned,
            indexed = stats.entities_added,
            failed = stats.files_failed,
            "index rebuilt"
        );
        Ok(stats)
    }

    /// Incremental sync - only reindex changed files
    pub fn sync(&mut self) -> Result<SyncStats> {
        let start = std::time::Instant::now();
        let mut stats = SyncStats::default();

        let mut current_files: HashMap<String, PathBuf> = HashMap::new();
        for path in entity_files(&self.entities_dir()) {
            current_files.insert(self.relative_path(&path), path);
            stats.files_scanned += 1;
        }

        let mut cached_files: HashMap<String, (i64, String)> = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT file_path, file_mtime, file_hash FROM entities")
                .into_diagnostic()?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .into_diagnostic()?;

            for row in rows {
                let (path, mtime, hash) = row.into_diagnostic()?;
                cached_files.insert(path, (mtime, hash));
            }
        }

        for (rel_path, full_path) in &current_files {
            let needs_update = match cached_files.get(rel_path) {
                Some((cached_mtime, cached_hash)) => {
                    let current_mtime = get_file_mtime(full_path)?;
                    if current_mtime == *cached_mtime {
                        false
                    } else {
                        let content = fs::read_to_string(full_path).into_diagnostic()?;
                        if compute_hash(&content) == *cached_hash {
                            // Touched but unchanged: remember the new mtime
                            self.update_mtime(rel_path, current_mtime)?;
                            false
                        } else {
                            true
                        }
                    }
                }
                None => true,
            };

            if !needs_update {
                continue;
            }

            if let Err(e) = self.index_file(full_path) {
                stats.files_failed += 1;
                tracing::warn!(
                    path = %full_path.display(),
                    error = %e,
                    "failed to index entity file"
                );
                continue;
            }
            if cached_files.contains_key(rel_path) {
                stats.entities_updated += 1;
            } else {
                stats.entities_added += 1;
            }
        }

        for rel_path in cached_files.keys() {
            if current_files.contains_key(rel_path) {
                continue;
            }
            let entity_id: Option<String> = self
                .conn
                .query_row(
                    "SELECT id FROM entities WHERE file_path = ?1",
                    params![rel_path],
                    |row| row.get(0),
                )
                .optional()
                .into_diagnostic()?;

            if let Some(id) = entity_id {
                self.remove_entity(&id)?;
                stats.entities_removed += 1;
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            added = stats.entities_added,
            updated = stats.entities_updated,
            removed = stats.entities_removed,
            "index synced"
        );
        Ok(stats)
    }

    /// Index (or reindex) a single entity file
    pub fn index_file(&self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).into_diagnostic()?;
        let mtime = get_file_mtime(path)?;
        let hash = compute_hash(&content);
        let doc = EntityDocument::parse(&content)
            .map_err(|e| miette::miette!("Failed to parse {}: {}", path.display(), e))?;
        let rel_path = self.relative_path(path);

        self.index_document(&doc, &rel_path, mtime, &hash)
    }

    /// Store a parsed document, replacing any previous rows for its id
    fn index_document(
        &self,
        doc: &EntityDocument,
        rel_path: &str,
        mtime: i64,
        hash: &str,
    ) -> Result<()> {
        let id = doc.id.to_string();
        let tags = (!doc.tags.is_empty()).then(|| doc.tags.join(","));

        let tx = self.conn.unchecked_transaction().into_diagnostic()?;

        // A file may have been renamed; drop rows keyed by its old id.
        tx.execute(
            r#"DELETE FROM relation_members
               WHERE owner_id IN (SELECT id FROM entities WHERE file_path = ?1)"#,
            params![rel_path],
        )
        .into_diagnostic()?;
        tx.execute(
            r#"DELETE FROM relations
               WHERE owner_id IN (SELECT id FROM entities WHERE file_path = ?1)"#,
            params![rel_path],
        )
        .into_diagnostic()?;
        tx.execute("DELETE FROM entities WHERE file_path = ?1", params![rel_path])
            .into_diagnostic()?;

        tx.execute(
            r#"INSERT OR REPLACE INTO entities
               (id, prefix, title, author, created, tags, file_path, file_mtime, file_hash)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                id,
                doc.id.prefix().as_str(),
                doc.title,
                doc.author,
                doc.created.to_rfc3339(),
                tags,
                rel_path,
                mtime,
                hash
            ],
        )
        .into_diagnostic()?;

        tx.execute("DELETE FROM relations WHERE owner_id = ?1", params![id])
            .into_diagnostic()?;
        tx.execute("DELETE FROM relation_members WHERE owner_id = ?1", params![id])
            .into_diagnostic()?;

        for (name, members) in &doc.relations {
            let unique = dedup(members);
            tx.execute(
                "INSERT INTO relations (owner_id, relation, member_count) VALUES (?1, ?2, ?3)",
                params![id, name, unique.len() as i64],
            )
            .into_diagnostic()?;
            for (position, target) in unique.iter().enumerate() {
                tx.execute(
                    r#"INSERT INTO relation_members (owner_id, relation, position, target_id)
                       VALUES (?1, ?2, ?3, ?4)"#,
                    params![id, name, position as i64, target.to_string()],
                )
                .into_diagnostic()?;
            }
        }

        tx.commit().into_diagnostic()?;
        Ok(())
    }

    fn update_mtime(&self, rel_path: &str, mtime: i64) -> Result<()> {
        self.conn
            .execute(
                "UPDATE entities SET file_mtime = ?1 WHERE file_path = ?2",
                params![mtime, rel_path],
            )
            .into_diagnostic()?;
        Ok(())
    }

    /// Remove an entity and its relations from the index
    pub(super) fn remove_entity(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM entities WHERE id = ?1", params![id])
            .into_diagnostic()?;
        self.conn
            .execute("DELETE FROM relations WHERE owner_id = ?1", params![id])
            .into_diagnostic()?;
        self.conn
            .execute(
                "DELETE FROM relation_members WHERE owner_id = ?1",
                params![id],
            )
            .into_diagnostic()?;
        Ok(())
    }

    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Member ids in order, first occurrence wins
fn dedup(members: &[EntityId]) -> Vec<&EntityId> {
    let mut unique: Vec<&EntityId> = Vec::with_capacity(members.len());
    for id in members {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}
