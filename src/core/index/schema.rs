//! Database schema initialization

use miette::{IntoDiagnostic, Result};
use rusqlite::params;

use super::{EntityIndex, SCHEMA_VERSION};

impl EntityIndex {
    /// Initialize database schema
    pub(super) fn init_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Entity metadata
            CREATE TABLE IF NOT EXISTS entities (
                id TEXT PRIMARY KEY,
                prefix TEXT NOT NULL,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                created TEXT NOT NULL,
                tags TEXT,
                file_path TEXT NOT NULL,
                file_mtime INTEGER NOT NULL,
                file_hash TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_entities_prefix ON entities(prefix);
            CREATE INDEX IF NOT EXISTS idx_entities_file_path ON entities(file_path);

            -- One row per declared relation, with its cardinality
            CREATE TABLE IF NOT EXISTS relations (
                owner_id TEXT NOT NULL,
                relation TEXT NOT NULL,
                member_count INTEGER NOT NULL,
                PRIMARY KEY (owner_id, relation)
            );

            -- Ordered relation members
            CREATE TABLE IF NOT EXISTS relation_members (
                owner_id TEXT NOT NULL,
                relation TEXT NOT NULL,
                position INTEGER NOT NULL,
                target_id TEXT NOT NULL,
                PRIMARY KEY (owner_id, relation, position)
            );
            CREATE INDEX IF NOT EXISTS idx_relation_members_target ON relation_members(target_id);
            "#,
            )
            .into_diagnostic()?;

        let has_version: bool = self
            .conn
            .query_row("SELECT COUNT(*) > 0 FROM schema_version", [], |row| {
                row.get(0)
            })
            .into_diagnostic()?;
        if !has_version {
            self.conn
                .execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )
                .into_diagnostic()?;
        }

        Ok(())
    }
}
