//! Index type definitions

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Entity metadata stored in the index
#[derive(Debug, Clone)]
pub struct IndexedEntity {
    pub id: String,
    pub prefix: String,
    pub title: String,
    pub author: String,
    pub created: DateTime<Utc>,
    pub tags: Vec<String>,
    pub file_path: PathBuf,
}

/// A search hit
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchResult {
    pub id: String,
    pub prefix: String,
    pub title: String,
    pub author: String,
}

/// Outcome of a rebuild or sync
#[derive(Debug, Default)]
pub struct SyncStats {
    pub files_scanned: usize,
    pub entities_added: usize,
    pub entities_updated: usize,
    pub entities_removed: usize,
    pub files_failed: usize,
    pub duration_ms: u64,
}

/// Index statistics
#[derive(Debug, Default)]
pub struct IndexStats {
    pub total_entities: usize,
    pub total_relations: usize,
    pub total_members: usize,
    pub by_prefix: HashMap<String, usize>,
    pub db_size_bytes: u64,
}
