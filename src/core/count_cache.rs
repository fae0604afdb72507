//! Per-entity memoization of relation cardinality
//!
//! Each entity instance owns one `RelationCountCache`. An entry exists only
//! if the count was computed since the relation was last invalidated, and
//! every relation mutator must call [`RelationCountCache::invalidate`]
//! before touching the collection. The cache is not shared between
//! instances: two copies of the same entity keep independent counts.

use std::collections::HashMap;

use crate::core::relation::{true_count, Countable, RelationError};

/// Cached relation counts for a single entity instance
#[derive(Debug, Clone, Default)]
pub struct RelationCountCache {
    counts: HashMap<String, usize>,
}

impl RelationCountCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached count for `name`, computing and storing it on a miss.
    pub fn get_count<C: Countable + ?Sized>(
        &mut self,
        name: &str,
        relation: &C,
    ) -> Result<usize, RelationError> {
        if let Some(&count) = self.counts.get(name) {
            tracing::trace!(relation = name, count, "relation count cache hit");
            return Ok(count);
        }

        let count = true_count(relation)?;
        tracing::trace!(relation = name, count, "relation count cache fill");
        self.counts.insert(name.to_string(), count);
        Ok(count)
    }

    /// Drop any cached count for `name`. Absent entries are ignored.
    pub fn invalidate(&mut self, name: &str) {
        if self.counts.remove(name).is_some() {
            tracing::trace!(relation = name, "relation count invalidated");
        }
    }

    /// Peek at a cached count without computing
    pub fn cached(&self, name: &str) -> Option<usize> {
        self.counts.get(name).copied()
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.counts.contains_key(name)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Drop every cached count
    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
