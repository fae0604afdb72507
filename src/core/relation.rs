//! Relation representations
//!
//! A relation is either a lazy placeholder that already knows its size
//! (for example, a record loaded from the index) or a materialized list of
//! member ids. Counting never forces a lazy relation to load.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::core::identity::EntityId;

/// Errors raised while counting, loading or mutating relations
#[derive(Debug, Error)]
pub enum RelationError {
    #[error("entity {owner} has no relation named '{name}'")]
    UnknownRelation { owner: String, name: String },

    #[error("failed to load relation '{name}' of {owner}: {reason}")]
    LoadFailed {
        owner: String,
        name: String,
        reason: String,
    },
}

/// Something whose cardinality can be counted
pub trait Countable {
    /// Size known without materializing, if available
    fn known_len(&self) -> Option<usize>;

    /// Size of the fully materialized collection
    fn materialized_len(&self) -> Result<usize, RelationError>;
}

/// Compute the true cardinality, preferring the cheap known size
pub fn true_count<C: Countable + ?Sized>(relation: &C) -> Result<usize, RelationError> {
    match relation.known_len() {
        Some(len) => Ok(len),
        None => relation.materialized_len(),
    }
}

/// Source of relation members for lazy placeholders
pub trait RelationLoader {
    /// Load the ordered member ids of `owner`'s relation `name`
    fn load_members(&self, owner: &EntityId, name: &str) -> Result<Vec<EntityId>, RelationError>;
}

/// A relation that has not been loaded yet
#[derive(Clone)]
pub struct LazyRelation {
    owner: EntityId,
    name: String,
    known_len: usize,
    loader: Rc<dyn RelationLoader>,
}

impl LazyRelation {
    pub fn new(
        owner: EntityId,
        name: impl Into<String>,
        known_len: usize,
        loader: Rc<dyn RelationLoader>,
    ) -> Self {
        Self {
            owner,
            name: name.into(),
            known_len,
            loader,
        }
    }

    /// Number of members reported by storage, without loading them
    pub fn known_len(&self) -> usize {
        self.known_len
    }

    /// Fetch the members from the loader
    pub fn load(&self) -> Result<Vec<EntityId>, RelationError> {
        tracing::debug!(owner = %self.owner, relation = %self.name, "materializing relation");
        self.loader.load_members(&self.owner, &self.name)
    }
}

impl fmt::Debug for LazyRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRelation")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("known_len", &self.known_len)
            .finish_non_exhaustive()
    }
}

/// A named relation held by an entity
#[derive(Debug, Clone)]
pub enum Relation {
    /// Not loaded; size known from storage metadata
    Lazy(LazyRelation),
    /// Fully loaded member ids, in insertion order, without duplicates
    Loaded(Vec<EntityId>),
}

impl Relation {
    /// Create a lazy placeholder
    pub fn lazy(
        owner: EntityId,
        name: impl Into<String>,
        known_len: usize,
        loader: Rc<dyn RelationLoader>,
    ) -> Self {
        Relation::Lazy(LazyRelation::new(owner, name, known_len, loader))
    }

    /// Create a materialized relation, dropping duplicate ids
    pub fn loaded(members: impl IntoIterator<Item = EntityId>) -> Self {
        let mut unique: Vec<EntityId> = Vec::new();
        for id in members {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Relation::Loaded(unique)
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self, Relation::Loaded(_))
    }

    /// Members, if already materialized
    pub fn members(&self) -> Option<&[EntityId]> {
        match self {
            Relation::Loaded(members) => Some(members),
            Relation::Lazy(_) => None,
        }
    }

    /// Load the members if needed and return them
    pub fn materialize(&mut self) -> Result<&[EntityId], RelationError> {
        Ok(self.members_mut()?.as_slice())
    }

    /// Mutable access to the members, materializing first.
    ///
    /// Only `RelationSet` may call this; it invalidates counts around it.
    pub(crate) fn members_mut(&mut self) -> Result<&mut Vec<EntityId>, RelationError> {
        if let Relation::Lazy(lazy) = self {
            let members = lazy.load()?;
            *self = Relation::loaded(members);
        }
        match self {
            Relation::Loaded(members) => Ok(members),
            Relation::Lazy(lazy) => Err(RelationError::LoadFailed {
                owner: lazy.owner.to_string(),
                name: lazy.name.clone(),
                reason: "relation is still lazy after loading".to_string(),
            }),
        }
    }
}

impl Countable for Relation {
    fn known_len(&self) -> Option<usize> {
        match self {
            Relation::Lazy(lazy) => Some(lazy.known_len()),
            Relation::Loaded(_) => None,
        }
    }

    fn materialized_len(&self) -> Result<usize, RelationError> {
        match self {
            Relation::Loaded(members) => Ok(members.len()),
            Relation::Lazy(lazy) => lazy.load().map(|members| members.len()),
        }
    }
}
