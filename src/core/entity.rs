//! Entity trait - common interface for all entity types

use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::relation::RelationError;
use crate::core::relation_set::RelationSet;

/// Common trait for all entities that own relations
pub trait Entity {
    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Get the entity type prefix
    fn prefix(&self) -> &EntityPrefix {
        self.id().prefix()
    }

    /// Get the entity's title
    fn title(&self) -> &str;

    /// Read access to the entity's relations
    fn relations(&self) -> &RelationSet;

    /// Mutation access; all changes go through `RelationSet`'s mutators
    fn relations_mut(&mut self) -> &mut RelationSet;

    /// Cached cardinality of a named relation
    fn relation_count(&mut self, name: &str) -> Result<usize, RelationError> {
        self.relations_mut().count(name)
    }
}
