//! Order entity: an order and its line items

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::relation::RelationError;
use crate::core::relation_set::RelationSet;
use crate::entities::{require_prefix, EntityTypeError, Record};

/// An order holding a one-to-many `items` relation
#[derive(Debug, Clone)]
pub struct Order {
    record: Record,
}

impl Order {
    pub const PREFIX: &'static str = "ORD";
    pub const ITEMS: &'static str = "items";

    /// Create a new, empty order
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<Self, EntityTypeError> {
        let prefix = EntityPrefix::new(Self::PREFIX).map_err(EntityTypeError::Prefix)?;
        Self::try_from(Record::new(prefix, title, author))
    }

    /// Number of items, cached until the items change
    pub fn items_count(&mut self) -> Result<usize, RelationError> {
        self.record.relation_count(Self::ITEMS)
    }

    /// Item ids, loading them if necessary
    pub fn items(&mut self) -> Result<&[EntityId], RelationError> {
        self.record.relations_mut().materialize(Self::ITEMS)
    }

    pub fn add_item(&mut self, item: EntityId) -> Result<bool, RelationError> {
        self.record.relations_mut().add(Self::ITEMS, item)
    }

    pub fn remove_item(&mut self, item: &EntityId) -> Result<bool, RelationError> {
        self.record.relations_mut().remove(Self::ITEMS, item)
    }

    pub fn set_items(&mut self, items: impl IntoIterator<Item = EntityId>) {
        self.record.relations_mut().set(Self::ITEMS, items);
    }

    /// Give back the underlying record
    pub fn into_record(self) -> Record {
        self.record
    }
}

impl TryFrom<Record> for Order {
    type Error = EntityTypeError;

    fn try_from(mut record: Record) -> Result<Self, Self::Error> {
        require_prefix(&record, Self::PREFIX)?;
        if !record.relations().contains(Self::ITEMS) {
            record.relations_mut().set(Self::ITEMS, Vec::new());
        }
        Ok(Self { record })
    }
}

impl Entity for Order {
    fn id(&self) -> &EntityId {
        self.record.id()
    }

    fn title(&self) -> &str {
        self.record.title()
    }

    fn relations(&self) -> &RelationSet {
        self.record.relations()
    }

    fn relations_mut(&mut self) -> &mut RelationSet {
        self.record.relations_mut()
    }
}
