//! Generic entity record
//!
//! A `Record` can hold any entity type: it carries the common fields and
//! whatever relations the entity file declares.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::core::document::EntityDocument;
use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::relation::RelationError;
use crate::core::relation_set::RelationSet;

/// An entity of any type, with its relations
#[derive(Debug, Clone)]
pub struct Record {
    id: EntityId,
    title: String,
    author: String,
    created: DateTime<Utc>,
    tags: Vec<String>,
    relations: RelationSet,
}

impl Record {
    /// Create a new record with a fresh ID and no relations
    pub fn new(
        prefix: EntityPrefix,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        let id = EntityId::new(prefix);
        Self {
            relations: RelationSet::new(id.clone()),
            id,
            title: title.into(),
            author: author.into(),
            created: Utc::now(),
            tags: Vec::new(),
        }
    }

    /// Assemble a record from already-built parts
    pub fn from_parts(
        id: EntityId,
        title: String,
        author: String,
        created: DateTime<Utc>,
        tags: Vec<String>,
        relations: RelationSet,
    ) -> Self {
        Self {
            id,
            title,
            author,
            created,
            tags,
            relations,
        }
    }

    /// Build a record with materialized relations from an entity file
    pub fn from_document(doc: EntityDocument) -> Self {
        let relations = RelationSet::from_members(doc.id.clone(), doc.relations);
        Self {
            id: doc.id,
            title: doc.title,
            author: doc.author,
            created: doc.created,
            tags: doc.tags,
            relations,
        }
    }

    /// Serializable form; lazy relations are loaded first
    pub fn to_document(&mut self) -> Result<EntityDocument, RelationError> {
        let relations: BTreeMap<String, Vec<EntityId>> = self.relations.to_members_map()?;
        Ok(EntityDocument {
            id: self.id.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            created: self.created,
            tags: self.tags.clone(),
            relations,
        })
    }
}

impl Entity for Record {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn relations(&self) -> &RelationSet {
        &self.relations
    }

    fn relations_mut(&mut self) -> &mut RelationSet {
        &mut self.relations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(s: &str) -> EntityPrefix {
        EntityPrefix::new(s).unwrap()
    }

    #[test]
    fn test_record_document_roundtrip_keeps_relations() {
        let mut record = Record::new(prefix("ORD"), "Order", "tester");
        let item = EntityId::new(prefix("ITM"));
        record.relations_mut().add("items", item.clone()).unwrap();

        let doc = record.to_document().unwrap();
        assert_eq!(doc.relations["items"], vec![item]);

        let mut back = Record::from_document(doc);
        assert_eq!(back.id(), record.id());
        assert_eq!(back.relation_count("items").unwrap(), 1);
    }

    #[test]
    fn test_record_from_document_starts_with_empty_cache() {
        let mut record = Record::new(prefix("ART"), "Post", "tester");
        record.relations_mut().set("tags", Vec::new());
        record.relation_count("tags").unwrap();
        assert!(record.relations().cache().is_cached("tags"));

        let copy = Record::from_document(record.to_document().unwrap());
        assert!(copy.relations().cache().is_empty());
    }
}
