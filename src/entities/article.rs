//! Article entity with many-to-many tags and one-to-many comments

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::relation::RelationError;
use crate::core::relation_set::RelationSet;
use crate::entities::{require_prefix, EntityTypeError, Record};

/// A published article
#[derive(Debug, Clone)]
pub struct Article {
    record: Record,
}

impl Article {
    pub const PREFIX: &'static str = "ART";
    pub const TAGS: &'static str = "tags";
    pub const COMMENTS: &'static str = "comments";

    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<Self, EntityTypeError> {
        let prefix = EntityPrefix::new(Self::PREFIX).map_err(EntityTypeError::Prefix)?;
        Self::try_from(Record::new(prefix, title, author))
    }

    pub fn tags_count(&mut self) -> Result<usize, RelationError> {
        self.record.relation_count(Self::TAGS)
    }

    pub fn comments_count(&mut self) -> Result<usize, RelationError> {
        self.record.relation_count(Self::COMMENTS)
    }

    pub fn tags(&mut self) -> Result<&[EntityId], RelationError> {
        self.record.relations_mut().materialize(Self::TAGS)
    }

    pub fn comments(&mut self) -> Result<&[EntityId], RelationError> {
        self.record.relations_mut().materialize(Self::COMMENTS)
    }

    pub fn add_tag(&mut self, tag: EntityId) -> Result<bool, RelationError> {
        self.record.relations_mut().add(Self::TAGS, tag)
    }

    pub fn remove_tag(&mut self, tag: &EntityId) -> Result<bool, RelationError> {
        self.record.relations_mut().remove(Self::TAGS, tag)
    }

    pub fn set_tags(&mut self, tags: impl IntoIterator<Item = EntityId>) {
        self.record.relations_mut().set(Self::TAGS, tags);
    }

    pub fn add_comment(&mut self, comment: EntityId) -> Result<bool, RelationError> {
        self.record.relations_mut().add(Self::COMMENTS, comment)
    }

    pub fn remove_comment(&mut self, comment: &EntityId) -> Result<bool, RelationError> {
        self.record.relations_mut().remove(Self::COMMENTS, comment)
    }

    pub fn into_record(self) -> Record {
        self.record
    }
}

impl TryFrom<Record> for Article {
    type Error = EntityTypeError;

    fn try_from(mut record: Record) -> Result<Self, Self::Error> {
        require_prefix(&record, Self::PREFIX)?;
        for name in [Self::TAGS, Self::COMMENTS] {
            if !record.relations().contains(name) {
                record.relations_mut().set(name, Vec::new());
            }
        }
        Ok(Self { record })
    }
}

impl Entity for Article {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::relation::RelationLoader;
    use std::cell::Cell;
    use std::rc::Rc;

    fn id(prefix: &str) -> EntityId {
        EntityId::new(EntityPrefix::new(prefix).unwrap())
    }

    struct NeverLoaded {
        calls: Cell<usize>,
    }

    impl RelationLoader for NeverLoaded {
        fn load_members(
            &self,
            _owner: &EntityId,
            _name: &str,
        ) -> Result<Vec<EntityId>, RelationError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_tag_and_comment_counts_are_independent() {
        let mut article = Article::new("Hello", "tester").unwrap();
        article.add_tag(id("TAG")).unwrap();
        article.add_comment(id("CMT")).unwrap();
        article.add_comment(id("CMT")).unwrap();

        assert_eq!(article.tags_count().unwrap(), 1);
        assert_eq!(article.comments_count().unwrap(), 2);

        article.add_tag(id("TAG")).unwrap();
        assert!(!article.relations().cache().is_cached(Article::TAGS));
        assert_eq!(article.relations().cache().cached(Article::COMMENTS), Some(2));
        assert_eq!(article.tags_count().unwrap(), 2);
    }

    #[test]
    fn test_lazy_tags_report_count_without_loading() {
        let mut article = Article::new("Hello", "tester").unwrap();
        let loader = Rc::new(NeverLoaded { calls: Cell::new(0) });
        article
            .relations_mut()
            .insert_lazy(Article::TAGS, 5, loader.clone());

        assert_eq!(article.tags_count().unwrap(), 5);
        assert_eq!(loader.calls.get(), 0);
        assert!(!article.relations().get(Article::TAGS).unwrap().is_materialized());
    }

    #[test]
    fn test_set_tags_replaces() {
        let mut article = Article::new("Hello", "tester").unwrap();
        article.set_tags(vec![id("TAG"), id("TAG"), id("TAG")]);
        assert_eq!(article.tags_count().unwrap(), 3);
        article.set_tags(Vec::new());
        assert_eq!(article.tags_count().unwrap(), 0);
        assert!(article.tags().unwrap().is_empty());
    }
}
