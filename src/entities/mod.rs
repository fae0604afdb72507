//! Entity type definitions
//!
//! - [`Record`] - any entity type, with whatever relations its file declares
//! - [`Order`] - an order and its `items`
//! - [`Article`] - an article with `tags` and `comments`

pub mod article;
pub mod order;
pub mod record;

pub use article::Article;
pub use order::Order;
pub use record::Record;

use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::IdParseError;

/// Errors converting a generic record into a typed entity
#[derive(Debug, Error)]
pub enum EntityTypeError {
    #[error("expected a {expected} entity, got {actual}")]
    WrongPrefix { expected: String, actual: String },

    #[error(transparent)]
    Prefix(#[from] IdParseError),
}

/// Give a record the relations its type always carries.
///
/// `ORD` records get `items` and `ART` records get `tags` and `comments`,
/// each empty when the file does not list it. Other prefixes pass through.
pub fn with_declared_relations(record: Record) -> Result<Record, EntityTypeError> {
    let prefix = record.prefix().as_str().to_string();
    match prefix.as_str() {
        Order::PREFIX => Ok(Order::try_from(record)?.into_record()),
        Article::PREFIX => Ok(Article::try_from(record)?.into_record()),
        _ => Ok(record),
    }
}

fn require_prefix(record: &Record, expected: &str) -> Result<(), EntityTypeError> {
    let actual = record.prefix().as_str();
    if actual != expected {
        return Err(EntityTypeError::WrongPrefix {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{EntityId, EntityPrefix};

    fn record(prefix: &str) -> Record {
        Record::new(EntityPrefix::new(prefix).unwrap(), "Title", "tester")
    }

    #[test]
    fn test_order_record_gets_empty_items() {
        let mut order = with_declared_relations(record("ORD")).unwrap();
        assert_eq!(order.relation_count(Order::ITEMS).unwrap(), 0);
    }

    #[test]
    fn test_article_record_gets_tags_and_comments() {
        let article = with_declared_relations(record("ART")).unwrap();
        let names: Vec<&str> = article.relations().names().collect();
        assert_eq!(names, vec![Article::COMMENTS, Article::TAGS]);
    }

    #[test]
    fn test_other_prefixes_are_untouched() {
        let item = with_declared_relations(record("ITM")).unwrap();
        assert!(item.relations().is_empty());
    }

    #[test]
    fn test_existing_members_are_kept() {
        let mut base = record("ORD");
        let item = EntityId::new(EntityPrefix::new("ITM").unwrap());
        base.relations_mut().add(Order::ITEMS, item).unwrap();

        let mut order = with_declared_relations(base).unwrap();
        assert_eq!(order.relation_count(Order::ITEMS).unwrap(), 1);
    }
}
