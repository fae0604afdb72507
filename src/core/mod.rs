//! Core module - fundamental types and utilities

pub mod config;
pub mod count_cache;
pub mod document;
pub mod entity;
pub mod identity;
pub mod index;
pub mod project;
pub mod relation;
pub mod relation_set;

pub use config::Config;
pub use count_cache::RelationCountCache;
pub use document::EntityDocument;
pub use entity::Entity;
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use index::{EntityIndex, IndexStats, SyncStats};
pub use project::{Project, ProjectError};
pub use relation::{Countable, LazyRelation, Relation, RelationError, RelationLoader};
pub use relation_set::RelationSet;
