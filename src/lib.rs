//! relcache: relation-count caching for plain-text entity files
//!
//! Entities live as YAML files and own named relations to other entities.
//! Each entity instance memoizes the size of its relations and drops the
//! memoized value whenever a relation changes. A local SQLite index can
//! report relation sizes without loading members, so records loaded from
//! it start with lazy relations.

pub mod cli;
pub mod core;
pub mod entities;
