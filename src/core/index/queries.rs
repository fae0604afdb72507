//! Query methods for entities and relation counts

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use miette::{IntoDiagnostic, Result};
use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, EntityIndex, IndexedEntity, SearchResult};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::relation::{RelationError, RelationLoader};
use crate::core::relation_set::RelationSet;
use crate::entities::{with_declared_relations, Record};

/// Escape `LIKE` wildcards so user input matches literally.
///
/// Use together with `ESCAPE '\'` in the SQL.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl EntityIndex {
    /// Get entity metadata by full ID
    pub fn get_entity(&self, id: &str) -> Result<Option<IndexedEntity>> {
        self.conn
            .query_row(
                r#"SELECT id, prefix, title, author, created, tags, file_path
                   FROM entities WHERE id = ?1"#,
                params![id],
                |row| {
                    let tags_str: Option<String> = row.get(5)?;
                    let tags = tags_str
                        .map(|s| s.split(',').filter(|t| !t.is_empty()).map(String::from).collect())
                        .unwrap_or_default();
                    Ok(IndexedEntity {
                        id: row.get(0)?,
                        prefix: row.get(1)?,
                        title: row.get(2)?,
                        author: row.get(3)?,
                        created: parse_datetime(row.get::<_, String>(4)?),
                        tags,
                        file_path: PathBuf::from(row.get::<_, String>(6)?),
                    })
                },
            )
            .optional()
            .into_diagnostic()
    }

    /// Resolve a full or partial (leading) ID to exactly one entity
    pub fn resolve_id(&self, partial: &str) -> Result<EntityId> {
        let needle = partial.trim().to_ascii_uppercase();
        if needle.is_empty() {
            return Err(miette::miette!("Empty entity ID"));
        }

        if self.get_entity(&needle)?.is_some() {
            return EntityId::parse(&needle).into_diagnostic();
        }

        let pattern = format!("{}%", escape_like(&needle));
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM entities WHERE id LIKE ?1 ESCAPE '\\' ORDER BY id LIMIT 2")
            .into_diagnostic()?;
        let matches: Vec<String> = stmt
            .query_map(params![pattern], |row| row.get(0))
            .into_diagnostic()?
            .collect::<std::result::Result<_, _>>()
            .into_diagnostic()?;

        match matches.as_slice() {
            [] => Err(miette::miette!("No entity found matching '{}'", partial)),
            [only] => EntityId::parse(only).into_diagnostic(),
            _ => Err(miette::miette!(
                "'{}' is ambiguous; use more characters of the ID",
                partial
            )),
        }
    }

    /// Cardinality of every relation of `owner`, without reading members
    pub fn relation_counts(&self, owner: &EntityId) -> Result<BTreeMap<String, usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT relation, member_count FROM relations WHERE owner_id = ?1")
            .into_diagnostic()?;
        let rows = stmt
            .query_map(params![owner.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .into_diagnostic()?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (name, count) = row.into_diagnostic()?;
            counts.insert(name, usize::try_from(count).unwrap_or(0));
        }
        Ok(counts)
    }

    /// Cardinality of one relation, or `None` if the owner has no such relation
    pub fn relation_count(&self, owner: &EntityId, name: &str) -> Result<Option<usize>> {
        let count: Option<i64> = self
            .conn
            .query_row(
                "SELECT member_count FROM relations WHERE owner_id = ?1 AND relation = ?2",
                params![owner.to_string(), name],
                |row| row.get(0),
            )
            .optional()
            .into_diagnostic()?;
        Ok(count.map(|c| usize::try_from(c).unwrap_or(0)))
    }

    /// Ordered members of one relation
    pub fn members(&self, owner: &EntityId, name: &str) -> Result<Vec<EntityId>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"SELECT target_id FROM relation_members
                   WHERE owner_id = ?1 AND relation = ?2
                   ORDER BY position"#,
            )
            .into_diagnostic()?;
        let rows = stmt
            .query_map(params![owner.to_string(), name], |row| {
                row.get::<_, String>(0)
            })
            .into_diagnostic()?;

        let mut members = Vec::new();
        for row in rows {
            let raw = row.into_diagnostic()?;
            members.push(EntityId::parse(&raw).into_diagnostic()?);
        }
        Ok(members)
    }

    /// Load a record whose relations are lazy placeholders.
    ///
    /// Only entity metadata and relation counts are read; members are
    /// fetched when a relation is materialized. Relations the entity's type
    /// always carries are present even if its file omits them.
    pub fn load_record(self: &Rc<Self>, id: &EntityId) -> Result<Record> {
        let loader: Rc<dyn RelationLoader> = self.clone();
        self.load_record_with(id, loader)
    }

    /// Like [`load_record`](Self::load_record), with members fetched through `loader`
    pub(crate) fn load_record_with(
        &self,
        id: &EntityId,
        loader: Rc<dyn RelationLoader>,
    ) -> Result<Record> {
        let entity = self
            .get_entity(&id.to_string())?
            .ok_or_else(|| miette::miette!("Entity {} is not in the index", id))?;

        let mut relations = RelationSet::new(id.clone());
        for (name, count) in self.relation_counts(id)? {
            relations.insert_lazy(&name, count, loader.clone());
        }

        let record = Record::from_parts(
            id.clone(),
            entity.title,
            entity.author,
            entity.created,
            entity.tags,
            relations,
        );
        with_declared_relations(record).into_diagnostic()
    }

    /// Case-insensitive title search; wildcards in `query` match literally
    pub fn search(
        &self,
        query: &str,
        prefix: Option<&EntityPrefix>,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let mut sql = String::from(
            r#"SELECT id, prefix, title, author
               FROM entities
               WHERE LOWER(title) LIKE LOWER(?1) ESCAPE '\'"#,
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> =
            vec![Box::new(format!("%{}%", escape_like(query)))];

        if let Some(prefix) = prefix {
            sql.push_str(" AND prefix = ?2");
            params_vec.push(Box::new(prefix.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created DESC, id");
        sql.push_str(&format!(" LIMIT {}", limit));

        let mut stmt = self.conn.prepare(&sql).into_diagnostic()?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok(SearchResult {
                    id: row.get(0)?,
                    prefix: row.get(1)?,
                    title: row.get(2)?,
                    author: row.get(3)?,
                })
            })
            .into_diagnostic()?;

        rows.collect::<std::result::Result<_, _>>().into_diagnostic()
    }
}

impl RelationLoader for EntityIndex {
    fn load_members(&self, owner: &EntityId, name: &str) -> Result<Vec<EntityId>, RelationError> {
        self.members(owner, name)
            .map_err(|e| RelationError::LoadFailed {
                owner: owner.to_string(),
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}
