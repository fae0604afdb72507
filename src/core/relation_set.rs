//! Named relations of one entity, guarded by its count cache
//!
//! `RelationSet` is the only way to change an entity's relations. Each
//! mutator invalidates the relation's cached count before it touches the
//! collection, and the raw member lists are never handed out mutably.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::core::count_cache::RelationCountCache;
use crate::core::identity::EntityId;
use crate::core::relation::{Relation, RelationError, RelationLoader};

/// The relations owned by a single entity instance
#[derive(Debug, Clone)]
pub struct RelationSet {
    owner: EntityId,
    relations: BTreeMap<String, Relation>,
    counts: RelationCountCache,
}

impl RelationSet {
    /// Empty set for `owner`
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            relations: BTreeMap::new(),
            counts: RelationCountCache::new(),
        }
    }

    /// Build a set of materialized relations
    pub fn from_members(owner: EntityId, members: BTreeMap<String, Vec<EntityId>>) -> Self {
        let relations = members
            .into_iter()
            .map(|(name, ids)| (name, Relation::loaded(ids)))
            .collect();
        Self {
            owner,
            relations,
            counts: RelationCountCache::new(),
        }
    }

    pub fn owner(&self) -> &EntityId {
        &self.owner
    }

    /// Read-only view of a relation
    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Relation names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// The count cache, for inspection
    pub fn cache(&self) -> &RelationCountCache {
        &self.counts
    }

    /// Cardinality of `name`, served from the cache when possible
    pub fn count(&mut self, name: &str) -> Result<usize, RelationError> {
        let relation = self
            .relations
            .get(name)
            .ok_or_else(|| self.unknown(name))?;
        self.counts.get_count(name, relation)
    }

    /// Cardinality of every relation
    pub fn counts(&mut self) -> Result<BTreeMap<String, usize>, RelationError> {
        let names: Vec<String> = self.relations.keys().cloned().collect();
        let mut out = BTreeMap::new();
        for name in names {
            let count = self.count(&name)?;
            out.insert(name, count);
        }
        Ok(out)
    }

    /// Replace the members of `name` (creating the relation if needed)
    pub fn set(&mut self, name: &str, members: impl IntoIterator<Item = EntityId>) {
        self.counts.invalidate(name);
        self.relations
            .insert(name.to_string(), Relation::loaded(members));
    }

    /// Add `id` to `name`, creating the relation if needed.
    ///
    /// Returns `false` if the id was already a member.
    pub fn add(&mut self, name: &str, id: EntityId) -> Result<bool, RelationError> {
        self.counts.invalidate(name);
        let members = self
            .relations
            .entry(name.to_string())
            .or_insert_with(|| Relation::Loaded(Vec::new()))
            .members_mut()?;
        if members.contains(&id) {
            return Ok(false);
        }
        members.push(id);
        Ok(true)
    }

    /// Remove `id` from `name`. Returns `false` if it was not a member.
    pub fn remove(&mut self, name: &str, id: &EntityId) -> Result<bool, RelationError> {
        self.counts.invalidate(name);
        let Some(relation) = self.relations.get_mut(name) else {
            return Ok(false);
        };
        let members = relation.members_mut()?;
        let before = members.len();
        members.retain(|m| m != id);
        Ok(members.len() != before)
    }

    /// Register a relation whose size is known but whose members are not loaded
    pub fn insert_lazy(
        &mut self,
        name: &str,
        known_len: usize,
        loader: Rc<dyn RelationLoader>,
    ) {
        self.counts.invalidate(name);
        let relation = Relation::lazy(self.owner.clone(), name, known_len, loader);
        self.relations.insert(name.to_string(), relation);
    }

    /// Load the members of `name` if they are not loaded yet
    pub fn materialize(&mut self, name: &str) -> Result<&[EntityId], RelationError> {
        let unknown = self.unknown(name);
        let relation = self.relations.get_mut(name).ok_or(unknown)?;
        if !relation.is_materialized() {
            self.counts.invalidate(name);
        }
        relation.materialize()
    }

    /// Materialize every relation and return plain member lists
    pub fn to_members_map(&mut self) -> Result<BTreeMap<String, Vec<EntityId>>, RelationError> {
        let names: Vec<String> = self.relations.keys().cloned().collect();
        let mut out = BTreeMap::new();
        for name in names {
            let members = self.materialize(&name)?.to_vec();
            out.insert(name, members);
        }
        Ok(out)
    }

    fn unknown(&self, name: &str) -> RelationError {
        RelationError::UnknownRelation {
            owner: self.owner.to_string(),
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use std::cell::Cell;

    fn id(prefix: &str) -> EntityId {
        EntityId::new(EntityPrefix::new(prefix).unwrap())
    }

    struct StubLoader {
        members: Vec<EntityId>,
        calls: Cell<usize>,
    }

    impl RelationLoader for StubLoader {
        fn load_members(
            &self,
            _owner: &EntityId,
            _name: &str,
        ) -> Result<Vec<EntityId>, RelationError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.members.clone())
        }
    }

    fn order_with_items(n: usize) -> RelationSet {
        let mut set = RelationSet::new(id("ORD"));
        set.set("items", (0..n).map(|_| id("ITM")));
        set
    }

    #[test]
    fn test_add_invalidates_and_next_count_sees_new_member() {
        let mut set = order_with_items(3);
        assert_eq!(set.count("items").unwrap(), 3);
        assert_eq!(set.cache().cached("items"), Some(3));

        assert!(set.add("items", id("ITM")).unwrap());
        assert!(!set.cache().is_cached("items"));
        assert_eq!(set.count("items").unwrap(), 4);
    }

    #[test]
    fn test_remove_invalidates() {
        let mut set = RelationSet::new(id("ORD"));
        let first = id("ITM");
        set.set("items", vec![first.clone(), id("ITM")]);
        assert_eq!(set.count("items").unwrap(), 2);

        assert!(set.remove("items", &first).unwrap());
        assert_eq!(set.count("items").unwrap(), 1);
        assert!(!set.remove("items", &first).unwrap());
    }

    #[test]
    fn test_set_replaces_and_invalidates() {
        let mut set = order_with_items(3);
        assert_eq!(set.count("items").unwrap(), 3);

        set.set("items", vec![id("ITM")]);
        assert_eq!(set.count("items").unwrap(), 1);
    }

    #[test]
    fn test_add_duplicate_is_ignored() {
        let mut set = RelationSet::new(id("ART"));
        let tag = id("TAG");
        assert!(set.add("tags", tag.clone()).unwrap());
        assert!(!set.add("tags", tag).unwrap());
        assert_eq!(set.count("tags").unwrap(), 1);
    }

    #[test]
    fn test_count_unknown_relation_errors() {
        let mut set = RelationSet::new(id("ART"));
        let err = set.count("tags").unwrap_err();
        assert!(matches!(err, RelationError::UnknownRelation { .. }));
    }

    #[test]
    fn test_remove_from_unknown_relation_is_false() {
        let mut set = RelationSet::new(id("ART"));
        assert!(!set.remove("tags", &id("TAG")).unwrap());
        assert!(!set.contains("tags"));
    }

    #[test]
    fn test_lazy_relation_counts_without_loading() {
        let loader = Rc::new(StubLoader {
            members: (0..5).map(|_| id("TAG")).collect(),
            calls: Cell::new(0),
        });
        let mut set = RelationSet::new(id("ART"));
        set.insert_lazy("tags", 5, loader.clone());

        assert_eq!(set.count("tags").unwrap(), 5);
        assert_eq!(set.count("tags").unwrap(), 5);
        assert_eq!(loader.calls.get(), 0);
        assert!(!set.get("tags").unwrap().is_materialized());
    }

    #[test]
    fn test_add_to_lazy_relation_materializes_first() {
        let loader = Rc::new(StubLoader {
            members: (0..5).map(|_| id("TAG")).collect(),
            calls: Cell::new(0),
        });
        let mut set = RelationSet::new(id("ART"));
        set.insert_lazy("tags", 5, loader.clone());
        assert_eq!(set.count("tags").unwrap(), 5);

        set.add("tags", id("TAG")).unwrap();

        assert_eq!(loader.calls.get(), 1);
        assert_eq!(set.count("tags").unwrap(), 6);
        assert!(set.get("tags").unwrap().is_materialized());
    }

    #[test]
    fn test_counts_and_members_map() {
        let mut set = order_with_items(2);
        set.set("notes", Vec::new());

        let counts = set.counts().unwrap();
        assert_eq!(counts.get("items"), Some(&2));
        assert_eq!(counts.get("notes"), Some(&0));

        let map = set.to_members_map().unwrap();
        assert_eq!(map["items"].len(), 2);
        assert!(map["notes"].is_empty());
    }
}
