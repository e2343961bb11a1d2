//! Insertion-ordered mapping from entity identifiers to entities.

use indexmap::IndexMap;
use std::hash::Hash;

/// Ordered collection of entities keyed by identifier.
///
/// Iteration follows insertion order; re-inserting an existing key replaces
/// the value in place without moving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMap<K, V>
where
    K: Hash + Eq,
{
    entries: IndexMap<K, V>,
}

impl<K, V> EntityMap<K, V>
where
    K: Hash + Eq,
{
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Inserts an entity, returning the value it replaced.
    pub fn insert(&mut self, id: K, entity: V) -> Option<V> {
        self.entries.insert(id, entity)
    }

    /// Returns the entity for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &K) -> Option<&V> {
        self.entries.get(id)
    }

    /// Returns `true` when an entity is stored for `id`.
    #[must_use]
    pub fn contains(&self, id: &K) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the map holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over identifiers in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Iterates over entities in order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// Iterates over `(id, entity)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Consumes the map, yielding entities in order.
    pub fn into_values(self) -> impl Iterator<Item = V> {
        self.entries.into_values()
    }
}

impl<K, V> Default for EntityMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for EntityMap<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K, V> IntoIterator for EntityMap<K, V>
where
    K: Hash + Eq,
{
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
