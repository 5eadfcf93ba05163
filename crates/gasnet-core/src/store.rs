//! # Entity Store
//!
//! Generic identifier→record container, instantiated once per record kind.
//!
//! All data structures use `BTreeMap`/`BTreeSet`, so listings and query
//! results are ordered by numeric id regardless of insertion order.

use crate::RecordId;
use std::collections::{BTreeMap, BTreeSet};

/// An identifier-keyed collection of records of one kind.
///
/// The store owns its records and hands out ids from a counter that only
/// moves forward: deleting a record never frees its id. The counter is
/// recomputed only by `replace_all`. Once id `u64::MAX` has been used the
/// counter is exhausted and `create` refuses new records.
#[derive(Debug, Clone)]
pub struct EntityStore<R> {
    /// Record storage: RecordId -> R
    records: BTreeMap<RecordId, R>,

    /// Next id to assign; `None` once the id space is used up
    next_id: Option<RecordId>,
}

impl<R> Default for EntityStore<R> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: Some(RecordId::FIRST),
        }
    }
}

impl<R> EntityStore<R> {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under the next available id and return that id.
    ///
    /// Returns `None`, leaving the store unchanged, when no id is left.
    pub fn create(&mut self, record: R) -> Option<RecordId> {
        let id = self.next_id?;
        self.next_id = id.successor();
        self.records.insert(id, record);
        Some(id)
    }

    /// Remove a record. Returns whether a record was removed.
    pub fn delete(&mut self, id: RecordId) -> bool {
        self.records.remove(&id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut R> {
        self.records.get_mut(&id)
    }

    /// All `(id, record)` pairs in ascending id order.
    #[must_use]
    pub fn list(&self) -> Vec<(RecordId, &R)> {
        self.iter().collect()
    }

    /// Iterate `(id, record)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &R)> + '_ {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// All ids currently present.
    #[must_use]
    pub fn ids(&self) -> BTreeSet<RecordId> {
        self.records.keys().copied().collect()
    }

    #[must_use]
    pub fn exists(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The id the next `create` will assign, `None` if the ids are used up.
    #[must_use]
    pub fn next_id(&self) -> Option<RecordId> {
        self.next_id
    }

    /// Replace the whole collection.
    ///
    /// The previous records are dropped, not merged. The id counter becomes
    /// `max(id) + 1`, or 1 for an empty collection.
    pub fn replace_all(&mut self, records: BTreeMap<RecordId, R>) {
        self.next_id = records
            .keys()
            .next_back()
            .map_or(Some(RecordId::FIRST), |max| max.successor());
        self.records = records;
    }

    /// Ids of every record for which `predicate` holds.
    ///
    /// A linear scan over the live records on every call; there is no index.
    pub fn query<P>(&self, predicate: P) -> BTreeSet<RecordId>
    where
        P: Fn(&R) -> bool,
    {
        self.records
            .iter()
            .filter(|(_, record)| predicate(record))
            .map(|(id, _)| *id)
            .collect()
    }
}

impl<R: Clone> EntityStore<R> {
    /// Clone the records into a detached map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<RecordId, R> {
        self.records.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================
