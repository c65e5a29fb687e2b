//! Keyed record storage
//!
//! String key → record. Every service owns exactly one store for its own
//! record type; nothing else writes to it.

use std::collections::BTreeMap;

use types::errors::ServiceError;
use types::Keyed;

/// Map from string key to a domain record.
///
/// Uses `BTreeMap` for deterministic iteration order.
#[derive(Debug, Clone)]
pub struct KeyedStore<V> {
    records: BTreeMap<String, V>,
}

impl<V> KeyedStore<V> {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Look up a record, failing with `NotFound` when absent.
    pub fn get(&self, key: &str) -> Result<&V, ServiceError> {
        self.records
            .get(key)
            .ok_or_else(|| ServiceError::not_found(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut V, ServiceError> {
        self.records
            .get_mut(key)
            .ok_or_else(|| ServiceError::not_found(key))
    }

    /// Insert under an explicit key. Returns the replaced record, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.records.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Result<V, ServiceError> {
        self.records
            .remove(key)
            .ok_or_else(|| ServiceError::not_found(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.records.values()
    }
}

impl<V: Keyed> KeyedStore<V> {
    /// Insert or replace under the record's natural key.
    pub fn upsert(&mut self, value: V) -> Option<V> {
        let key = value.key();
        self.records.insert(key, value)
    }
}

impl<V> Default for KeyedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
