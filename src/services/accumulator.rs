//! Identity-keyed store of crawled entities.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::models::{Entity, RankingKey};

/// Deduplicated entities in first-seen order.
///
/// Re-observing an identity replaces the stored record in place.
#[derive(Debug)]
pub struct Accumulator<E> {
    index: HashMap<u64, usize>,
    entries: Vec<E>,
}

impl<E: Entity> Accumulator<E> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert or replace by identity. Returns true if the identity is new.
    pub fn upsert(&mut self, entity: E) -> bool {
        match self.index.get(&entity.id()) {
            Some(&slot) => {
                self.entries[slot] = entity;
                false
            }
            None => {
                self.index.insert(entity.id(), self.entries.len());
                self.entries.push(entity);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entities sorted descending by `key`, keeping first-seen order among
    /// ties, cut to `limit`.
    pub fn into_ranked(self, key: RankingKey, limit: usize) -> Vec<E> {
        let mut entries = self.entries;
        entries.sort_by_key(|e| Reverse(e.score(key).unwrap_or(0)));
        entries.truncate(limit);
        entries
    }
}
