//! In-memory task store with optional expiry and capacity bounds.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

use crate::task::{
    domain::{Task, TaskId},
    ports::TaskCacheStore,
};

/// Retention rules applied by [`InMemoryTaskCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheRetention {
    /// Entries older than this are treated as absent and dropped on access.
    pub time_to_live: Option<Duration>,
    /// Upper bound on stored entries; the oldest entry is evicted first.
    ///
    /// Finding the oldest entry scans the whole store, so a put at capacity
    /// costs time linear in `max_entries`.
    pub max_entries: Option<usize>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    task: Task,
    stored_at: DateTime<Utc>,
}

/// Thread-safe task store keyed by task identifier.
pub struct InMemoryTaskCache<C> {
    entries: DashMap<TaskId, CacheEntry>,
    retention: CacheRetention,
    clock: Arc<C>,
}

impl<C> InMemoryTaskCache<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an unbounded store that never expires entries.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self::with_retention(clock, CacheRetention::default())
    }

    /// Creates a store applying the given retention rules.
    #[must_use]
    pub fn with_retention(clock: Arc<C>, retention: CacheRetention) -> Self {
        Self {
            entries: DashMap::new(),
            retention,
            clock,
        }
    }

    /// Returns the number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        self.retention
            .time_to_live
            .is_some_and(|ttl| now - entry.stored_at >= ttl)
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.stored_at)
            .map(|entry| entry.key().clone());
        if let Some(id) = oldest {
            debug!(task = %id, "evicting oldest cache entry");
            self.entries.remove(&id);
        }
    }
}

impl<C> std::fmt::Debug for InMemoryTaskCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTaskCache")
            .field("entries", &self.entries.len())
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

impl<C> TaskCacheStore for InMemoryTaskCache<C>
where
    C: Clock + Send + Sync,
{
    fn get(&self, id: &TaskId) -> Option<Task> {
        let now = self.clock.utc();
        let entry = self.entries.get(id)?.clone();
        if self.is_expired(&entry, now) {
            debug!(task = %id, "dropping expired cache entry");
            // A concurrent put may have replaced the entry since it was read.
            self.entries.remove_if(id, |_, current| self.is_expired(current, now));
            return None;
        }
        Some(entry.task)
    }

    fn put(&self, task: Task) {
        let id = task.id().clone();
        if let Some(limit) = self.retention.max_entries {
            if !self.entries.contains_key(&id) {
                while !self.entries.is_empty() && self.entries.len() >= limit {
                    self.evict_oldest();
                }
            }
        }
        let stored_at = self.clock.utc();
        self.entries.insert(id, CacheEntry { task, stored_at });
    }

    fn entries(&self) -> Vec<Task> {
        let now = self.clock.utc();
        let mut live: Vec<CacheEntry> = self
            .entries
            .iter()
            .filter(|entry| !self.is_expired(entry.value(), now))
            .map(|entry| entry.value().clone())
            .collect();
        live.sort_by_key(|entry| entry.stored_at);
        live.into_iter().map(|entry| entry.task).collect()
    }
}
