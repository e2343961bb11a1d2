//! Entity cache used by the gateway.

use std::sync::Arc;

use mockable::Clock;
use tracing::debug;

use super::{TaskGatewayError, TaskGatewayResult};
use crate::config::CacheConfig;
use crate::task::{
    adapters::memory::InMemoryTaskCache,
    domain::{Task, TaskId},
    ports::TaskCacheStore,
};

/// Cache of tasks keyed by identifier.
///
/// Only tasks are cached; sub-entities live inside the complete snapshot of
/// their task. Writes overwrite unconditionally. An inactive cache rejects
/// every operation with [`TaskGatewayError::CacheNotActivated`] and the
/// gateway consults [`EntityCache::is_active`] before touching it.
#[derive(Clone)]
pub struct EntityCache {
    store: Option<Arc<dyn TaskCacheStore>>,
}

impl EntityCache {
    /// Creates an active cache over `store`.
    #[must_use]
    pub fn active(store: Arc<dyn TaskCacheStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Creates a deactivated cache.
    #[must_use]
    pub const fn inactive() -> Self {
        Self { store: None }
    }

    /// Creates an in-memory cache as described by `config`.
    #[must_use]
    pub fn from_config<C>(config: &CacheConfig, clock: Arc<C>) -> Self
    where
        C: Clock + Send + Sync + 'static,
    {
        if !config.activated {
            return Self::inactive();
        }
        Self::active(Arc::new(InMemoryTaskCache::with_retention(
            clock,
            config.retention(),
        )))
    }

    /// Returns `true` when caching is enabled.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> TaskGatewayResult<&dyn TaskCacheStore> {
        self.store
            .as_deref()
            .ok_or(TaskGatewayError::CacheNotActivated)
    }

    /// Returns the cached task, if present and not expired.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::CacheNotActivated`] when caching is off.
    pub fn get(&self, id: &TaskId) -> TaskGatewayResult<Option<Task>> {
        let task = self.store()?.get(id);
        debug!(task = %id, hit = task.is_some(), "cache lookup");
        Ok(task)
    }

    /// Stores `task`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::CacheNotActivated`] when caching is off.
    pub fn put(&self, task: Task) -> TaskGatewayResult<()> {
        let store = self.store()?;
        debug!(task = %task.id(), load = task.load_type().as_str(), "cache write");
        store.put(task);
        Ok(())
    }

    /// Returns every non-expired task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::CacheNotActivated`] when caching is off.
    pub fn all_entries(&self) -> TaskGatewayResult<Vec<Task>> {
        Ok(self.store()?.entries())
    }
}

impl std::fmt::Debug for EntityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("active", &self.is_active())
            .finish()
    }
}
