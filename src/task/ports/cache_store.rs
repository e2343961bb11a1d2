//! Storage contract behind the entity cache.

use crate::task::domain::{Task, TaskId};

/// Keyed store of tasks, at most one entry per task.
///
/// Implementations decide on retention (expiry, capacity); callers must
/// treat any entry as possibly gone on the next read.
pub trait TaskCacheStore: Send + Sync {
    /// Returns the stored task, if present and still retained.
    fn get(&self, id: &TaskId) -> Option<Task>;

    /// Stores a task, replacing any entry for the same identifier.
    fn put(&self, task: Task);

    /// Returns every retained task.
    fn entries(&self) -> Vec<Task>;
}
