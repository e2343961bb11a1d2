//! Domain model for tasks and the entities they own.
//!
//! Entities are immutable snapshots built once through their builders,
//! either from a service response or from a cache hit. "Updating" an entity
//! means building a new snapshot and replacing the old one.

mod comment;
mod constraints;
mod entity_map;
mod error;
mod ids;
mod session;
mod submission;
mod tag;
mod task;
mod votes;

pub use comment::{Comment, CommentBuilder};
pub use constraints::{BoundingBox, OrderType, Position, TimeRange};
pub use entity_map::EntityMap;
pub use error::{ParseDomainValueError, TaskDomainError};
pub use ids::{
    CommentId, DocumentId, EntityId, Locator, SubEntityId, SubmissionId, TagId, TaskId, UserId,
};
pub use session::{SystemSession, UserSession};
pub use submission::{Submission, SubmissionBuilder};
pub use tag::{Tag, TagBuilder};
pub use task::{LoadType, Task, TaskBuilder, TaskCollections};
pub use votes::{VoteType, Votes};

/// Returns `value` unchanged unless it is blank, in which case `error`.
///
/// # Errors
///
/// Returns `error` when `value` is empty after trimming.
pub fn require_text(value: String, error: TaskDomainError) -> Result<String, TaskDomainError> {
    if value.trim().is_empty() {
        return Err(error);
    }
    Ok(value)
}
