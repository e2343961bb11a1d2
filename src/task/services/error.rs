//! Errors surfaced by the task gateway.

use crate::task::{domain::TaskDomainError, ports::ResourceError};
use thiserror::Error;

/// Contract violations reported by [`super::TaskGateway`] and
/// [`super::TaskPager`].
///
/// Ordinary service failures never appear here; they are reported in band
/// as absent results, empty pagers or `false`.
#[derive(Debug, Clone, Error)]
pub enum TaskGatewayError {
    /// An argument failed domain validation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// A batched lookup asked for more tasks than one request may carry.
    #[error("too many tasks requested: {requested} exceeds the limit of {limit}")]
    TooManyEntitiesRequested {
        /// Number of identifiers requested.
        requested: usize,
        /// Largest accepted batch.
        limit: usize,
    },

    /// A cache-only operation was used while caching is deactivated.
    #[error("entity cache is not activated")]
    CacheNotActivated,

    /// The pager was advanced past its last page.
    #[error("result set has no next page")]
    NoNextPage,

    /// The service parameters could not be discovered while connecting.
    #[error("service discovery failed: {0}")]
    Discovery(#[source] ResourceError),
}

/// Result type for gateway operations.
pub type TaskGatewayResult<T> = Result<T, TaskGatewayError>;
