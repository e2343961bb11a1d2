//! Resource-level access to the Task API.
//!
//! The port speaks in wire records ([`super::wire`]) and resource locators.
//! Adapters own URL construction, authentication and status interpretation;
//! services own caching and conversion into domain entities.

use super::wire::{
    BaseTagResource, CommentCreationResource, DispatchQueryResource, MultipleMetadataTasksResource,
    MultipleSnapshotTasksResource, MultipleTagsResource, MultipleTasksRequest,
    MultipleValuesRequest, QueryResultPageResource, ResultPageResource, ServiceInstanceResource,
    SubmissionCreationResource, TagCreationResource, TaskCreationResource, TaskMetadataResource,
    TaskSnapshotResource, UserVoteResource,
};
use crate::task::domain::{BoundingBox, Locator, OrderType, Position, TaskId, UserSession, VoteType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Which page of a plain task listing to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// First page of all tasks.
    All,
    /// First page of tasks created after the given instant.
    Since(DateTime<Utc>),
    /// A page reached through a `next` relation.
    Page(Locator),
}

/// A canned query evaluated by the service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommonQuery {
    /// Tasks relevant inside an area, in the given order.
    InArea {
        /// Result order.
        order: OrderType,
        /// Area to intersect.
        area: BoundingBox,
    },
    /// Tasks relevant around a position, in the given order.
    Near {
        /// Result order.
        order: OrderType,
        /// Reference position.
        position: Position,
    },
}

/// Transport to the Task API.
///
/// Read operations run under the system session configured on the adapter;
/// mutations run under the caller's session.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Loads the service instance document.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the request fails.
    async fn service_parameters(&self) -> ResourceResult<ServiceInstanceResource>;

    /// Loads the metadata view of one task.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for unknown tasks.
    async fn task_metadata(&self, task: &TaskId) -> ResourceResult<TaskMetadataResource>;

    /// Loads the snapshot view of one task.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for unknown tasks.
    async fn task_snapshot(&self, task: &TaskId) -> ResourceResult<TaskSnapshotResource>;

    /// Loads metadata views of several tasks in one request.
    ///
    /// Unknown tasks are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the request fails as a whole.
    async fn multiple_task_metadata(
        &self,
        request: &MultipleTasksRequest,
    ) -> ResourceResult<MultipleMetadataTasksResource>;

    /// Loads snapshot views of several tasks in one request.
    ///
    /// Unknown tasks are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the request fails as a whole.
    async fn multiple_task_snapshots(
        &self,
        request: &MultipleTasksRequest,
    ) -> ResourceResult<MultipleSnapshotTasksResource>;

    /// Loads one page of a plain task listing.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the request fails.
    async fn listing_page(&self, listing: &Listing) -> ResourceResult<ResultPageResource>;

    /// Dispatches a filter query and returns the locator of its first
    /// result page.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingLocation`] when the service accepts
    /// the query without naming a result location.
    async fn dispatch_query(&self, query: &DispatchQueryResource) -> ResourceResult<Locator>;

    /// Dispatches a canned query and returns the locator of its first result
    /// page.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingLocation`] when the service accepts
    /// the query without naming a result location.
    async fn common_query(&self, query: &CommonQuery) -> ResourceResult<Locator>;

    /// Loads one page of query results.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NoResults`] when the query matched nothing.
    async fn query_result_page(&self, page: &Locator) -> ResourceResult<QueryResultPageResource>;

    /// Resolves several tag values to base tags.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the request fails.
    async fn multiple_tags(
        &self,
        request: &MultipleValuesRequest,
    ) -> ResourceResult<MultipleTagsResource>;

    /// Creates a task and returns its locator.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the service rejects the request.
    async fn create_task(
        &self,
        session: &UserSession,
        body: &TaskCreationResource,
    ) -> ResourceResult<Locator>;

    /// Adds a comment to a task and returns the comment locator.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the service rejects the request.
    async fn create_comment(
        &self,
        session: &UserSession,
        task: &TaskId,
        body: &CommentCreationResource,
    ) -> ResourceResult<Locator>;

    /// Adds a submission to a task and returns the submission locator.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the service rejects the request.
    async fn create_submission(
        &self,
        session: &UserSession,
        task: &TaskId,
        body: &SubmissionCreationResource,
    ) -> ResourceResult<Locator>;

    /// Creates (or looks up) the base tag for a value.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the service rejects the request.
    async fn create_base_tag(
        &self,
        session: &UserSession,
        body: &TagCreationResource,
    ) -> ResourceResult<BaseTagResource>;

    /// Attaches a base tag to an entity and returns the tag locator.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the service rejects the request.
    async fn attach_tag(
        &self,
        session: &UserSession,
        entity: &Locator,
        tag: &BaseTagResource,
    ) -> ResourceResult<Locator>;

    /// Reads the session user's vote on an entity.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the request fails.
    async fn user_vote(
        &self,
        session: &UserSession,
        entity: &Locator,
    ) -> ResourceResult<UserVoteResource>;

    /// Casts or replaces the session user's vote on an entity.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the service rejects the request.
    async fn set_user_vote(
        &self,
        session: &UserSession,
        entity: &Locator,
        vote: VoteType,
    ) -> ResourceResult<()>;

    /// Withdraws the session user's vote on an entity.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the service rejects the request.
    async fn remove_user_vote(&self, session: &UserSession, entity: &Locator)
    -> ResourceResult<()>;
}

/// Errors returned by resource client implementations.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    /// The resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(Locator),

    /// A query result page exists but holds no results.
    #[error("query has no results: {0}")]
    NoResults(Locator),

    /// The service answered with a status the operation does not expect.
    #[error("unexpected status {status} from {target}")]
    UnexpectedStatus {
        /// Requested locator.
        target: String,
        /// HTTP status code.
        status: u16,
    },

    /// The service accepted a request without naming the created resource.
    #[error("no location returned by {0}")]
    MissingLocation(String),

    /// Network or protocol failure.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(Arc<dyn std::error::Error + Send + Sync>),
}

impl ResourceError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Wraps a decoding error.
    pub fn decode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode(Arc::new(err))
    }
}
