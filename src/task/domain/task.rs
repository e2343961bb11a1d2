//! Task root entity and its load state.

use super::{
    BoundingBox, Comment, CommentId, EntityMap, ParseDomainValueError, Submission, SubmissionId,
    Tag, TagId, TaskDomainError, TaskId, TimeRange, UserId, Votes, require_text,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How much of a task has been loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadType {
    /// Base attributes only; sub-collections are unresolved.
    Metadata,
    /// Base attributes and every sub-collection.
    Complete,
}

impl LoadType {
    /// Maps a "load completely" flag to a load type.
    #[must_use]
    pub const fn from_flag(load_completely: bool) -> Self {
        if load_completely {
            Self::Complete
        } else {
            Self::Metadata
        }
    }

    /// Returns `true` when data loaded at `self` can answer a request for
    /// `requested`.
    #[must_use]
    pub const fn satisfies(self, requested: Self) -> bool {
        matches!(
            (self, requested),
            (Self::Complete, _) | (Self::Metadata, Self::Metadata)
        )
    }

    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Complete => "complete",
        }
    }
}

impl TryFrom<&str> for LoadType {
    type Error = ParseDomainValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "metadata" => Ok(Self::Metadata),
            "complete" => Ok(Self::Complete),
            _ => Err(ParseDomainValueError {
                kind: "load type",
                value: value.to_owned(),
            }),
        }
    }
}

/// Sub-collections owned by a completely loaded task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskCollections {
    submissions: EntityMap<SubmissionId, Submission>,
    comments: EntityMap<CommentId, Comment>,
    tags: EntityMap<TagId, Tag>,
}

impl TaskCollections {
    /// Bundles the three sub-collections.
    #[must_use]
    pub const fn new(
        submissions: EntityMap<SubmissionId, Submission>,
        comments: EntityMap<CommentId, Comment>,
        tags: EntityMap<TagId, Tag>,
    ) -> Self {
        Self {
            submissions,
            comments,
            tags,
        }
    }

    /// Returns the submissions.
    #[must_use]
    pub const fn submissions(&self) -> &EntityMap<SubmissionId, Submission> {
        &self.submissions
    }

    /// Returns the comments.
    #[must_use]
    pub const fn comments(&self) -> &EntityMap<CommentId, Comment> {
        &self.comments
    }

    /// Returns the tags attached directly to the task.
    #[must_use]
    pub const fn tags(&self) -> &EntityMap<TagId, Tag> {
        &self.tags
    }
}

/// Immutable task snapshot.
///
/// A task built without collections is a [`LoadType::Metadata`] snapshot and
/// never hands out sub-collections; callers go through the gateway, which
/// upgrades it to a [`LoadType::Complete`] snapshot on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    created_at: DateTime<Utc>,
    creator: UserId,
    votes: Votes,
    relevant_time_range: TimeRange,
    relevant_area: BoundingBox,
    collections: Option<TaskCollections>,
}

impl Task {
    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the creator.
    #[must_use]
    pub const fn creator(&self) -> &UserId {
        &self.creator
    }

    /// Returns the vote tally.
    #[must_use]
    pub const fn votes(&self) -> Votes {
        self.votes
    }

    /// Returns the time range the task is relevant for.
    #[must_use]
    pub const fn relevant_time_range(&self) -> TimeRange {
        self.relevant_time_range
    }

    /// Returns the area the task is relevant for.
    #[must_use]
    pub const fn relevant_area(&self) -> BoundingBox {
        self.relevant_area
    }

    /// Returns the load state of this snapshot.
    #[must_use]
    pub const fn load_type(&self) -> LoadType {
        if self.collections.is_some() {
            LoadType::Complete
        } else {
            LoadType::Metadata
        }
    }

    /// Returns `true` for [`LoadType::Complete`] snapshots.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.collections.is_some()
    }

    /// Returns the sub-collections of a complete snapshot, `None` otherwise.
    #[must_use]
    pub const fn collections(&self) -> Option<&TaskCollections> {
        self.collections.as_ref()
    }
}

/// Builder for [`Task`].
///
/// Supplying [`TaskCollections`] makes the result a complete snapshot.
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    id: TaskId,
    title: Option<String>,
    description: Option<String>,
    created_at: Option<DateTime<Utc>>,
    creator: Option<UserId>,
    votes: Votes,
    relevant_time_range: Option<TimeRange>,
    relevant_area: Option<BoundingBox>,
    collections: Option<TaskCollections>,
}

impl TaskBuilder {
    /// Starts building the task identified by `id`.
    #[must_use]
    pub const fn new(id: TaskId) -> Self {
        Self {
            id,
            title: None,
            description: None,
            created_at: None,
            creator: None,
            votes: Votes::new(0, 0),
            relevant_time_range: None,
            relevant_area: None,
            collections: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the creator.
    #[must_use]
    pub fn creator(mut self, creator: UserId) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Sets the vote tally.
    #[must_use]
    pub const fn votes(mut self, votes: Votes) -> Self {
        self.votes = votes;
        self
    }

    /// Sets the relevant time range.
    #[must_use]
    pub const fn relevant_time_range(mut self, time_range: TimeRange) -> Self {
        self.relevant_time_range = Some(time_range);
        self
    }

    /// Sets the relevant area.
    #[must_use]
    pub const fn relevant_area(mut self, area: BoundingBox) -> Self {
        self.relevant_area = Some(area);
        self
    }

    /// Attaches the sub-collections, producing a complete snapshot.
    #[must_use]
    pub fn collections(mut self, collections: TaskCollections) -> Self {
        self.collections = Some(collections);
        self
    }

    /// Finalises the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingField`] for absent mandatory fields
    /// and [`TaskDomainError::EmptyTitle`] or
    /// [`TaskDomainError::EmptyDescription`] for blank text.
    pub fn build(self) -> Result<Task, TaskDomainError> {
        let title = self.title.ok_or(TaskDomainError::missing("task", "title"))?;
        let description = self
            .description
            .ok_or(TaskDomainError::missing("task", "description"))?;
        Ok(Task {
            id: self.id,
            title: require_text(title, TaskDomainError::EmptyTitle)?,
            description: require_text(description, TaskDomainError::EmptyDescription)?,
            created_at: self
                .created_at
                .ok_or(TaskDomainError::missing("task", "created_at"))?,
            creator: self
                .creator
                .ok_or(TaskDomainError::missing("task", "creator"))?,
            votes: self.votes,
            relevant_time_range: self
                .relevant_time_range
                .ok_or(TaskDomainError::missing("task", "relevant_time_range"))?,
            relevant_area: self
                .relevant_area
                .ok_or(TaskDomainError::missing("task", "relevant_area"))?,
            collections: self.collections,
        })
    }
}
