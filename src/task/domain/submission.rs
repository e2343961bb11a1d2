//! Submissions: documents handed in as answers to a task.

use super::{DocumentId, EntityMap, SubmissionId, Tag, TagId, TaskDomainError, UserId, Votes};
use chrono::{DateTime, Utc};

/// Immutable submission snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    id: SubmissionId,
    document: DocumentId,
    created_at: DateTime<Utc>,
    creator: UserId,
    votes: Votes,
    tags: EntityMap<TagId, Tag>,
}

impl Submission {
    /// Returns the submission identifier.
    #[must_use]
    pub const fn id(&self) -> &SubmissionId {
        &self.id
    }

    /// Returns the submitted document.
    #[must_use]
    pub const fn document(&self) -> &DocumentId {
        &self.document
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the submitting user.
    #[must_use]
    pub const fn creator(&self) -> &UserId {
        &self.creator
    }

    /// Returns the vote tally.
    #[must_use]
    pub const fn votes(&self) -> Votes {
        self.votes
    }

    /// Returns the tags attached to this submission.
    #[must_use]
    pub const fn tags(&self) -> &EntityMap<TagId, Tag> {
        &self.tags
    }
}

/// Builder for [`Submission`].
#[derive(Debug, Clone)]
pub struct SubmissionBuilder {
    id: SubmissionId,
    document: DocumentId,
    created_at: Option<DateTime<Utc>>,
    creator: Option<UserId>,
    votes: Votes,
    tags: EntityMap<TagId, Tag>,
}

impl SubmissionBuilder {
    /// Starts building the submission `id` wrapping `document`.
    #[must_use]
    pub fn new(id: SubmissionId, document: DocumentId) -> Self {
        Self {
            id,
            document,
            created_at: None,
            creator: None,
            votes: Votes::default(),
            tags: EntityMap::new(),
        }
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the submitting user.
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

    /// Sets the attached tags.
    #[must_use]
    pub fn tags(mut self, tags: EntityMap<TagId, Tag>) -> Self {
        self.tags = tags;
        self
    }

    /// Finalises the submission.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingField`] for absent mandatory fields.
    pub fn build(self) -> Result<Submission, TaskDomainError> {
        Ok(Submission {
            id: self.id,
            document: self.document,
            created_at: self
                .created_at
                .ok_or(TaskDomainError::missing("submission", "created_at"))?,
            creator: self
                .creator
                .ok_or(TaskDomainError::missing("submission", "creator"))?,
            votes: self.votes,
            tags: self.tags,
        })
    }
}
