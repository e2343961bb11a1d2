//! Comments attached to tasks.

use super::{CommentId, TaskDomainError, UserId, Votes, require_text};
use chrono::{DateTime, Utc};

/// Immutable comment snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id: CommentId,
    content: String,
    created_at: DateTime<Utc>,
    creator: UserId,
    votes: Votes,
}

impl Comment {
    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> &CommentId {
        &self.id
    }

    /// Returns the comment text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the author.
    #[must_use]
    pub const fn creator(&self) -> &UserId {
        &self.creator
    }

    /// Returns the vote tally.
    #[must_use]
    pub const fn votes(&self) -> Votes {
        self.votes
    }
}

/// Builder for [`Comment`].
#[derive(Debug, Clone)]
pub struct CommentBuilder {
    id: CommentId,
    content: Option<String>,
    created_at: Option<DateTime<Utc>>,
    creator: Option<UserId>,
    votes: Votes,
}

impl CommentBuilder {
    /// Starts building the comment identified by `id`.
    #[must_use]
    pub const fn new(id: CommentId) -> Self {
        Self {
            id,
            content: None,
            created_at: None,
            creator: None,
            votes: Votes::new(0, 0),
        }
    }

    /// Sets the comment text.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the author.
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

    /// Finalises the comment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingField`] for absent mandatory fields
    /// and [`TaskDomainError::EmptyCommentContent`] for blank text.
    pub fn build(self) -> Result<Comment, TaskDomainError> {
        let content = self
            .content
            .ok_or(TaskDomainError::missing("comment", "content"))?;
        Ok(Comment {
            id: self.id,
            content: require_text(content, TaskDomainError::EmptyCommentContent)?,
            created_at: self
                .created_at
                .ok_or(TaskDomainError::missing("comment", "created_at"))?,
            creator: self
                .creator
                .ok_or(TaskDomainError::missing("comment", "creator"))?,
            votes: self.votes,
        })
    }
}
