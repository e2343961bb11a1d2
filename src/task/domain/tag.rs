//! Tags attached to tasks or submissions.

use super::{TagId, TaskDomainError, UserId, Votes, require_text};
use chrono::{DateTime, Utc};

/// Immutable tag snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    id: TagId,
    value: String,
    created_at: DateTime<Utc>,
    creator: UserId,
    votes: Votes,
}

impl Tag {
    /// Returns the tag identifier.
    #[must_use]
    pub const fn id(&self) -> &TagId {
        &self.id
    }

    /// Returns the tag value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the user who attached the tag.
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

/// Builder for [`Tag`].
#[derive(Debug, Clone)]
pub struct TagBuilder {
    id: TagId,
    value: Option<String>,
    created_at: Option<DateTime<Utc>>,
    creator: Option<UserId>,
    votes: Votes,
}

impl TagBuilder {
    /// Starts building the tag identified by `id`.
    #[must_use]
    pub const fn new(id: TagId) -> Self {
        Self {
            id,
            value: None,
            created_at: None,
            creator: None,
            votes: Votes::new(0, 0),
        }
    }

    /// Sets the tag value.
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the user who attached the tag.
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

    /// Finalises the tag.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingField`] for absent mandatory fields
    /// and [`TaskDomainError::EmptyTagValue`] for a blank value.
    pub fn build(self) -> Result<Tag, TaskDomainError> {
        let value = self.value.ok_or(TaskDomainError::missing("tag", "value"))?;
        Ok(Tag {
            id: self.id,
            value: require_text(value, TaskDomainError::EmptyTagValue)?,
            created_at: self
                .created_at
                .ok_or(TaskDomainError::missing("tag", "created_at"))?,
            creator: self
                .creator
                .ok_or(TaskDomainError::missing("tag", "creator"))?,
            votes: self.votes,
        })
    }
}
