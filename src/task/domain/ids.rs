//! Identifier types for the task domain.
//!
//! Every entity is identified by its canonical resource locator. Root
//! entities (tasks) carry nothing else; sub-entities additionally record the
//! task they belong to and the entity that immediately contains them. Those
//! back-references are used for navigation only and take no part in
//! identity.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// Canonical, absolute resource locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(Url);

impl Locator {
    /// Parses an absolute hierarchical locator such as
    /// `https://tasks.example.org/task/42`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidLocator`] when the value is not an
    /// absolute URL with a path component.
    pub fn parse(value: &str) -> Result<Self, TaskDomainError> {
        let url = Url::parse(value.trim())
            .map_err(|_| TaskDomainError::InvalidLocator(value.to_owned()))?;
        Self::from_url(url)
    }

    /// Wraps an already parsed URL.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidLocator`] for URLs that cannot carry
    /// child paths (`mailto:`, `data:` and similar).
    pub fn from_url(url: Url) -> Result<Self, TaskDomainError> {
        if url.cannot_be_a_base() {
            return Err(TaskDomainError::InvalidLocator(url.into()));
        }
        Ok(Self(url))
    }

    /// Returns the locator of a child resource, one path segment per entry.
    #[must_use]
    pub fn child(&self, segments: &[&str]) -> Self {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        Self(url)
    }

    /// Returns the locator as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the wrapped URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Identifier of a task, the only root entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Locator);

impl TaskId {
    /// Creates a task identifier from its canonical locator.
    #[must_use]
    pub const fn new(locator: Locator) -> Self {
        Self(locator)
    }

    /// Parses a task identifier from a locator string.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidLocator`] for malformed locators.
    pub fn parse(value: &str) -> Result<Self, TaskDomainError> {
        Locator::parse(value).map(Self)
    }

    /// Returns the canonical locator.
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an entity owned by a task.
///
/// Equality and hashing consider the locator alone.
#[derive(Debug, Clone)]
pub struct SubEntityId {
    locator: Locator,
    root: TaskId,
    parent: Locator,
}

impl SubEntityId {
    /// Creates a sub-entity identifier.
    #[must_use]
    pub const fn new(locator: Locator, root: TaskId, parent: Locator) -> Self {
        Self {
            locator,
            root,
            parent,
        }
    }

    /// Creates an identifier for an entity directly contained by its task.
    #[must_use]
    pub fn under_task(locator: Locator, root: &TaskId) -> Self {
        Self::new(locator, root.clone(), root.locator().clone())
    }

    /// Returns the canonical locator.
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Returns the task this entity belongs to.
    #[must_use]
    pub const fn root(&self) -> &TaskId {
        &self.root
    }

    /// Returns the locator of the immediately containing entity.
    #[must_use]
    pub const fn parent(&self) -> &Locator {
        &self.parent
    }
}

impl PartialEq for SubEntityId {
    fn eq(&self, other: &Self) -> bool {
        self.locator == other.locator
    }
}

impl Eq for SubEntityId {}

impl Hash for SubEntityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.locator.hash(state);
    }
}

impl fmt::Display for SubEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.locator.fmt(f)
    }
}

macro_rules! sub_entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SubEntityId);

        impl $name {
            /// Wraps a sub-entity identifier.
            #[must_use]
            pub const fn new(id: SubEntityId) -> Self {
                Self(id)
            }

            /// Returns the canonical locator.
            #[must_use]
            pub const fn locator(&self) -> &Locator {
                self.0.locator()
            }

            /// Returns the task this entity belongs to.
            #[must_use]
            pub const fn root(&self) -> &TaskId {
                self.0.root()
            }

            /// Returns the underlying sub-entity identifier.
            #[must_use]
            pub const fn as_sub_entity(&self) -> &SubEntityId {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<$name> for EntityId {
            fn from(id: $name) -> Self {
                Self::Sub(id.0)
            }
        }
    };
}

sub_entity_id!(
    /// Identifier of a submission attached to a task.
    SubmissionId
);
sub_entity_id!(
    /// Identifier of a comment on a task.
    CommentId
);
sub_entity_id!(
    /// Identifier of a tag on a task or a submission.
    TagId
);

/// Identifier of any entity that can be voted on or tagged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityId {
    /// A task.
    Root(TaskId),
    /// An entity owned by a task.
    Sub(SubEntityId),
}

impl EntityId {
    /// Returns the canonical locator of the entity.
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        match self {
            Self::Root(task_id) => task_id.locator(),
            Self::Sub(sub) => sub.locator(),
        }
    }

    /// Returns the task that owns this entity (the task itself for roots).
    #[must_use]
    pub const fn root_task(&self) -> &TaskId {
        match self {
            Self::Root(task_id) => task_id,
            Self::Sub(sub) => sub.root(),
        }
    }
}

impl From<TaskId> for EntityId {
    fn from(id: TaskId) -> Self {
        Self::Root(id)
    }
}

impl From<SubEntityId> for EntityId {
    fn from(id: SubEntityId) -> Self {
        Self::Sub(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.locator().fmt(f)
    }
}

/// Identifier of a document held by the core service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Locator);

impl DocumentId {
    /// Creates a document identifier from its locator.
    #[must_use]
    pub const fn new(locator: Locator) -> Self {
        Self(locator)
    }

    /// Returns the canonical locator.
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.0
    }
}

/// Identifier of a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Locator);

impl UserId {
    /// Creates a user identifier from its locator.
    #[must_use]
    pub const fn new(locator: Locator) -> Self {
        Self(locator)
    }

    /// Returns the canonical locator.
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.0
    }
}
