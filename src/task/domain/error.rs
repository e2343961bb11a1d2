//! Error types for task domain validation and entity construction.

use thiserror::Error;

/// Errors returned while constructing task domain values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TaskDomainError {
    /// A resource locator could not be parsed.
    #[error("invalid resource locator '{0}'")]
    InvalidLocator(String),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// The comment content is empty after trimming.
    #[error("comment content must not be empty")]
    EmptyCommentContent,

    /// The tag value is empty after trimming.
    #[error("tag value must not be empty")]
    EmptyTagValue,

    /// A latitude lies outside `[-90, 90]` or is not finite.
    #[error("latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),

    /// A longitude lies outside `[-180, 180]` or is not finite.
    #[error("longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),

    /// The southern edge of a bounding box lies north of its northern edge.
    #[error("bounding box south latitude {south} exceeds north latitude {north}")]
    InvertedLatitudes {
        /// Southern edge.
        south: f64,
        /// Northern edge.
        north: f64,
    },

    /// The western edge of a bounding box lies east of its eastern edge.
    #[error("bounding box west longitude {west} exceeds east longitude {east}")]
    InvertedLongitudes {
        /// Western edge.
        west: f64,
        /// Eastern edge.
        east: f64,
    },

    /// A time range ends before it starts.
    #[error("time range ends before it starts")]
    InvertedTimeRange,

    /// A builder was finalised without a mandatory field.
    #[error("missing mandatory field '{field}' for {entity}")]
    MissingField {
        /// Entity kind being built.
        entity: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
}

impl TaskDomainError {
    pub(crate) const fn missing(entity: &'static str, field: &'static str) -> Self {
        Self::MissingField { entity, field }
    }
}

/// Error returned while parsing load or vote types from their wire form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseDomainValueError {
    /// Kind of value being parsed.
    pub kind: &'static str,
    /// Raw input.
    pub value: String,
}
