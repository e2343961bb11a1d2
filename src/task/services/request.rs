//! Request payloads for gateway operations.

use crate::task::domain::{BoundingBox, LoadType, TimeRange};

/// How a task lookup may be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchOptions {
    load: LoadType,
    force_api_call: bool,
}

impl FetchOptions {
    /// Creates options requesting `load`, allowing cache hits.
    #[must_use]
    pub const fn new(load: LoadType) -> Self {
        Self {
            load,
            force_api_call: false,
        }
    }

    /// Requests base attributes only.
    #[must_use]
    pub const fn metadata() -> Self {
        Self::new(LoadType::Metadata)
    }

    /// Requests the full snapshot including sub-collections.
    #[must_use]
    pub const fn complete() -> Self {
        Self::new(LoadType::Complete)
    }

    /// Bypasses the cache and always asks the service.
    #[must_use]
    pub const fn forced(mut self) -> Self {
        self.force_api_call = true;
        self
    }

    /// Returns the requested completeness.
    #[must_use]
    pub const fn load(self) -> LoadType {
        self.load
    }

    /// Returns `true` when the cache must be bypassed.
    #[must_use]
    pub const fn force_api_call(self) -> bool {
        self.force_api_call
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::metadata()
    }
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskRequest {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) time_range: TimeRange,
    pub(crate) area: BoundingBox,
}

impl CreateTaskRequest {
    /// Creates a request. Title and description are validated when the
    /// request is submitted.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        time_range: TimeRange,
        area: BoundingBox,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            time_range,
            area,
        }
    }
}
