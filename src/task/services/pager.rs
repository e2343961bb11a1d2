//! Forward-only cursor over a paginated task listing.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{TaskGatewayError, TaskGatewayResult};
use crate::task::{
    domain::{EntityMap, LoadType, Locator, Task, TaskId},
    ports::{ResourceError, ResourceResult},
};

/// Endpoint family a listing is paged through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSource {
    /// Plain task listing.
    Listing,
    /// Result of a dispatched query.
    Query,
}

/// One page resolved to tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedPage {
    /// Tasks in page order. Tasks the service no longer knows are absent.
    pub tasks: EntityMap<TaskId, Task>,
    /// Locator of the following page.
    pub next_page: Option<Locator>,
}

/// Loads and resolves the page at a locator.
#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Fetches the page at `page` from the endpoint family `source` and
    /// resolves its identifiers to tasks at `load` completeness.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NoResults`] for an empty query result and
    /// other [`ResourceError`] variants for transport failures.
    async fn load_page(
        &self,
        source: PageSource,
        page: &Locator,
        load: LoadType,
    ) -> ResourceResult<LoadedPage>;
}

/// A listing or query result, one page at a time.
///
/// The pager only ever holds the current page. [`TaskPager::advance`]
/// consumes it and returns the pager positioned on the next page.
pub struct TaskPager {
    source: PageSource,
    load: LoadType,
    current: EntityMap<TaskId, Task>,
    next_page: Option<Locator>,
    loader: Option<Arc<dyn PageLoader>>,
}

impl TaskPager {
    /// Creates a terminal pager with no tasks.
    #[must_use]
    pub fn empty(source: PageSource, load: LoadType) -> Self {
        Self::terminal(source, load, EntityMap::new())
    }

    /// Creates a single-page pager over already resolved tasks.
    #[must_use]
    pub const fn terminal(
        source: PageSource,
        load: LoadType,
        tasks: EntityMap<TaskId, Task>,
    ) -> Self {
        Self {
            source,
            load,
            current: tasks,
            next_page: None,
            loader: None,
        }
    }

    /// Creates a pager positioned on `page`, loading later pages through
    /// `loader`.
    #[must_use]
    pub fn new(
        source: PageSource,
        load: LoadType,
        page: LoadedPage,
        loader: Arc<dyn PageLoader>,
    ) -> Self {
        Self {
            source,
            load,
            current: page.tasks,
            next_page: page.next_page,
            loader: Some(loader),
        }
    }

    /// Builds a pager from the outcome of loading a page.
    ///
    /// An empty query result and any transport failure both yield the empty
    /// terminal pager; failures are logged.
    #[must_use]
    pub fn from_load_result(
        source: PageSource,
        load: LoadType,
        first: ResourceResult<LoadedPage>,
        loader: Arc<dyn PageLoader>,
    ) -> Self {
        match first {
            Ok(page) => Self::new(source, load, page, loader),
            Err(ResourceError::NoResults(page)) => {
                debug!(page = %page, "listing has no results");
                Self::empty(source, load)
            }
            Err(err) => {
                warn!(error = %err, ?source, "listing failed, returning empty result");
                Self::empty(source, load)
            }
        }
    }

    /// Returns the endpoint family of this listing.
    #[must_use]
    pub const fn source(&self) -> PageSource {
        self.source
    }

    /// Returns `true` for query results.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self.source, PageSource::Query)
    }

    /// Returns the completeness tasks are resolved at.
    #[must_use]
    pub const fn load_type(&self) -> LoadType {
        self.load
    }

    /// Returns the tasks of the current page, in page order.
    #[must_use]
    pub const fn loaded_data(&self) -> &EntityMap<TaskId, Task> {
        &self.current
    }

    /// Consumes the pager and returns the tasks of the current page.
    #[must_use]
    pub fn into_loaded_data(self) -> EntityMap<TaskId, Task> {
        self.current
    }

    /// Returns `true` when another page follows.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }

    /// Returns the locator of the following page.
    #[must_use]
    pub const fn next_page(&self) -> Option<&Locator> {
        self.next_page.as_ref()
    }

    /// Moves to the next page.
    ///
    /// A failure while loading the page ends the listing: the returned pager
    /// is empty and terminal.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::NoNextPage`] when called on the last page.
    pub async fn advance(self) -> TaskGatewayResult<Self> {
        let Self {
            source,
            load,
            next_page,
            loader,
            ..
        } = self;
        let (Some(page), Some(loader)) = (next_page, loader) else {
            return Err(TaskGatewayError::NoNextPage);
        };
        let loaded = loader.load_page(source, &page, load).await;
        Ok(Self::from_load_result(source, load, loaded, loader))
    }
}

impl std::fmt::Debug for TaskPager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPager")
            .field("source", &self.source)
            .field("load", &self.load)
            .field("current", &self.current.len())
            .field("next_page", &self.next_page)
            .finish_non_exhaustive()
    }
}
