//! Public operation surface of the task client and its freshness policy.
//!
//! Every lookup decides between the cache and the service from three
//! inputs: whether the caller forces a service call, the completeness the
//! caller needs, and what the cache currently holds. A cached task is served
//! when it is at least as complete as requested; anything else goes to the
//! service and the answer is written back to the cache.
//!
//! Mutations write through to the service and then refresh the owning task
//! at [`LoadType::Complete`], so the cache reflects the mutation by the time
//! the call returns.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use mockable::Clock;
use tracing::{debug, warn};

use super::{
    CreateTaskRequest, EntityAssembler, EntityCache, FetchOptions, LoadedPage, PageLoader,
    PageSource, TaskGatewayError, TaskGatewayResult, TaskPager,
};
use crate::config::ClientConfig;
use crate::task::{
    domain::{
        BoundingBox, Comment, CommentId, DocumentId, EntityId, EntityMap, LoadType, Locator,
        OrderType, Position, SubEntityId, Submission, SubmissionId, Tag, TagId, Task,
        TaskCollections, TaskDomainError, TaskId, TimeRange, UserSession, VoteType,
        require_text,
    },
    ports::{
        CommonQuery, Listing, ResourceClient, ResourceError, ResourceResult,
        wire::{
            CommentCreationResource, LinkWrapper, MultipleTasksRequest, MultipleValuesRequest,
            SubmissionCreationResource, TagCreationResource, TaskLinkResource,
        },
    },
};

/// Facade over the Task API combining the entity cache, the assembler and
/// result paging.
pub struct TaskGateway<R> {
    inner: Arc<GatewayInner<R>>,
}

impl<R> Clone for TaskGateway<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> std::fmt::Debug for TaskGateway<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGateway")
            .field("cache", &self.inner.cache)
            .field("max_task_request_size", &self.inner.max_task_request_size)
            .finish_non_exhaustive()
    }
}

struct GatewayInner<R> {
    client: Arc<R>,
    cache: EntityCache,
    assembler: EntityAssembler,
    max_task_request_size: usize,
}

impl<R> TaskGateway<R>
where
    R: ResourceClient + 'static,
{
    /// Creates a gateway with a known batch limit.
    #[must_use]
    pub fn new(client: Arc<R>, cache: EntityCache, max_task_request_size: usize) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                client,
                cache,
                assembler: EntityAssembler::new(),
                max_task_request_size,
            }),
        }
    }

    /// Creates a gateway, asking the service for its batch limit unless one
    /// is given.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::Discovery`] when the limit has to be
    /// discovered and the service cannot be reached.
    pub async fn connect(
        client: Arc<R>,
        cache: EntityCache,
        max_task_request_size: Option<usize>,
    ) -> TaskGatewayResult<Self> {
        let limit = match max_task_request_size {
            Some(limit) => limit,
            None => {
                client
                    .service_parameters()
                    .await
                    .map_err(TaskGatewayError::Discovery)?
                    .parameters
                    .batch_limit
            }
        };
        debug!(limit, cache = cache.is_active(), "task gateway connected");
        Ok(Self::new(client, cache, limit))
    }

    /// Creates a gateway from client configuration, with an in-memory cache
    /// when the configuration activates one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::Discovery`] when the batch limit has to be
    /// discovered and the service cannot be reached.
    pub async fn from_config<C>(
        config: &ClientConfig,
        client: Arc<R>,
        clock: Arc<C>,
    ) -> TaskGatewayResult<Self>
    where
        C: Clock + Send + Sync + 'static,
    {
        let cache = EntityCache::from_config(&config.cache, clock);
        Self::connect(client, cache, config.max_task_request_size).await
    }

    /// Returns the largest number of tasks one batched lookup may request.
    #[must_use]
    pub fn max_task_request_size(&self) -> usize {
        self.inner.max_task_request_size
    }

    /// Returns `true` when the entity cache is active.
    #[must_use]
    pub fn is_cache_activated(&self) -> bool {
        self.inner.cache.is_active()
    }

    fn loader(&self) -> Arc<dyn PageLoader> {
        Arc::clone(&self.inner) as Arc<dyn PageLoader>
    }

    /// Creates a task and returns its identifier.
    ///
    /// Returns `Ok(None)` when the service rejects the request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::Domain`] for a blank title or description,
    /// before anything is sent.
    pub async fn create_task(
        &self,
        session: &UserSession,
        request: CreateTaskRequest,
    ) -> TaskGatewayResult<Option<TaskId>> {
        let title = require_text(request.title, TaskDomainError::EmptyTitle)?;
        let description = require_text(request.description, TaskDomainError::EmptyDescription)?;
        let body = self.inner.assembler.task_creation(
            &title,
            &description,
            request.time_range,
            request.area,
        );
        match self.inner.client.create_task(session, &body).await {
            Ok(locator) => {
                let id = TaskId::new(locator);
                self.inner.refresh(&id).await;
                Ok(Some(id))
            }
            Err(err) => {
                warn!(error = %err, "task creation failed");
                Ok(None)
            }
        }
    }

    /// Lists every task held by the cache as a single metadata page.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::CacheNotActivated`] when caching is off.
    pub fn all_cached_tasks(&self) -> TaskGatewayResult<TaskPager> {
        let tasks = self
            .inner
            .cache
            .all_entries()?
            .into_iter()
            .map(|task| (task.id().clone(), task))
            .collect();
        Ok(TaskPager::terminal(PageSource::Listing, LoadType::Metadata, tasks))
    }

    /// Lists all tasks known to the service.
    pub async fn all_tasks(&self, load: LoadType) -> TaskPager {
        let first = self.inner.load_listing_page(&Listing::All, load).await;
        TaskPager::from_load_result(PageSource::Listing, load, first, self.loader())
    }

    /// Lists tasks created after `since`.
    pub async fn tasks_after(&self, since: DateTime<Utc>, load: LoadType) -> TaskPager {
        let first = self
            .inner
            .load_listing_page(&Listing::Since(since), load)
            .await;
        TaskPager::from_load_result(PageSource::Listing, load, first, self.loader())
    }

    /// Returns one task, from the cache when it is complete enough and the
    /// caller does not force a service call.
    ///
    /// Returns `None` when the task does not exist or cannot be loaded.
    pub async fn task(&self, id: &TaskId, options: FetchOptions) -> Option<Task> {
        self.inner.task(id, options).await
    }

    /// Returns several tasks in the order requested.
    ///
    /// Cached tasks that satisfy `options` are reused; every other task is
    /// loaded with one batched request. Unknown tasks are absent from the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::TooManyEntitiesRequested`] when more
    /// identifiers are given than [`Self::max_task_request_size`] allows.
    pub async fn tasks_by_ids(
        &self,
        ids: &[TaskId],
        options: FetchOptions,
    ) -> TaskGatewayResult<EntityMap<TaskId, Task>> {
        let limit = self.inner.max_task_request_size;
        if ids.len() > limit {
            return Err(TaskGatewayError::TooManyEntitiesRequested {
                requested: ids.len(),
                limit,
            });
        }
        match ids {
            [] => return Ok(EntityMap::new()),
            [id] => {
                return Ok(self
                    .inner
                    .task(id, options)
                    .await
                    .map(|task| (id.clone(), task))
                    .into_iter()
                    .collect());
            }
            _ => {}
        }

        let mut cached = HashMap::new();
        let mut pending = IndexSet::new();
        for id in ids {
            match self.inner.cached(id, options) {
                Some(task) => {
                    cached.insert(id.clone(), task);
                }
                None => {
                    pending.insert(id.clone());
                }
            }
        }
        let missing: Vec<TaskId> = pending.into_iter().collect();
        debug!(
            requested = ids.len(),
            cached = cached.len(),
            missing = missing.len(),
            "batched task lookup"
        );

        let mut fetched = self.inner.fetch_batch(&missing, options.load()).await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                cached
                    .remove(id)
                    .or_else(|| fetched.remove(id))
                    .map(|task| (id.clone(), task))
            })
            .collect())
    }

    /// Lists tasks carrying every tag in `tags` whose relevance intersects
    /// `area` and `time_range`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::Domain`] when a tag value is blank.
    pub async fn tasks_by_filter(
        &self,
        tags: &[&str],
        area: BoundingBox,
        time_range: TimeRange,
        load: LoadType,
    ) -> TaskGatewayResult<TaskPager> {
        let values = tags
            .iter()
            .map(|value| require_text((*value).to_owned(), TaskDomainError::EmptyTagValue))
            .collect::<Result<Vec<_>, _>>()?;

        let Some(base_tags) = self.inner.resolve_base_tags(values).await else {
            return Ok(TaskPager::empty(PageSource::Query, load));
        };
        let query = self.inner.assembler.filter_query(base_tags, area, time_range);
        let first = match self.inner.client.dispatch_query(&query).await {
            Ok(location) => self.inner.load_query_page(&location, load).await,
            Err(err) => Err(err),
        };
        Ok(TaskPager::from_load_result(
            PageSource::Query,
            load,
            first,
            self.loader(),
        ))
    }

    /// Lists tasks relevant inside `area`, in `order`.
    pub async fn tasks_ordered_in_area(
        &self,
        order: OrderType,
        area: BoundingBox,
        load: LoadType,
    ) -> TaskPager {
        self.common_query(CommonQuery::InArea { order, area }, load)
            .await
    }

    /// Lists tasks relevant at `position`, in `order`.
    pub async fn tasks_ordered_near(
        &self,
        order: OrderType,
        position: Position,
        load: LoadType,
    ) -> TaskPager {
        self.common_query(CommonQuery::Near { order, position }, load)
            .await
    }

    async fn common_query(&self, query: CommonQuery, load: LoadType) -> TaskPager {
        let first = match self.inner.client.common_query(&query).await {
            Ok(location) => self.inner.load_query_page(&location, load).await,
            Err(err) => Err(err),
        };
        TaskPager::from_load_result(PageSource::Query, load, first, self.loader())
    }

    /// Adds a comment to `task`.
    ///
    /// Returns `Ok(None)` when the service rejects the request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::Domain`] for blank content, before
    /// anything is sent.
    pub async fn add_comment_to_task(
        &self,
        session: &UserSession,
        task: &TaskId,
        content: &str,
    ) -> TaskGatewayResult<Option<CommentId>> {
        let body = CommentCreationResource {
            content: require_text(content.to_owned(), TaskDomainError::EmptyCommentContent)?,
        };
        match self.inner.client.create_comment(session, task, &body).await {
            Ok(locator) => {
                self.inner.refresh(task).await;
                Ok(Some(CommentId::new(SubEntityId::under_task(locator, task))))
            }
            Err(err) => {
                warn!(task = %task, error = %err, "adding comment failed");
                Ok(None)
            }
        }
    }

    /// Submits `document` to `task`.
    ///
    /// Returns `None` when the service rejects the request.
    pub async fn add_submission_to_task(
        &self,
        session: &UserSession,
        task: &TaskId,
        document: &DocumentId,
    ) -> Option<SubmissionId> {
        let body = SubmissionCreationResource {
            document: LinkWrapper::self_link(document.locator().to_string()),
        };
        match self.inner.client.create_submission(session, task, &body).await {
            Ok(locator) => {
                self.inner.refresh(task).await;
                Some(SubmissionId::new(SubEntityId::under_task(locator, task)))
            }
            Err(err) => {
                warn!(task = %task, error = %err, "adding submission failed");
                None
            }
        }
    }

    /// Tags a task or a submission with `value`.
    ///
    /// Returns `Ok(None)` when the service rejects the request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError::Domain`] for a blank value, before
    /// anything is sent.
    pub async fn add_tag_to_entity(
        &self,
        session: &UserSession,
        entity: &EntityId,
        value: &str,
    ) -> TaskGatewayResult<Option<TagId>> {
        let body = TagCreationResource {
            value: require_text(value.to_owned(), TaskDomainError::EmptyTagValue)?,
        };
        let client = &self.inner.client;
        let attached = match client.create_base_tag(session, &body).await {
            Ok(base_tag) => client.attach_tag(session, entity.locator(), &base_tag).await,
            Err(err) => Err(err),
        };
        match attached {
            Ok(locator) => {
                let root = entity.root_task();
                self.inner.refresh(root).await;
                Ok(Some(TagId::new(SubEntityId::new(
                    locator,
                    root.clone(),
                    entity.locator().clone(),
                ))))
            }
            Err(err) => {
                warn!(entity = %entity, error = %err, "adding tag failed");
                Ok(None)
            }
        }
    }

    /// Casts or replaces the session user's vote on `entity`.
    ///
    /// Returns `false` when the service rejects the vote.
    pub async fn set_user_vote(
        &self,
        session: &UserSession,
        entity: &EntityId,
        vote: VoteType,
    ) -> bool {
        let outcome = self
            .inner
            .client
            .set_user_vote(session, entity.locator(), vote)
            .await;
        self.after_vote(entity, outcome).await
    }

    /// Withdraws the session user's vote on `entity`.
    ///
    /// Returns `false` when the service rejects the request.
    pub async fn remove_user_vote(&self, session: &UserSession, entity: &EntityId) -> bool {
        let outcome = self
            .inner
            .client
            .remove_user_vote(session, entity.locator())
            .await;
        self.after_vote(entity, outcome).await
    }

    async fn after_vote(&self, entity: &EntityId, outcome: ResourceResult<()>) -> bool {
        match outcome {
            Ok(()) => {
                self.inner.refresh(entity.root_task()).await;
                true
            }
            Err(err) => {
                warn!(entity = %entity, error = %err, "vote request failed");
                false
            }
        }
    }

    /// Returns the session user's vote on `entity`, or `None` when the user
    /// has not voted or the vote cannot be read.
    pub async fn user_vote(&self, session: &UserSession, entity: &EntityId) -> Option<VoteType> {
        match self.inner.client.user_vote(session, entity.locator()).await {
            Ok(record) => VoteType::try_from(record.vote.as_str()).ok(),
            Err(err) => {
                warn!(entity = %entity, error = %err, "reading vote failed");
                None
            }
        }
    }

    /// Returns the sub-collections of `task`, loading the complete snapshot
    /// first when `task` is a metadata snapshot.
    pub async fn collections(&self, task: &Task) -> Option<TaskCollections> {
        if let Some(collections) = task.collections() {
            return Some(collections.clone());
        }
        debug!(task = %task.id(), "upgrading metadata task for collection access");
        self.inner
            .task(task.id(), FetchOptions::complete())
            .await?
            .collections()
            .cloned()
    }

    /// Returns the submissions of `task`.
    pub async fn submissions(&self, task: &Task) -> Option<EntityMap<SubmissionId, Submission>> {
        Some(self.collections(task).await?.submissions().clone())
    }

    /// Returns the comments of `task`.
    pub async fn comments(&self, task: &Task) -> Option<EntityMap<CommentId, Comment>> {
        Some(self.collections(task).await?.comments().clone())
    }

    /// Returns the tags attached directly to `task`.
    pub async fn tags(&self, task: &Task) -> Option<EntityMap<TagId, Tag>> {
        Some(self.collections(task).await?.tags().clone())
    }

    /// Returns one submission of `task`.
    pub async fn submission(&self, task: &Task, id: &SubmissionId) -> Option<Submission> {
        self.collections(task).await?.submissions().get(id).cloned()
    }

    /// Returns one comment of `task`.
    pub async fn comment(&self, task: &Task, id: &CommentId) -> Option<Comment> {
        self.collections(task).await?.comments().get(id).cloned()
    }

    /// Returns one tag attached directly to `task`.
    pub async fn tag(&self, task: &Task, id: &TagId) -> Option<Tag> {
        self.collections(task).await?.tags().get(id).cloned()
    }
}

impl<R> GatewayInner<R>
where
    R: ResourceClient,
{
    /// Returns the cached task when it may answer a request made with
    /// `options`.
    fn cached(&self, id: &TaskId, options: FetchOptions) -> Option<Task> {
        if options.force_api_call() || !self.cache.is_active() {
            return None;
        }
        let task = self.cache.get(id).ok().flatten()?;
        if task.load_type().satisfies(options.load()) {
            return Some(task);
        }
        debug!(task = %id, "cached metadata insufficient, upgrading");
        None
    }

    async fn task(&self, id: &TaskId, options: FetchOptions) -> Option<Task> {
        if let Some(task) = self.cached(id, options) {
            return Some(task);
        }
        self.fetch_task(id, options.load()).await
    }

    /// Loads one task from the service and writes it to the cache.
    async fn fetch_task(&self, id: &TaskId, load: LoadType) -> Option<Task> {
        let assembler = &self.assembler;
        let loaded = match load {
            LoadType::Metadata => self.client.task_metadata(id).await.and_then(|record| {
                assembler
                    .task_from_metadata(&record)
                    .map_err(ResourceError::decode)
            }),
            LoadType::Complete => self.client.task_snapshot(id).await.and_then(|record| {
                assembler
                    .task_from_snapshot(&record)
                    .map_err(ResourceError::decode)
            }),
        };
        match loaded {
            Ok(task) => {
                self.remember(&task);
                Some(task)
            }
            Err(ResourceError::NotFound(_)) => {
                debug!(task = %id, "task not found");
                None
            }
            Err(err) => {
                warn!(task = %id, error = %err, "loading task failed");
                None
            }
        }
    }

    /// Loads tasks in batches of at most the configured request size and
    /// writes them to the cache. Failed batches contribute nothing.
    async fn fetch_batch(&self, ids: &[TaskId], load: LoadType) -> HashMap<TaskId, Task> {
        let mut tasks = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(self.max_task_request_size.max(1)) {
            let request = MultipleTasksRequest {
                tasks: chunk.iter().map(|id| id.locator().to_string()).collect(),
            };
            let converted = match load {
                LoadType::Metadata => self
                    .client
                    .multiple_task_metadata(&request)
                    .await
                    .map(|records| {
                        records
                            .results
                            .values()
                            .filter_map(|record| {
                                keep_valid(self.assembler.task_from_metadata(record))
                            })
                            .collect::<Vec<_>>()
                    }),
                LoadType::Complete => self
                    .client
                    .multiple_task_snapshots(&request)
                    .await
                    .map(|records| {
                        records
                            .results
                            .values()
                            .filter_map(|record| {
                                keep_valid(self.assembler.task_from_snapshot(record))
                            })
                            .collect::<Vec<_>>()
                    }),
            };
            match converted {
                Ok(batch) => {
                    for task in batch {
                        self.remember(&task);
                        tasks.insert(task.id().clone(), task);
                    }
                }
                Err(err) => warn!(count = chunk.len(), error = %err, "batched task load failed"),
            }
        }
        tasks
    }

    fn remember(&self, task: &Task) {
        if self.cache.is_active() {
            if let Err(err) = self.cache.put(task.clone()) {
                warn!(error = %err, "cache write failed");
            }
        }
    }

    /// Reloads the complete snapshot of `root` after a mutation.
    async fn refresh(&self, root: &TaskId) {
        if self.cache.is_active() {
            debug!(task = %root, "refreshing task after mutation");
            self.fetch_task(root, LoadType::Complete).await;
        }
    }

    /// Resolves tag values to base tag locators. `None` means at least one
    /// value is unknown to the service, so no task can match.
    async fn resolve_base_tags(&self, values: Vec<String>) -> Option<Vec<String>> {
        if values.is_empty() {
            return Some(Vec::new());
        }
        let request = MultipleValuesRequest { values };
        let resolved = match self.client.multiple_tags(&request).await {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(error = %err, "tag lookup failed");
                return None;
            }
        };
        request
            .values
            .iter()
            .map(|value| {
                let base_tag = resolved.results.get(value);
                if base_tag.is_none() {
                    debug!(tag = %value, "unknown tag, filter cannot match");
                }
                base_tag.map(|tag| tag.base_tag.href().to_owned())
            })
            .collect()
    }

    async fn load_listing_page(
        &self,
        listing: &Listing,
        load: LoadType,
    ) -> ResourceResult<LoadedPage> {
        let page = self.client.listing_page(listing).await?;
        self.resolve_page(&page.list, &page.related, load).await
    }

    async fn load_query_page(
        &self,
        location: &Locator,
        load: LoadType,
    ) -> ResourceResult<LoadedPage> {
        let page = self.client.query_result_page(location).await?;
        self.resolve_page(&page.results.page.list, &page.results.page.related, load)
            .await
    }

    /// Turns a page of task links into tasks, keeping page order.
    async fn resolve_page(
        &self,
        list: &[TaskLinkResource],
        related: &[LinkWrapper],
        load: LoadType,
    ) -> ResourceResult<LoadedPage> {
        let ids = self
            .assembler
            .page_task_ids(list)
            .map_err(ResourceError::decode)?;
        let next_page = self
            .assembler
            .next_page(related)
            .map_err(ResourceError::decode)?;
        let mut fetched = if ids.is_empty() {
            HashMap::new()
        } else {
            self.fetch_batch(&ids, load).await
        };
        let tasks = ids
            .into_iter()
            .filter_map(|id| fetched.remove(&id).map(|task| (id, task)))
            .collect();
        Ok(LoadedPage { tasks, next_page })
    }
}

#[async_trait]
impl<R> PageLoader for GatewayInner<R>
where
    R: ResourceClient,
{
    async fn load_page(
        &self,
        source: PageSource,
        page: &Locator,
        load: LoadType,
    ) -> ResourceResult<LoadedPage> {
        match source {
            PageSource::Listing => {
                self.load_listing_page(&Listing::Page(page.clone()), load)
                    .await
            }
            PageSource::Query => self.load_query_page(page, load).await,
        }
    }
}

fn keep_valid(task: Result<Task, TaskDomainError>) -> Option<Task> {
    task.inspect_err(|err| warn!(error = %err, "discarding malformed task record"))
        .ok()
}
