//! In-memory stand-in for the Task API.
//!
//! Serves the same resource shapes as the remote service from process
//! memory and records how often each kind of request was made, which lets
//! tests observe caching and batching behaviour without a network.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::task::{
    domain::{Locator, OrderType, TaskId, UserSession, VoteType},
    ports::{
        CommonQuery, Listing, ResourceClient, ResourceError, ResourceResult,
        wire::{
            BaseTagResource, BoundingBoxResource, CommentCreationResource, CommentEntry,
            CommentResource, CommentsResource, DispatchQueryResource,
            LinkResource, LinkWrapper, MultipleMetadataTasksResource,
            MultipleSnapshotTasksResource, MultipleTagsResource, MultipleTasksRequest,
            MultipleValuesRequest, NEXT_RELATION, PageResource, ParametersResource,
            QueryResultPageResource, ResultPageResource, ResultsResource,
            ServiceInstanceResource, SubmissionCreationResource, SubmissionEntry,
            SubmissionResource, SubmissionsResource, TagCreationResource, TagEntry, TagResource,
            TagsResource, TaskCreationResource, TaskLinkResource, TaskMetadataResource,
            TaskResource, TaskSnapshotResource, TimeRangeResource, UserVoteResource,
            VotesResource,
        },
    },
};

const DEFAULT_BATCH_LIMIT: usize = 50;
const DEFAULT_PAGE_SIZE: usize = 20;
const NO_VOTE: &str = "none";

/// Number of requests served, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceCalls {
    /// Service instance lookups.
    pub parameters: usize,
    /// Single-task metadata loads.
    pub metadata: usize,
    /// Single-task snapshot loads.
    pub snapshot: usize,
    /// Batched metadata loads.
    pub batch_metadata: usize,
    /// Batched snapshot loads.
    pub batch_snapshot: usize,
    /// Plain listing pages.
    pub listings: usize,
    /// Dispatched queries, filter and canned.
    pub queries: usize,
    /// Query result pages.
    pub query_pages: usize,
    /// Multi-value tag lookups.
    pub tag_lookups: usize,
    /// Vote reads.
    pub vote_reads: usize,
    /// Accepted mutations.
    pub mutations: usize,
}

impl ServiceCalls {
    /// Returns the number of task loads, single and batched.
    #[must_use]
    pub const fn task_loads(&self) -> usize {
        self.metadata + self.snapshot + self.batch_metadata + self.batch_snapshot
    }

    /// Returns the number of requests of any kind.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.parameters
            + self.task_loads()
            + self.listings
            + self.queries
            + self.query_pages
            + self.tag_lookups
            + self.vote_reads
            + self.mutations
    }
}

#[derive(Debug, Default)]
struct ServiceState {
    tasks: Vec<TaskSnapshotResource>,
    base_tags: Vec<(String, BaseTagResource)>,
    user_votes: HashMap<(String, String), VoteType>,
    result_sets: Vec<Vec<String>>,
    next_id: u64,
    offline: bool,
    calls: ServiceCalls,
}

impl ServiceState {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn task(&self, href: &str) -> Option<&TaskSnapshotResource> {
        self.tasks.iter().find(|task| task.task.link.href == href)
    }

    fn task_mut(&mut self, href: &str) -> Option<&mut TaskSnapshotResource> {
        self.tasks.iter_mut().find(|task| task.task.link.href == href)
    }

    fn votes_mut(&mut self, href: &str) -> Option<&mut VotesResource> {
        self.tasks.iter_mut().find_map(|snapshot| {
            if snapshot.task.link.href == href {
                return Some(&mut snapshot.task.votes);
            }
            for entry in &mut snapshot.tags.list {
                if entry.tag.link.href == href {
                    return Some(&mut entry.tag.votes);
                }
            }
            for entry in &mut snapshot.comments.list {
                if entry.comment.link.href == href {
                    return Some(&mut entry.comment.votes);
                }
            }
            snapshot
                .submissions
                .list
                .iter_mut()
                .find_map(|entry| submission_votes_mut(&mut entry.submission, href))
        })
    }

    fn tags_of_mut(&mut self, href: &str) -> Option<&mut TagsResource> {
        self.tasks.iter_mut().find_map(|snapshot| {
            if snapshot.task.link.href == href {
                return Some(&mut snapshot.tags);
            }
            snapshot
                .submissions
                .list
                .iter_mut()
                .find(|entry| entry.submission.link.href == href)
                .map(|entry| &mut entry.submission.tags)
        })
    }

    fn base_tag_value(&self, href: &str) -> Option<&str> {
        self.base_tags
            .iter()
            .find(|(_, tag)| tag.base_tag.href() == href)
            .map(|(value, _)| value.as_str())
    }

    fn open_result_set(&mut self, hrefs: Vec<String>) -> usize {
        self.result_sets.push(hrefs);
        self.result_sets.len() - 1
    }
}

fn submission_votes_mut<'a>(
    submission: &'a mut SubmissionResource,
    href: &str,
) -> Option<&'a mut VotesResource> {
    if submission.link.href == href {
        return Some(&mut submission.votes);
    }
    submission
        .tags
        .list
        .iter_mut()
        .find(|entry| entry.tag.link.href == href)
        .map(|entry| &mut entry.tag.votes)
}

/// In-memory implementation of [`ResourceClient`].
///
/// Tasks live under `{base}/task/{n}`; result pages of listings and queries
/// live under `{base}/results/{set}/{page}`.
pub struct InMemoryTaskService<C> {
    base: Locator,
    batch_limit: usize,
    page_size: usize,
    state: Arc<RwLock<ServiceState>>,
    clock: Arc<C>,
}

impl<C> Clone for InMemoryTaskService<C> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            batch_limit: self.batch_limit,
            page_size: self.page_size,
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> std::fmt::Debug for InMemoryTaskService<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTaskService")
            .field("base", &self.base)
            .field("batch_limit", &self.batch_limit)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl<C> InMemoryTaskService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty service rooted at `base`.
    #[must_use]
    pub fn new(base: Locator, clock: Arc<C>) -> Self {
        Self {
            base,
            batch_limit: DEFAULT_BATCH_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            state: Arc::new(RwLock::new(ServiceState::default())),
            clock,
        }
    }

    /// Sets the advertised batch limit. Larger batched requests are
    /// rejected with status 413.
    #[must_use]
    pub const fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }

    /// Sets the number of tasks per result page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Returns the service root.
    #[must_use]
    pub const fn base(&self) -> &Locator {
        &self.base
    }

    /// Returns the request counters.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Transport`] when the state lock is poisoned.
    pub fn calls(&self) -> ResourceResult<ServiceCalls> {
        Ok(self.read()?.calls)
    }

    /// Makes every subsequent request fail with a transport error, or
    /// restores service.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Transport`] when the state lock is poisoned.
    pub fn set_offline(&self, offline: bool) -> ResourceResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.offline = offline;
        Ok(())
    }

    /// Stores a task directly, bypassing authentication and counters.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Transport`] when the state lock is poisoned.
    pub fn insert_snapshot(&self, snapshot: TaskSnapshotResource) -> ResourceResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.tasks.push(snapshot);
        Ok(())
    }

    /// Creates a task directly with the given attributes and returns its
    /// locator.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Transport`] when the state lock is poisoned.
    pub fn seed_task(
        &self,
        creator: &str,
        body: &TaskCreationResource,
        created_at: DateTime<Utc>,
    ) -> ResourceResult<Locator> {
        let mut state = self.state.write().map_err(poisoned)?;
        let id = state.allocate_id();
        let locator = self.base.child(&["task", id.as_str()]);
        let snapshot = TaskSnapshotResource {
            task: TaskResource {
                link: LinkResource {
                    rel: "self".to_owned(),
                    href: locator.to_string(),
                },
                constraints: body.constraints.clone(),
                title: body.title.clone(),
                description: body.description.clone(),
                creation_time: created_at,
                creator: self.user_link(creator),
                votes: VotesResource { up: 0, down: 0 },
            },
            submissions: SubmissionsResource::default(),
            comments: CommentsResource::default(),
            tags: TagsResource::default(),
        };
        state.tasks.push(snapshot);
        Ok(locator)
    }

    fn user_link(&self, auth_id: &str) -> LinkWrapper {
        LinkWrapper::self_link(self.base.child(&["user", auth_id]).to_string())
    }

    fn read(&self) -> ResourceResult<RwLockReadGuard<'_, ServiceState>> {
        self.state.read().map_err(poisoned)
    }

    /// Locks the state for a request, failing when the service is offline.
    fn serve(&self) -> ResourceResult<RwLockWriteGuard<'_, ServiceState>> {
        let state = self.state.write().map_err(poisoned)?;
        if state.offline {
            return Err(ResourceError::transport(std::io::Error::other(
                "service offline",
            )));
        }
        Ok(state)
    }

    fn page_locator(&self, set: usize, page: usize) -> Locator {
        let set_segment = set.to_string();
        let page_segment = page.to_string();
        self.base
            .child(&["results", set_segment.as_str(), page_segment.as_str()])
    }

    fn parse_page_locator(&self, locator: &Locator) -> Option<(usize, usize)> {
        let segments: Vec<&str> = locator.as_url().path_segments()?.collect();
        match segments.as_slice() {
            [.., "results", set, page] => Some((set.parse().ok()?, page.parse().ok()?)),
            _ => None,
        }
    }

    /// Cuts one page out of a result set.
    fn page_of(
        &self,
        state: &ServiceState,
        locator: &Locator,
    ) -> ResourceResult<(usize, Vec<TaskLinkResource>, Vec<LinkWrapper>)> {
        let (set, page) = self
            .parse_page_locator(locator)
            .ok_or_else(|| ResourceError::NotFound(locator.clone()))?;
        let hrefs = state
            .result_sets
            .get(set)
            .ok_or_else(|| ResourceError::NotFound(locator.clone()))?;
        let start = page.saturating_mul(self.page_size);
        if start > hrefs.len() || (start == hrefs.len() && page > 0) {
            return Err(ResourceError::NotFound(locator.clone()));
        }
        let end = (start + self.page_size).min(hrefs.len());
        let list = hrefs
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(TaskLinkResource::new)
            .collect();
        let related = if end < hrefs.len() {
            vec![LinkWrapper::new(
                NEXT_RELATION,
                self.page_locator(set, page + 1).to_string(),
            )]
        } else {
            Vec::new()
        };
        Ok((hrefs.len(), list, related))
    }

    fn open_listing(&self, state: &mut ServiceState, since: Option<DateTime<Utc>>) -> Locator {
        let hrefs = state
            .tasks
            .iter()
            .filter(|task| since.is_none_or(|instant| task.task.creation_time > instant))
            .map(|task| task.task.link.href.clone())
            .collect();
        let set = state.open_result_set(hrefs);
        self.page_locator(set, 0)
    }

    fn check_batch(&self, request: &MultipleTasksRequest, endpoint: &str) -> ResourceResult<()> {
        if request.tasks.len() > self.batch_limit {
            return Err(ResourceError::UnexpectedStatus {
                target: self.base.child(&["tasks", endpoint]).to_string(),
                status: 413,
            });
        }
        Ok(())
    }

    fn require_task(state: &ServiceState, task: &TaskId) -> ResourceResult<()> {
        state
            .task(task.locator().as_str())
            .map(|_| ())
            .ok_or_else(|| ResourceError::NotFound(task.locator().clone()))
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> ResourceError {
    ResourceError::transport(std::io::Error::other(err.to_string()))
}

/// Derives the metadata view served for a stored snapshot.
fn metadata_of(snapshot: &TaskSnapshotResource) -> TaskMetadataResource {
    let href = snapshot.task.link.href.trim_end_matches('/');
    TaskMetadataResource {
        task: snapshot.task.clone(),
        submissions: LinkWrapper::new("submissions", format!("{href}/submissions")),
        comments: LinkWrapper::new("comments", format!("{href}/comments")),
        tags: LinkWrapper::new("tags", format!("{href}/tags")),
    }
}

fn time_ranges_intersect(a: &TimeRangeResource, b: &TimeRangeResource) -> bool {
    a.start <= b.end && b.start <= a.end
}

fn boxes_intersect(a: &BoundingBoxResource, b: &BoundingBoxResource) -> bool {
    let [a_west, a_south, a_east, a_north] = a.bbox;
    let [b_west, b_south, b_east, b_north] = b.bbox;
    a_west <= b_east && b_west <= a_east && a_south <= b_north && b_south <= a_north
}

fn box_contains(area: &BoundingBoxResource, latitude: f64, longitude: f64) -> bool {
    let [west, south, east, north] = area.bbox;
    (west..=east).contains(&longitude) && (south..=north).contains(&latitude)
}

fn activity(snapshot: &TaskSnapshotResource) -> usize {
    snapshot.submissions.list.len() + snapshot.comments.list.len()
}

fn rating(snapshot: &TaskSnapshotResource) -> i128 {
    i128::from(snapshot.task.votes.up) - i128::from(snapshot.task.votes.down)
}

fn ordered(mut matches: Vec<&TaskSnapshotResource>, order: OrderType) -> Vec<String> {
    match order {
        OrderType::Newest => {
            matches.sort_by_key(|snapshot| Reverse(snapshot.task.creation_time));
        }
        OrderType::TopRated => matches.sort_by_key(|snapshot| Reverse(rating(snapshot))),
        OrderType::MostActive => {
            matches.sort_by_key(|snapshot| Reverse(activity(snapshot)));
        }
    }
    matches
        .into_iter()
        .map(|snapshot| snapshot.task.link.href.clone())
        .collect()
}

fn apply_vote(votes: &mut VotesResource, previous: Option<VoteType>, next: Option<VoteType>) {
    match previous {
        Some(VoteType::Up) => votes.up = votes.up.saturating_sub(1),
        Some(VoteType::Down) => votes.down = votes.down.saturating_sub(1),
        None => {}
    }
    match next {
        Some(VoteType::Up) => votes.up += 1,
        Some(VoteType::Down) => votes.down += 1,
        None => {}
    }
}

#[async_trait]
impl<C> ResourceClient for InMemoryTaskService<C>
where
    C: Clock + Send + Sync,
{
    async fn service_parameters(&self) -> ResourceResult<ServiceInstanceResource> {
        let mut state = self.serve()?;
        state.calls.parameters += 1;
        Ok(ServiceInstanceResource {
            parameters: ParametersResource {
                batch_limit: self.batch_limit,
            },
        })
    }

    async fn task_metadata(&self, task: &TaskId) -> ResourceResult<TaskMetadataResource> {
        let mut state = self.serve()?;
        state.calls.metadata += 1;
        state
            .task(task.locator().as_str())
            .map(metadata_of)
            .ok_or_else(|| ResourceError::NotFound(task.locator().clone()))
    }

    async fn task_snapshot(&self, task: &TaskId) -> ResourceResult<TaskSnapshotResource> {
        let mut state = self.serve()?;
        state.calls.snapshot += 1;
        state
            .task(task.locator().as_str())
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(task.locator().clone()))
    }

    async fn multiple_task_metadata(
        &self,
        request: &MultipleTasksRequest,
    ) -> ResourceResult<MultipleMetadataTasksResource> {
        let mut state = self.serve()?;
        state.calls.batch_metadata += 1;
        self.check_batch(request, "metadata")?;
        let results = request
            .tasks
            .iter()
            .filter_map(|href| state.task(href).map(|task| (href.clone(), metadata_of(task))))
            .collect();
        Ok(MultipleMetadataTasksResource { results })
    }

    async fn multiple_task_snapshots(
        &self,
        request: &MultipleTasksRequest,
    ) -> ResourceResult<MultipleSnapshotTasksResource> {
        let mut state = self.serve()?;
        state.calls.batch_snapshot += 1;
        self.check_batch(request, "snapshots")?;
        let results = request
            .tasks
            .iter()
            .filter_map(|href| state.task(href).map(|task| (href.clone(), task.clone())))
            .collect();
        Ok(MultipleSnapshotTasksResource { results })
    }

    async fn listing_page(&self, listing: &Listing) -> ResourceResult<ResultPageResource> {
        let mut state = self.serve()?;
        state.calls.listings += 1;
        let page = match listing {
            Listing::Page(locator) => locator.clone(),
            Listing::All => self.open_listing(&mut state, None),
            Listing::Since(instant) => self.open_listing(&mut state, Some(*instant)),
        };
        let (_, list, related) = self.page_of(&state, &page)?;
        Ok(ResultPageResource {
            page: LinkWrapper::self_link(page.to_string()),
            list,
            related,
        })
    }

    async fn dispatch_query(&self, query: &DispatchQueryResource) -> ResourceResult<Locator> {
        let mut state = self.serve()?;
        state.calls.queries += 1;
        let wanted: Vec<String> = query
            .query
            .tags
            .iter()
            .filter_map(|href| state.base_tag_value(href).map(str::to_owned))
            .collect();
        if wanted.len() < query.query.tags.len() {
            debug!("query names an unknown base tag");
        }
        let hrefs = state
            .tasks
            .iter()
            .filter(|snapshot| {
                time_ranges_intersect(&snapshot.task.constraints.time, &query.query.time)
                    && boxes_intersect(&snapshot.task.constraints.location, &query.query.location)
                    && wanted.len() == query.query.tags.len()
                    && wanted.iter().all(|value| {
                        snapshot.tags.list.iter().any(|entry| &entry.tag.value == value)
                    })
            })
            .map(|snapshot| snapshot.task.link.href.clone())
            .collect();
        let set = state.open_result_set(hrefs);
        Ok(self.page_locator(set, 0))
    }

    async fn common_query(&self, query: &CommonQuery) -> ResourceResult<Locator> {
        let mut state = self.serve()?;
        state.calls.queries += 1;
        let hrefs = match *query {
            CommonQuery::InArea { order, area } => {
                let area = BoundingBoxResource {
                    bbox: area.to_geojson(),
                };
                let matches = state
                    .tasks
                    .iter()
                    .filter(|snapshot| boxes_intersect(&snapshot.task.constraints.location, &area))
                    .collect();
                ordered(matches, order)
            }
            CommonQuery::Near { order, position } => {
                let matches = state
                    .tasks
                    .iter()
                    .filter(|snapshot| {
                        box_contains(
                            &snapshot.task.constraints.location,
                            position.latitude(),
                            position.longitude(),
                        )
                    })
                    .collect();
                ordered(matches, order)
            }
        };
        let set = state.open_result_set(hrefs);
        Ok(self.page_locator(set, 0))
    }

    async fn query_result_page(&self, page: &Locator) -> ResourceResult<QueryResultPageResource> {
        let mut state = self.serve()?;
        state.calls.query_pages += 1;
        let (count, list, related) = self.page_of(&state, page)?;
        if count == 0 {
            return Err(ResourceError::NoResults(page.clone()));
        }
        let query_href = page
            .as_str()
            .rsplit_once('/')
            .map_or_else(|| page.to_string(), |(set, _)| set.to_owned());
        Ok(QueryResultPageResource {
            query: LinkWrapper::self_link(query_href),
            results: ResultsResource {
                count: u64::try_from(count).unwrap_or(u64::MAX),
                page: PageResource {
                    link: LinkResource {
                        rel: "self".to_owned(),
                        href: page.to_string(),
                    },
                    list,
                    related,
                },
            },
        })
    }

    async fn multiple_tags(
        &self,
        request: &MultipleValuesRequest,
    ) -> ResourceResult<MultipleTagsResource> {
        let mut state = self.serve()?;
        state.calls.tag_lookups += 1;
        let results = request
            .values
            .iter()
            .filter_map(|value| {
                state
                    .base_tags
                    .iter()
                    .find(|(known, _)| known == value)
                    .map(|(known, tag)| (known.clone(), tag.clone()))
            })
            .collect();
        Ok(MultipleTagsResource { results })
    }

    async fn create_task(
        &self,
        session: &UserSession,
        body: &TaskCreationResource,
    ) -> ResourceResult<Locator> {
        {
            let mut state = self.serve()?;
            state.calls.mutations += 1;
        }
        self.seed_task(session.auth_id(), body, self.clock.utc())
    }

    async fn create_comment(
        &self,
        session: &UserSession,
        task: &TaskId,
        body: &CommentCreationResource,
    ) -> ResourceResult<Locator> {
        let mut state = self.serve()?;
        Self::require_task(&state, task)?;
        state.calls.mutations += 1;
        let id = state.allocate_id();
        let locator = task.locator().child(&["comment", id.as_str()]);
        let comment = CommentResource {
            link: LinkResource {
                rel: "self".to_owned(),
                href: locator.to_string(),
            },
            content: body.content.clone(),
            creation_time: self.clock.utc(),
            creator: self.user_link(session.auth_id()),
            votes: VotesResource { up: 0, down: 0 },
        };
        if let Some(snapshot) = state.task_mut(task.locator().as_str()) {
            snapshot.comments.list.push(CommentEntry { comment });
        }
        Ok(locator)
    }

    async fn create_submission(
        &self,
        session: &UserSession,
        task: &TaskId,
        body: &SubmissionCreationResource,
    ) -> ResourceResult<Locator> {
        let mut state = self.serve()?;
        Self::require_task(&state, task)?;
        state.calls.mutations += 1;
        let id = state.allocate_id();
        let locator = task.locator().child(&["submission", id.as_str()]);
        let submission = SubmissionResource {
            link: LinkResource {
                rel: "self".to_owned(),
                href: locator.to_string(),
            },
            votes: VotesResource { up: 0, down: 0 },
            document: body.document.clone(),
            creation_time: self.clock.utc(),
            creator: self.user_link(session.auth_id()),
            tags: TagsResource::default(),
        };
        if let Some(snapshot) = state.task_mut(task.locator().as_str()) {
            snapshot.submissions.list.push(SubmissionEntry { submission });
        }
        Ok(locator)
    }

    async fn create_base_tag(
        &self,
        _session: &UserSession,
        body: &TagCreationResource,
    ) -> ResourceResult<BaseTagResource> {
        let mut state = self.serve()?;
        state.calls.mutations += 1;
        if let Some((_, existing)) = state.base_tags.iter().find(|(value, _)| *value == body.value)
        {
            return Ok(existing.clone());
        }
        let id = state.allocate_id();
        let tag = BaseTagResource {
            base_tag: LinkWrapper::self_link(self.base.child(&["tag", id.as_str()]).to_string()),
        };
        state.base_tags.push((body.value.clone(), tag.clone()));
        Ok(tag)
    }

    async fn attach_tag(
        &self,
        session: &UserSession,
        entity: &Locator,
        tag: &BaseTagResource,
    ) -> ResourceResult<Locator> {
        let mut state = self.serve()?;
        let value = state
            .base_tag_value(tag.base_tag.href())
            .map(str::to_owned)
            .ok_or_else(|| ResourceError::NotFound(entity.clone()))?;
        let id = state.allocate_id();
        let locator = entity.child(&["tag", id.as_str()]);
        let entry = TagEntry {
            tag: TagResource {
                link: LinkResource {
                    rel: "self".to_owned(),
                    href: locator.to_string(),
                },
                value,
                creation_time: self.clock.utc(),
                creator: self.user_link(session.auth_id()),
                votes: VotesResource { up: 0, down: 0 },
            },
        };
        let tags = state
            .tags_of_mut(entity.as_str())
            .ok_or_else(|| ResourceError::NotFound(entity.clone()))?;
        tags.list.push(entry);
        state.calls.mutations += 1;
        Ok(locator)
    }

    async fn user_vote(
        &self,
        session: &UserSession,
        entity: &Locator,
    ) -> ResourceResult<UserVoteResource> {
        let mut state = self.serve()?;
        state.calls.vote_reads += 1;
        if state.votes_mut(entity.as_str()).is_none() {
            return Err(ResourceError::NotFound(entity.clone()));
        }
        let key = (session.auth_id().to_owned(), entity.to_string());
        let vote = state
            .user_votes
            .get(&key)
            .map_or(NO_VOTE, |vote| vote.as_str());
        Ok(UserVoteResource {
            vote: vote.to_owned(),
        })
    }

    async fn set_user_vote(
        &self,
        session: &UserSession,
        entity: &Locator,
        vote: VoteType,
    ) -> ResourceResult<()> {
        let mut state = self.serve()?;
        let key = (session.auth_id().to_owned(), entity.to_string());
        let previous = state.user_votes.get(&key).copied();
        let votes = state
            .votes_mut(entity.as_str())
            .ok_or_else(|| ResourceError::NotFound(entity.clone()))?;
        apply_vote(votes, previous, Some(vote));
        state.user_votes.insert(key, vote);
        state.calls.mutations += 1;
        Ok(())
    }

    async fn remove_user_vote(
        &self,
        session: &UserSession,
        entity: &Locator,
    ) -> ResourceResult<()> {
        let mut state = self.serve()?;
        let key = (session.auth_id().to_owned(), entity.to_string());
        let previous = state.user_votes.get(&key).copied();
        let votes = state
            .votes_mut(entity.as_str())
            .ok_or_else(|| ResourceError::NotFound(entity.clone()))?;
        apply_vote(votes, previous, None);
        state.user_votes.remove(&key);
        state.calls.mutations += 1;
        Ok(())
    }
}
