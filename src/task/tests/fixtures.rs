//! Shared fixtures: a manually advanced clock, wire records and a gateway
//! wired to the in-memory service.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::task::{
    adapters::memory::{CacheRetention, InMemoryTaskCache, InMemoryTaskService, ServiceCalls},
    domain::{BoundingBox, Locator, Task, TaskId, TimeRange, UserSession},
    ports::{
        TaskCacheStore,
        wire::{
            BoundingBoxResource, CommentsResource, ConstraintsResource, LinkResource,
            LinkWrapper, SubmissionsResource, TagsResource, TaskCreationResource, TaskResource,
            TaskSnapshotResource, TimeRangeResource, VotesResource,
        },
    },
    services::{EntityAssembler, EntityCache, TaskGateway},
};

pub(super) const SERVICE_ROOT: &str = "https://tasks.example.org/v2/";

/// Clock that only moves when told to.
#[derive(Debug)]
pub(super) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(super) fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(super) fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

pub(super) fn instant(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn berlin() -> BoundingBox {
    BoundingBox::new(52.3, 13.0, 52.7, 13.8).expect("valid area")
}

pub(super) fn working_day() -> TimeRange {
    TimeRange::new(instant(8), instant(18)).expect("valid range")
}

pub(super) fn session() -> UserSession {
    UserSession::new("alice", "secret")
}

pub(super) fn constraints() -> ConstraintsResource {
    ConstraintsResource {
        time: TimeRangeResource {
            start: instant(8),
            end: instant(18),
        },
        location: BoundingBoxResource {
            bbox: berlin().to_geojson(),
        },
    }
}

pub(super) fn creation_body(title: &str) -> TaskCreationResource {
    TaskCreationResource {
        constraints: constraints(),
        title: title.to_owned(),
        description: format!("{title} in detail"),
    }
}

pub(super) fn task_locator(n: usize) -> String {
    format!("{SERVICE_ROOT}task/{n}")
}

pub(super) fn task_id(n: usize) -> TaskId {
    TaskId::parse(&task_locator(n)).expect("valid task locator")
}

/// Snapshot record of a task without sub-entities.
pub(super) fn snapshot_record(href: &str, title: &str) -> TaskSnapshotResource {
    TaskSnapshotResource {
        task: TaskResource {
            link: LinkResource {
                rel: "self".to_owned(),
                href: href.to_owned(),
            },
            constraints: constraints(),
            title: title.to_owned(),
            description: format!("{title} in detail"),
            creation_time: instant(9),
            creator: LinkWrapper::self_link(format!("{SERVICE_ROOT}user/alice")),
            votes: VotesResource { up: 2, down: 1 },
        },
        submissions: SubmissionsResource::default(),
        comments: CommentsResource::default(),
        tags: TagsResource::default(),
    }
}

pub(super) fn complete_task(n: usize) -> Task {
    EntityAssembler::new()
        .task_from_snapshot(&snapshot_record(&task_locator(n), &format!("Task {n}")))
        .expect("valid snapshot")
}

pub(super) type TestService = InMemoryTaskService<ManualClock>;
pub(super) type TestGateway = TaskGateway<TestService>;

/// Gateway over the in-memory service with direct access to its cache.
pub(super) struct Harness {
    pub(super) clock: Arc<ManualClock>,
    pub(super) service: Arc<TestService>,
    pub(super) store: Arc<InMemoryTaskCache<ManualClock>>,
    pub(super) gateway: TestGateway,
}

impl Harness {
    pub(super) fn new(cache_active: bool, limit: usize, page_size: usize) -> Self {
        let clock = Arc::new(ManualClock::new(instant(12)));
        let base = Locator::parse(SERVICE_ROOT).expect("valid service root");
        let service = Arc::new(
            InMemoryTaskService::new(base, Arc::clone(&clock))
                .with_batch_limit(limit)
                .with_page_size(page_size),
        );
        let store = Arc::new(InMemoryTaskCache::with_retention(
            Arc::clone(&clock),
            CacheRetention::default(),
        ));
        let cache = if cache_active {
            EntityCache::active(Arc::clone(&store) as Arc<dyn TaskCacheStore>)
        } else {
            EntityCache::inactive()
        };
        let gateway = TaskGateway::new(Arc::clone(&service), cache, limit);
        Self {
            clock,
            service,
            store,
            gateway,
        }
    }

    pub(super) fn seed(&self, title: &str) -> TaskId {
        let locator = self
            .service
            .seed_task("alice", &creation_body(title), self.clock.utc())
            .expect("seed task");
        self.clock.advance(TimeDelta::minutes(1));
        TaskId::new(locator)
    }

    pub(super) fn seed_many(&self, count: usize) -> Vec<TaskId> {
        (1..=count).map(|n| self.seed(&format!("Task {n}"))).collect()
    }

    pub(super) fn calls(&self) -> ServiceCalls {
        self.service.calls().expect("service calls")
    }

    pub(super) fn cached(&self, id: &TaskId) -> Option<Task> {
        self.store.get(id)
    }
}
