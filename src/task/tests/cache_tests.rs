//! Cache substrate and entity cache tests.

use std::{
    hint::black_box,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use chrono::TimeDelta;

use super::fixtures::{ManualClock, complete_task, instant, task_id};
use crate::task::{
    adapters::memory::{CacheRetention, InMemoryTaskCache},
    ports::TaskCacheStore,
    services::{EntityCache, TaskGatewayError},
};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(instant(12)))
}

#[rstest]
fn entries_expire_after_time_to_live(clock: Arc<ManualClock>) {
    let cache = InMemoryTaskCache::with_retention(
        Arc::clone(&clock),
        CacheRetention {
            time_to_live: Some(TimeDelta::seconds(60)),
            max_entries: None,
        },
    );
    cache.put(complete_task(1));

    clock.advance(TimeDelta::seconds(59));
    assert!(cache.get(&task_id(1)).is_some());
    assert_eq!(cache.entries().len(), 1);

    clock.advance(TimeDelta::seconds(1));
    assert!(cache.get(&task_id(1)).is_none());
    assert!(cache.entries().is_empty());
    assert!(cache.is_empty());
}

#[rstest]
fn put_restarts_expiry(clock: Arc<ManualClock>) {
    let cache = InMemoryTaskCache::with_retention(
        Arc::clone(&clock),
        CacheRetention {
            time_to_live: Some(TimeDelta::seconds(60)),
            max_entries: None,
        },
    );
    cache.put(complete_task(1));
    clock.advance(TimeDelta::seconds(45));
    cache.put(complete_task(1));
    clock.advance(TimeDelta::seconds(45));

    assert!(cache.get(&task_id(1)).is_some());
}

#[rstest]
fn capacity_evicts_oldest_entry(clock: Arc<ManualClock>) {
    let cache = InMemoryTaskCache::with_retention(
        Arc::clone(&clock),
        CacheRetention {
            time_to_live: None,
            max_entries: Some(2),
        },
    );
    for n in 1..=3 {
        cache.put(complete_task(n));
        clock.advance(TimeDelta::seconds(1));
    }

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&task_id(1)).is_none());
    assert!(cache.get(&task_id(2)).is_some());
    assert!(cache.get(&task_id(3)).is_some());
}

#[rstest]
fn fresh_put_survives_concurrent_expired_reads(clock: Arc<ManualClock>) {
    let cache = InMemoryTaskCache::with_retention(
        Arc::clone(&clock),
        CacheRetention {
            time_to_live: Some(TimeDelta::seconds(60)),
            max_entries: None,
        },
    );
    let done = AtomicBool::new(false);

    let lost = thread::scope(|scope| {
        for _ in 0..3 {
            scope.spawn(|| {
                while !done.load(Ordering::Relaxed) {
                    black_box(cache.get(&task_id(1)));
                }
            });
        }
        let mut misses = 0_usize;
        for _ in 0..20_000 {
            clock.advance(TimeDelta::seconds(120));
            cache.put(complete_task(1));
            if cache.get(&task_id(1)).is_none() {
                misses += 1;
            }
        }
        done.store(true, Ordering::Relaxed);
        misses
    });

    assert_eq!(lost, 0);
}

#[rstest]
fn overwriting_a_key_does_not_evict(clock: Arc<ManualClock>) {
    let cache = InMemoryTaskCache::with_retention(
        Arc::clone(&clock),
        CacheRetention {
            time_to_live: None,
            max_entries: Some(2),
        },
    );
    cache.put(complete_task(1));
    clock.advance(TimeDelta::seconds(1));
    cache.put(complete_task(2));
    clock.advance(TimeDelta::seconds(1));
    cache.put(complete_task(2));

    assert!(cache.get(&task_id(1)).is_some());
    assert_eq!(cache.len(), 2);
}

#[rstest]
fn entries_are_listed_oldest_first(clock: Arc<ManualClock>) {
    let cache = InMemoryTaskCache::new(Arc::clone(&clock));
    for n in [3, 1, 2] {
        cache.put(complete_task(n));
        clock.advance(TimeDelta::seconds(1));
    }

    let ids: Vec<_> = cache.entries().iter().map(|task| task.id().clone()).collect();
    assert_eq!(ids, vec![task_id(3), task_id(1), task_id(2)]);
}

#[rstest]
fn inactive_cache_rejects_every_operation() {
    let cache = EntityCache::inactive();

    assert!(!cache.is_active());
    assert!(matches!(
        cache.get(&task_id(1)),
        Err(TaskGatewayError::CacheNotActivated)
    ));
    assert!(matches!(
        cache.put(complete_task(1)),
        Err(TaskGatewayError::CacheNotActivated)
    ));
    assert!(matches!(
        cache.all_entries(),
        Err(TaskGatewayError::CacheNotActivated)
    ));
}

#[rstest]
fn active_cache_overwrites_unconditionally(clock: Arc<ManualClock>) {
    let cache = EntityCache::active(Arc::new(InMemoryTaskCache::new(clock)));
    cache.put(complete_task(1)).expect("cache is active");
    cache.put(complete_task(1)).expect("cache is active");

    let entries = cache.all_entries().expect("cache is active");
    assert_eq!(entries.len(), 1);
    assert_eq!(
        cache.get(&task_id(1)).expect("cache is active"),
        Some(complete_task(1))
    );
}
