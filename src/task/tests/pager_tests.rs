//! Result paging tests.

use super::fixtures::{Harness, berlin};
use crate::task::{
    domain::{LoadType, OrderType},
    services::{PageSource, TaskGatewayError, TaskPager},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_pages_forward_with_one_batch_per_page() {
    let harness = Harness::new(true, 10, 2);
    let ids = harness.seed_many(5);

    let first = harness.gateway.all_tasks(LoadType::Metadata).await;
    assert_eq!(first.loaded_data().len(), 2);
    assert!(first.has_next_page());

    let second = first.advance().await.expect("second page exists");
    assert_eq!(
        second.loaded_data().keys().cloned().collect::<Vec<_>>(),
        vec![ids[2].clone(), ids[3].clone()]
    );

    let third = second.advance().await.expect("third page exists");
    assert_eq!(third.loaded_data().len(), 1);
    assert!(!third.has_next_page());

    let calls = harness.calls();
    assert_eq!(calls.listings, 3);
    assert_eq!(calls.batch_metadata, 3);
    assert_eq!(calls.metadata, 0);

    assert!(matches!(
        third.advance().await,
        Err(TaskGatewayError::NoNextPage)
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resolved_pages_are_written_to_the_cache() {
    let harness = Harness::new(true, 10, 20);
    let ids = harness.seed_many(2);

    let pager = harness.gateway.all_tasks(LoadType::Complete).await;

    assert_eq!(pager.loaded_data().len(), 2);
    assert!(
        ids.iter()
            .all(|id| harness.cached(id).is_some_and(|task| task.is_complete()))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn page_larger_than_batch_limit_is_split() {
    let harness = Harness::new(true, 2, 20);
    harness.seed_many(5);

    let pager = harness.gateway.all_tasks(LoadType::Metadata).await;

    assert_eq!(pager.loaded_data().len(), 5);
    assert_eq!(harness.calls().batch_metadata, 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_listing_is_terminal() {
    let harness = Harness::new(true, 10, 20);

    let pager = harness.gateway.all_tasks(LoadType::Complete).await;

    assert!(pager.loaded_data().is_empty());
    assert!(!pager.has_next_page());
    assert_eq!(harness.calls().task_loads(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn query_without_results_is_terminal() {
    let harness = Harness::new(true, 10, 20);

    let pager = harness
        .gateway
        .tasks_ordered_in_area(OrderType::MostActive, berlin(), LoadType::Metadata)
        .await;

    assert!(pager.is_query());
    assert!(pager.loaded_data().is_empty());
    assert!(!pager.has_next_page());
    assert_eq!(harness.calls().query_pages, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failure_while_advancing_ends_the_listing() {
    let harness = Harness::new(true, 10, 2);
    harness.seed_many(3);
    let first = harness.gateway.all_tasks(LoadType::Metadata).await;
    harness.service.set_offline(true).expect("service state");

    let next = first.advance().await.expect("next page was announced");

    assert!(next.loaded_data().is_empty());
    assert!(!next.has_next_page());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn terminal_pager_cannot_advance() {
    let pager = TaskPager::empty(PageSource::Listing, LoadType::Metadata);

    assert!(!pager.is_query());
    assert!(matches!(
        pager.advance().await,
        Err(TaskGatewayError::NoNextPage)
    ));
}
