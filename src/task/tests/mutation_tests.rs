//! Write-then-refresh tests for mutations, votes and collection access.

use super::fixtures::{Harness, SERVICE_ROOT, berlin, session, task_id, working_day};
use crate::task::{
    domain::{DocumentId, EntityId, Locator, TaskDomainError, VoteType},
    services::{CreateTaskRequest, FetchOptions, TaskGatewayError},
};
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> Harness {
    Harness::new(true, 10, 20)
}

fn document() -> DocumentId {
    DocumentId::new(Locator::parse(&format!("{SERVICE_ROOT}document/77")).expect("valid locator"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_is_cached_complete(harness: Harness) {
    let request =
        CreateTaskRequest::new("Map bridges", "Photograph each one", working_day(), berlin());

    let id = harness
        .gateway
        .create_task(&session(), request)
        .await
        .expect("valid request")
        .expect("service accepted task");

    let cached = harness.cached(&id).expect("refreshed after creation");
    assert!(cached.is_complete());
    assert_eq!(cached.title(), "Map bridges");
    assert_eq!(cached.relevant_area(), berlin());
}

#[rstest]
#[case("  \t", "Photograph each one", TaskDomainError::EmptyTitle)]
#[case("Map bridges", "", TaskDomainError::EmptyDescription)]
#[tokio::test(flavor = "multi_thread")]
async fn blank_task_text_is_rejected_before_sending(
    harness: Harness,
    #[case] title: &str,
    #[case] description: &str,
    #[case] expected: TaskDomainError,
) {
    let request = CreateTaskRequest::new(title, description, working_day(), berlin());

    let result = harness.gateway.create_task(&session(), request).await;

    assert!(matches!(result, Err(TaskGatewayError::Domain(err)) if err == expected));
    assert_eq!(harness.calls().total(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comment_appears_in_cached_task(harness: Harness) {
    let id = harness.seed("Survey");
    harness.gateway.task(&id, FetchOptions::metadata()).await;

    let comment_id = harness
        .gateway
        .add_comment_to_task(&session(), &id, "hello")
        .await
        .expect("valid comment")
        .expect("service accepted comment");

    let cached = harness.cached(&id).expect("refreshed after comment");
    let collections = cached.collections().expect("complete after refresh");
    let comment = collections.comments().get(&comment_id).expect("new comment cached");
    assert_eq!(comment.content(), "hello");
    assert_eq!(comment_id.root(), &id);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_comment_is_rejected_before_sending(harness: Harness) {
    let id = harness.seed("Survey");

    let result = harness.gateway.add_comment_to_task(&session(), &id, " ").await;

    assert!(matches!(
        result,
        Err(TaskGatewayError::Domain(TaskDomainError::EmptyCommentContent))
    ));
    assert_eq!(harness.calls().total(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comment_on_unknown_task_reports_failure(harness: Harness) {
    let result = harness
        .gateway
        .add_comment_to_task(&session(), &task_id(404), "hello")
        .await
        .expect("valid comment");

    assert!(result.is_none());
    assert_eq!(harness.calls().snapshot, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tag_on_submission_refreshes_owning_task(harness: Harness) {
    let id = harness.seed("Survey");
    let submission_id = harness
        .gateway
        .add_submission_to_task(&session(), &id, &document())
        .await
        .expect("service accepted submission");

    let tag_id = harness
        .gateway
        .add_tag_to_entity(&session(), &EntityId::from(submission_id.clone()), "photo")
        .await
        .expect("valid tag")
        .expect("service accepted tag");

    assert_eq!(tag_id.root(), &id);
    assert_eq!(tag_id.as_sub_entity().parent(), submission_id.locator());
    let cached = harness.cached(&id).expect("refreshed after tagging");
    let submission = cached
        .collections()
        .and_then(|c| c.submissions().get(&submission_id))
        .expect("submission cached");
    assert_eq!(submission.document(), &document());
    assert_eq!(
        submission.tags().get(&tag_id).map(|tag| tag.value()),
        Some("photo")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn votes_round_trip_and_refresh_cache(harness: Harness) {
    let id = harness.seed("Survey");
    let entity = EntityId::from(id.clone());
    let voter = session();

    assert!(harness.gateway.set_user_vote(&voter, &entity, VoteType::Up).await);
    assert_eq!(
        harness.gateway.user_vote(&voter, &entity).await,
        Some(VoteType::Up)
    );
    assert_eq!(harness.cached(&id).map(|task| task.votes().up()), Some(1));

    assert!(harness.gateway.set_user_vote(&voter, &entity, VoteType::Down).await);
    let votes = harness.cached(&id).map(|task| task.votes());
    assert_eq!(votes.map(|v| (v.up(), v.down())), Some((0, 1)));

    assert!(harness.gateway.remove_user_vote(&voter, &entity).await);
    assert_eq!(harness.gateway.user_vote(&voter, &entity).await, None);
    assert_eq!(harness.cached(&id).map(|task| task.votes().down()), Some(0));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn vote_on_unknown_entity_returns_false(harness: Harness) {
    let entity = EntityId::from(task_id(404));

    assert!(!harness.gateway.set_user_vote(&session(), &entity, VoteType::Up).await);
    assert!(!harness.gateway.remove_user_vote(&session(), &entity).await);
    assert_eq!(harness.calls().task_loads(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mutation_without_cache_skips_refresh() {
    let harness = Harness::new(false, 10, 20);
    let id = harness.seed("Survey");

    harness
        .gateway
        .add_comment_to_task(&session(), &id, "hello")
        .await
        .expect("valid comment")
        .expect("service accepted comment");

    assert_eq!(harness.calls().task_loads(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn metadata_task_collections_are_loaded_on_access(harness: Harness) {
    let id = harness.seed("Survey");
    harness
        .gateway
        .add_comment_to_task(&session(), &id, "first")
        .await
        .expect("valid comment");
    let metadata = harness
        .gateway
        .task(&id, FetchOptions::metadata().forced())
        .await
        .expect("task exists");
    assert!(metadata.collections().is_none());

    let comments = harness
        .gateway
        .comments(&metadata)
        .await
        .expect("collections load");

    assert_eq!(comments.len(), 1);
    assert!(harness.cached(&id).is_some_and(|task| task.is_complete()));
    let first = comments.keys().next().expect("one comment");
    assert!(harness.gateway.comment(&metadata, first).await.is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn complete_task_collections_need_no_request(harness: Harness) {
    let id = harness.seed("Survey");
    let complete = harness
        .gateway
        .task(&id, FetchOptions::complete())
        .await
        .expect("task exists");
    let before = harness.calls();

    let submissions = harness.gateway.submissions(&complete).await;
    let tags = harness.gateway.tags(&complete).await;

    assert!(submissions.is_some_and(|s| s.is_empty()));
    assert!(tags.is_some_and(|t| t.is_empty()));
    assert_eq!(harness.calls(), before);
}
