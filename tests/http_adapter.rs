//! Integration tests for [`HttpResourceClient`] against a stub Task API.
//!
//! Each test mounts the exact requests it expects on a `wiremock` server;
//! unexpected requests receive 404 and expectations are verified when the
//! server drops.

use std::sync::Arc;

use diretto_task_client::task::{
    adapters::http::HttpResourceClient,
    domain::{
        BoundingBox, EntityId, Locator, OrderType, Position, SystemSession, TaskId, UserSession,
        VoteType,
    },
    ports::{CommonQuery, ResourceClient, ResourceError, wire::MultipleTasksRequest},
    services::{EntityCache, FetchOptions, TaskGateway},
};
use eyre::{Result, eyre};
use serde_json::{Map, Value, json};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{basic_auth, body_json, method, path, query_param},
};

struct Stub {
    server: MockServer,
    client: HttpResourceClient,
}

impl Stub {
    async fn start() -> Result<Self> {
        let server = MockServer::start().await;
        let base = Url::parse(&format!("{}/v2/", server.uri()))?;
        let client = HttpResourceClient::new(base, SystemSession::new("system", "s3cret"))?;
        Ok(Self { server, client })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/v2/{suffix}", self.server.uri())
    }

    fn task_id(&self, n: u32) -> Result<TaskId> {
        Ok(TaskId::parse(&self.url(&format!("task/{n}")))?)
    }

    fn gateway(&self) -> TaskGateway<HttpResourceClient> {
        TaskGateway::new(Arc::new(self.client.clone()), EntityCache::inactive(), 10)
    }
}

fn task_document(href: &str, base: &str) -> Value {
    json!({
        "link": { "rel": "self", "href": href },
        "constraints": {
            "time": { "start": "2024-05-01T08:00:00Z", "end": "2024-05-01T18:00:00Z" },
            "location": { "bbox": [13.0, 52.3, 13.8, 52.7] }
        },
        "title": "Map bridges",
        "description": "Photograph each one",
        "creationTime": "2024-05-01T09:00:00Z",
        "creator": { "link": { "rel": "self", "href": format!("{base}user/alice") } },
        "votes": { "up": 3, "down": 1 }
    })
}

fn metadata_document(href: &str, base: &str) -> Value {
    json!({
        "task": task_document(href, base),
        "submissions": { "link": { "rel": "submissions", "href": format!("{href}/submissions") } },
        "comments": { "link": { "rel": "comments", "href": format!("{href}/comments") } },
        "tags": { "link": { "rel": "tags", "href": format!("{href}/tags") } }
    })
}

fn alice() -> UserSession {
    UserSession::new("alice", "secret")
}

#[tokio::test(flavor = "multi_thread")]
async fn metadata_lookup_authenticates_as_system() -> Result<()> {
    let stub = Stub::start().await?;
    let href = stub.url("task/1");
    Mock::given(method("GET"))
        .and(path("/v2/task/1"))
        .and(basic_auth("system", "s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(metadata_document(&href, &stub.url(""))),
        )
        .expect(1)
        .mount(&stub.server)
        .await;

    let task = stub
        .gateway()
        .task(&stub.task_id(1)?, FetchOptions::metadata())
        .await
        .ok_or_else(|| eyre!("task should decode"))?;

    assert_eq!(task.title(), "Map bridges");
    assert_eq!(task.votes().balance(), 2);
    assert_eq!(task.relevant_area(), BoundingBox::new(52.3, 13.0, 52.7, 13.8)?);
    assert!(!task.is_complete());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshot_lookup_reads_inlined_collections() -> Result<()> {
    let stub = Stub::start().await?;
    let href = stub.url("task/1");
    let comment_href = stub.url("task/1/comment/5");
    let snapshot = json!({
        "task": task_document(&href, &stub.url("")),
        "submissions": { "list": [] },
        "comments": { "list": [ { "comment": {
            "link": { "rel": "self", "href": comment_href },
            "content": "Bridge 4 is closed",
            "creationTime": "2024-05-01T10:00:00Z",
            "creator": { "link": { "rel": "self", "href": stub.url("user/bob") } },
            "votes": { "up": 0, "down": 0 }
        } } ] },
        "tags": { "list": [] }
    });
    Mock::given(method("GET"))
        .and(path("/v2/task/1/snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot))
        .expect(1)
        .mount(&stub.server)
        .await;

    let task = stub
        .gateway()
        .task(&stub.task_id(1)?, FetchOptions::complete())
        .await
        .ok_or_else(|| eyre!("snapshot should decode"))?;

    let comments = task
        .collections()
        .ok_or_else(|| eyre!("snapshot is complete"))?
        .comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(
        comments.values().next().map(|comment| comment.content()),
        Some("Bridge 4 is closed")
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_task_is_absent() -> Result<()> {
    let stub = Stub::start().await?;
    Mock::given(method("GET"))
        .and(path("/v2/task/9"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&stub.server)
        .await;

    let task = stub
        .gateway()
        .task(&stub.task_id(9)?, FetchOptions::metadata())
        .await;

    assert!(task.is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn common_query_resolves_relative_location() -> Result<()> {
    let stub = Stub::start().await?;
    Mock::given(method("GET"))
        .and(path("/v2/query/common/newest"))
        .and(query_param("lat1", "52.3"))
        .and(query_param("lon1", "13.0"))
        .and(query_param("lat2", "52.7"))
        .and(query_param("lon2", "13.8"))
        .respond_with(ResponseTemplate::new(202).insert_header("Location", "/v2/query/7/1"))
        .expect(1)
        .mount(&stub.server)
        .await;
    let query = CommonQuery::InArea {
        order: OrderType::Newest,
        area: BoundingBox::new(52.3, 13.0, 52.7, 13.8)?,
    };

    let location = stub.client.common_query(&query).await?;

    assert_eq!(location.as_str(), stub.url("query/7/1"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn accepted_query_without_location_is_an_error() -> Result<()> {
    let stub = Stub::start().await?;
    Mock::given(method("GET"))
        .and(path("/v2/query/common/toprated"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&stub.server)
        .await;
    let query = CommonQuery::Near {
        order: OrderType::TopRated,
        position: Position::new(52.5, 13.4)?,
    };

    let result = stub.client.common_query(&query).await;

    assert!(matches!(result, Err(ResourceError::MissingLocation(_))));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_query_page_maps_to_no_results() -> Result<()> {
    let stub = Stub::start().await?;
    Mock::given(method("GET"))
        .and(path("/v2/query/7/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&stub.server)
        .await;
    let page = Locator::parse(&stub.url("query/7/1"))?;

    let result = stub.client.query_result_page(&page).await;

    assert!(matches!(result, Err(ResourceError::NoResults(locator)) if locator == page));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_request_reports_status() -> Result<()> {
    let stub = Stub::start().await?;
    Mock::given(method("POST"))
        .and(path("/v2/tasks/metadata"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&stub.server)
        .await;
    let request = MultipleTasksRequest {
        tasks: vec![stub.url("task/1")],
    };

    let result = stub.client.multiple_task_metadata(&request).await;

    assert!(matches!(
        result,
        Err(ResourceError::UnexpectedStatus { status: 413, .. })
    ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn batch_lookup_posts_locators() -> Result<()> {
    let stub = Stub::start().await?;
    let first = stub.url("task/1");
    let second = stub.url("task/2");
    let mut results = Map::new();
    results.insert(first.clone(), metadata_document(&first, &stub.url("")));
    Mock::given(method("POST"))
        .and(path("/v2/tasks/metadata"))
        .and(body_json(json!({ "tasks": [first, second] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
        .expect(1)
        .mount(&stub.server)
        .await;
    let ids = [stub.task_id(1)?, stub.task_id(2)?];

    let tasks = stub
        .gateway()
        .tasks_by_ids(&ids, FetchOptions::metadata())
        .await?;

    assert_eq!(tasks.len(), 1);
    assert!(tasks.contains(&ids[0]));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn comment_creation_uses_user_credentials() -> Result<()> {
    let stub = Stub::start().await?;
    Mock::given(method("POST"))
        .and(path("/v2/task/1/comments"))
        .and(basic_auth("alice", "secret"))
        .and(body_json(json!({ "content": "On my way" })))
        .respond_with(
            ResponseTemplate::new(201).insert_header("Location", stub.url("task/1/comment/8")),
        )
        .expect(1)
        .mount(&stub.server)
        .await;
    let task = stub.task_id(1)?;

    let comment = stub
        .gateway()
        .add_comment_to_task(&alice(), &task, "On my way")
        .await?
        .ok_or_else(|| eyre!("comment should be created"))?;

    assert_eq!(comment.locator().as_str(), stub.url("task/1/comment/8"));
    assert_eq!(comment.root(), &task);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn vote_endpoints_follow_user_path() -> Result<()> {
    let stub = Stub::start().await?;
    Mock::given(method("PUT"))
        .and(path("/v2/task/1/vote/user/alice/down"))
        .and(basic_auth("alice", "secret"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&stub.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/task/1/vote/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vote": "down" })))
        .expect(1)
        .mount(&stub.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2/task/1/vote/user/alice"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&stub.server)
        .await;
    let gateway = stub.gateway();
    let entity = EntityId::from(stub.task_id(1)?);

    assert!(gateway.set_user_vote(&alice(), &entity, VoteType::Down).await);
    assert_eq!(
        gateway.user_vote(&alice(), &entity).await,
        Some(VoteType::Down)
    );
    assert!(gateway.remove_user_vote(&alice(), &entity).await);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn connect_discovers_batch_limit() -> Result<()> {
    let stub = Stub::start().await?;
    Mock::given(method("GET"))
        .and(path("/v2/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "parameters": { "batchLimit": 25 } })),
        )
        .expect(1)
        .mount(&stub.server)
        .await;

    let gateway = TaskGateway::connect(
        Arc::new(stub.client.clone()),
        EntityCache::inactive(),
        None,
    )
    .await?;

    assert_eq!(gateway.max_task_request_size(), 25);
    Ok(())
}
