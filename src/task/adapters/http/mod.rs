//! HTTP adapter for the Task API built on `reqwest`.
//!
//! Reads authenticate with the system session given at construction;
//! mutations authenticate with the caller's session. Every request uses HTTP
//! Basic authentication and exchanges JSON bodies.

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header, redirect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::task::{
    domain::{Locator, SystemSession, TaskId, UserSession, VoteType},
    ports::{
        CommonQuery, Listing, ResourceClient, ResourceError, ResourceResult,
        wire::{
            BaseTagResource, CommentCreationResource, DispatchQueryResource,
            MultipleMetadataTasksResource, MultipleSnapshotTasksResource, MultipleTagsResource,
            MultipleTasksRequest, MultipleValuesRequest, QueryResultPageResource,
            ResultPageResource, ServiceInstanceResource, SubmissionCreationResource,
            TagCreationResource, TaskCreationResource, TaskMetadataResource, TaskSnapshotResource,
            UserVoteResource,
        },
    },
};

/// Credentials attached to one request.
#[derive(Clone, Copy)]
struct Credentials<'a> {
    auth_id: &'a str,
    password: &'a str,
}

impl<'a> From<&'a UserSession> for Credentials<'a> {
    fn from(session: &'a UserSession) -> Self {
        Self {
            auth_id: session.auth_id(),
            password: session.password(),
        }
    }
}

impl<'a> From<&'a SystemSession> for Credentials<'a> {
    fn from(session: &'a SystemSession) -> Self {
        Self {
            auth_id: session.auth_id(),
            password: session.password(),
        }
    }
}

/// [`ResourceClient`] speaking to a remote Task API instance.
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    client: Client,
    base: Locator,
    system: SystemSession,
}

impl HttpResourceClient {
    /// Creates a client for the service rooted at `service_url`.
    ///
    /// Redirects are not followed: query dispatch reports result locations
    /// through the `Location` header and those are resolved explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Transport`] when the HTTP client cannot be
    /// built, or [`ResourceError::Decode`] when `service_url` cannot carry
    /// child paths.
    pub fn new(service_url: Url, system: SystemSession) -> ResourceResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let client = Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(ResourceError::transport)?;
        Ok(Self::with_client(
            client,
            Locator::from_url(service_url).map_err(ResourceError::decode)?,
            system,
        ))
    }

    /// Creates a client reusing an existing `reqwest` client.
    #[must_use]
    pub const fn with_client(client: Client, base: Locator, system: SystemSession) -> Self {
        Self {
            client,
            base,
            system,
        }
    }

    /// Returns the service root.
    #[must_use]
    pub const fn base(&self) -> &Locator {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Locator {
        self.base.child(segments)
    }

    fn request(
        &self,
        method: Method,
        target: &Locator,
        credentials: Credentials<'_>,
    ) -> RequestBuilder {
        debug!(%method, resource = %target, "task api request");
        self.client
            .request(method, target.as_url().clone())
            .basic_auth(credentials.auth_id, Some(credentials.password))
    }

    fn system(&self) -> Credentials<'_> {
        Credentials::from(&self.system)
    }

    async fn send(request: RequestBuilder, target: &Locator) -> ResourceResult<Response> {
        let response = request.send().await.map_err(ResourceError::transport)?;
        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => Err(ResourceError::NotFound(target.clone())),
            StatusCode::NO_CONTENT => Ok(response),
            _ if status.is_success() => Ok(response),
            _ => {
                warn!(resource = %target, status = status.as_u16(), "task api rejected request");
                Err(ResourceError::UnexpectedStatus {
                    target: target.to_string(),
                    status: status.as_u16(),
                })
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        target: &Locator,
    ) -> ResourceResult<T> {
        if response.status() == StatusCode::NO_CONTENT {
            return Err(ResourceError::NoResults(target.clone()));
        }
        let body = response.bytes().await.map_err(ResourceError::transport)?;
        serde_json::from_slice(&body).map_err(ResourceError::decode)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        target: &Locator,
        credentials: Credentials<'_>,
    ) -> ResourceResult<T> {
        let response = Self::send(self.request(Method::GET, target, credentials), target).await?;
        Self::read_json(response, target).await
    }

    async fn post_json<B, T>(
        &self,
        target: &Locator,
        body: &B,
        credentials: Credentials<'_>,
    ) -> ResourceResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, target, credentials).json(body);
        let response = Self::send(request, target).await?;
        Self::read_json(response, target).await
    }

    async fn post_for_location<B>(
        &self,
        target: &Locator,
        body: &B,
        credentials: Credentials<'_>,
    ) -> ResourceResult<Locator>
    where
        B: Serialize + Sync,
    {
        let request = self.request(Method::POST, target, credentials).json(body);
        let response = Self::send(request, target).await?;
        location_of(&response, target)
    }
}

/// Resolves the `Location` header of a response against the request target.
fn location_of(response: &Response, target: &Locator) -> ResourceResult<Locator> {
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ResourceError::MissingLocation(target.to_string()))?;
    let url = target
        .as_url()
        .join(location)
        .map_err(ResourceError::decode)?;
    Locator::from_url(url).map_err(ResourceError::decode)
}

fn vote_target(entity: &Locator, session: &UserSession) -> Locator {
    entity.child(&["vote", "user", session.auth_id()])
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn service_parameters(&self) -> ResourceResult<ServiceInstanceResource> {
        self.get_json(&self.base, self.system()).await
    }

    async fn task_metadata(&self, task: &TaskId) -> ResourceResult<TaskMetadataResource> {
        self.get_json(task.locator(), self.system()).await
    }

    async fn task_snapshot(&self, task: &TaskId) -> ResourceResult<TaskSnapshotResource> {
        self.get_json(&task.locator().child(&["snapshot"]), self.system())
            .await
    }

    async fn multiple_task_metadata(
        &self,
        request: &MultipleTasksRequest,
    ) -> ResourceResult<MultipleMetadataTasksResource> {
        self.post_json(&self.endpoint(&["tasks", "metadata"]), request, self.system())
            .await
    }

    async fn multiple_task_snapshots(
        &self,
        request: &MultipleTasksRequest,
    ) -> ResourceResult<MultipleSnapshotTasksResource> {
        self.post_json(&self.endpoint(&["tasks", "snapshots"]), request, self.system())
            .await
    }

    async fn listing_page(&self, listing: &Listing) -> ResourceResult<ResultPageResource> {
        let target = match listing {
            Listing::All => self.endpoint(&["tasks"]),
            Listing::Since(instant) => {
                let since = instant.to_rfc3339_opts(SecondsFormat::Millis, true);
                self.endpoint(&["tasks", "since", since.as_str()])
            }
            Listing::Page(page) => page.clone(),
        };
        self.get_json(&target, self.system()).await
    }

    async fn dispatch_query(&self, query: &DispatchQueryResource) -> ResourceResult<Locator> {
        self.post_for_location(&self.endpoint(&["query"]), query, self.system())
            .await
    }

    async fn common_query(&self, query: &CommonQuery) -> ResourceResult<Locator> {
        let (order, params) = match *query {
            CommonQuery::InArea { order, area } => {
                let south_west = area.south_west();
                let north_east = area.north_east();
                (
                    order,
                    vec![
                        ("lat1", south_west.latitude()),
                        ("lon1", south_west.longitude()),
                        ("lat2", north_east.latitude()),
                        ("lon2", north_east.longitude()),
                    ],
                )
            }
            CommonQuery::Near { order, position } => (
                order,
                vec![("lat", position.latitude()), ("lon", position.longitude())],
            ),
        };
        let target = self.endpoint(&["query", "common", order.as_str()]);
        let request = self
            .request(Method::GET, &target, self.system())
            .query(&params);
        let response = Self::send(request, &target).await?;
        location_of(&response, &target)
    }

    async fn query_result_page(&self, page: &Locator) -> ResourceResult<QueryResultPageResource> {
        self.get_json(page, self.system()).await
    }

    async fn multiple_tags(
        &self,
        request: &MultipleValuesRequest,
    ) -> ResourceResult<MultipleTagsResource> {
        self.post_json(&self.endpoint(&["tags", "multiple"]), request, self.system())
            .await
    }

    async fn create_task(
        &self,
        session: &UserSession,
        body: &TaskCreationResource,
    ) -> ResourceResult<Locator> {
        self.post_for_location(&self.endpoint(&["tasks"]), body, session.into())
            .await
    }

    async fn create_comment(
        &self,
        session: &UserSession,
        task: &TaskId,
        body: &CommentCreationResource,
    ) -> ResourceResult<Locator> {
        self.post_for_location(&task.locator().child(&["comments"]), body, session.into())
            .await
    }

    async fn create_submission(
        &self,
        session: &UserSession,
        task: &TaskId,
        body: &SubmissionCreationResource,
    ) -> ResourceResult<Locator> {
        self.post_for_location(
            &task.locator().child(&["submissions"]),
            body,
            session.into(),
        )
        .await
    }

    async fn create_base_tag(
        &self,
        session: &UserSession,
        body: &TagCreationResource,
    ) -> ResourceResult<BaseTagResource> {
        self.post_json(&self.endpoint(&["tags"]), body, session.into())
            .await
    }

    async fn attach_tag(
        &self,
        session: &UserSession,
        entity: &Locator,
        tag: &BaseTagResource,
    ) -> ResourceResult<Locator> {
        self.post_for_location(&entity.child(&["tags"]), tag, session.into())
            .await
    }

    async fn user_vote(
        &self,
        session: &UserSession,
        entity: &Locator,
    ) -> ResourceResult<UserVoteResource> {
        self.get_json(&vote_target(entity, session), session.into())
            .await
    }

    async fn set_user_vote(
        &self,
        session: &UserSession,
        entity: &Locator,
        vote: VoteType,
    ) -> ResourceResult<()> {
        let target = vote_target(entity, session).child(&[vote.as_str()]);
        let request = self.request(Method::PUT, &target, session.into());
        Self::send(request, &target).await.map(|_| ())
    }

    async fn remove_user_vote(
        &self,
        session: &UserSession,
        entity: &Locator,
    ) -> ResourceResult<()> {
        let target = vote_target(entity, session);
        let request = self.request(Method::DELETE, &target, session.into());
        Self::send(request, &target).await.map(|_| ())
    }
}
