//! Wire-format records exchanged with the Task API.
//!
//! These mirror the JSON documents of the service one to one and carry no
//! behaviour beyond a few constructors; conversion into domain entities
//! lives in [`crate::task::services::EntityAssembler`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Relation name of the link pointing at the following result page.
pub const NEXT_RELATION: &str = "next";

/// Relation name of a self link.
pub const SELF_RELATION: &str = "self";

/// Typed hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkResource {
    /// Relation of the target to the containing document.
    pub rel: String,
    /// Absolute target locator.
    pub href: String,
}

/// Object wrapping a single hyperlink under `link`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkWrapper {
    /// The wrapped link.
    pub link: LinkResource,
}

impl LinkWrapper {
    /// Creates a wrapped link.
    #[must_use]
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            link: LinkResource {
                rel: rel.into(),
                href: href.into(),
            },
        }
    }

    /// Creates a wrapped `self` link.
    #[must_use]
    pub fn self_link(href: impl Into<String>) -> Self {
        Self::new(SELF_RELATION, href)
    }

    /// Returns the link target.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.link.href
    }
}

/// Vote tally document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotesResource {
    /// Up votes.
    pub up: u64,
    /// Down votes.
    pub down: u64,
}

/// Time interval document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeResource {
    /// Start, ISO-8601 UTC.
    pub start: DateTime<Utc>,
    /// End, ISO-8601 UTC.
    pub end: DateTime<Utc>,
}

/// GeoJSON-style bounding box `[west, south, east, north]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxResource {
    /// Corner coordinates.
    pub bbox: [f64; 4],
}

/// Spatial and temporal relevance of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintsResource {
    /// Relevant time range.
    pub time: TimeRangeResource,
    /// Relevant area.
    pub location: BoundingBoxResource,
}

/// Base attributes of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResource {
    /// Self link carrying the task locator.
    pub link: LinkResource,
    /// Relevance constraints.
    pub constraints: ConstraintsResource,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Creation timestamp.
    pub creation_time: DateTime<Utc>,
    /// Link to the creating user.
    pub creator: LinkWrapper,
    /// Vote tally.
    pub votes: VotesResource,
}

/// Metadata view of a task: base attributes plus links to sub-collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadataResource {
    /// Base attributes.
    pub task: TaskResource,
    /// Link to the submissions collection.
    pub submissions: LinkWrapper,
    /// Link to the comments collection.
    pub comments: LinkWrapper,
    /// Link to the tags collection.
    pub tags: LinkWrapper,
}

/// Snapshot view of a task with every sub-collection inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshotResource {
    /// Base attributes.
    pub task: TaskResource,
    /// Submissions.
    pub submissions: SubmissionsResource,
    /// Comments.
    pub comments: CommentsResource,
    /// Tags attached to the task.
    pub tags: TagsResource,
}

/// Submission document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResource {
    /// Self link carrying the submission locator.
    pub link: LinkResource,
    /// Vote tally.
    pub votes: VotesResource,
    /// Link to the submitted document.
    pub document: LinkWrapper,
    /// Creation timestamp.
    pub creation_time: DateTime<Utc>,
    /// Link to the submitting user.
    pub creator: LinkWrapper,
    /// Tags attached to the submission.
    pub tags: TagsResource,
}

/// Entry of a submission list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEntry {
    /// The submission.
    pub submission: SubmissionResource,
}

/// Inlined submission collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionsResource {
    /// Entries in service order.
    pub list: Vec<SubmissionEntry>,
}

/// Comment document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResource {
    /// Self link carrying the comment locator.
    pub link: LinkResource,
    /// Comment text.
    pub content: String,
    /// Creation timestamp.
    pub creation_time: DateTime<Utc>,
    /// Link to the author.
    pub creator: LinkWrapper,
    /// Vote tally.
    pub votes: VotesResource,
}

/// Entry of a comment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    /// The comment.
    pub comment: CommentResource,
}

/// Inlined comment collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentsResource {
    /// Entries in service order.
    pub list: Vec<CommentEntry>,
}

/// Tag document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResource {
    /// Self link carrying the tag locator.
    pub link: LinkResource,
    /// Tag value.
    pub value: String,
    /// Creation timestamp.
    pub creation_time: DateTime<Utc>,
    /// Link to the tagging user.
    pub creator: LinkWrapper,
    /// Vote tally.
    pub votes: VotesResource,
}

/// Entry of a tag list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    /// The tag.
    pub tag: TagResource,
}

/// Inlined tag collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsResource {
    /// Entries in service order.
    pub list: Vec<TagEntry>,
}

/// Entry of a result page: a link to one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLinkResource {
    /// Link to the task.
    pub task: LinkWrapper,
}

impl TaskLinkResource {
    /// Creates an entry linking to `href`.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            task: LinkWrapper::self_link(href),
        }
    }
}

/// One page of a plain task listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPageResource {
    /// Link to this page.
    pub page: LinkWrapper,
    /// Tasks on this page, in order.
    pub list: Vec<TaskLinkResource>,
    /// Related pages, including an optional `next` relation.
    pub related: Vec<LinkWrapper>,
}

/// One page of a query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResource {
    /// Link to this page.
    pub link: LinkResource,
    /// Tasks on this page, in order.
    pub list: Vec<TaskLinkResource>,
    /// Related pages, including an optional `next` relation.
    pub related: Vec<LinkWrapper>,
}

/// Result summary of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsResource {
    /// Total number of matching tasks.
    pub count: u64,
    /// The current page.
    pub page: PageResource,
}

/// Realised page of a dispatched query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResultPageResource {
    /// Link to the query.
    pub query: LinkWrapper,
    /// Results.
    pub results: ResultsResource,
}

/// Request body for fetching several tasks at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleTasksRequest {
    /// Task locators.
    pub tasks: Vec<String>,
}

/// Batched metadata response keyed by task locator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultipleMetadataTasksResource {
    /// Tasks found; unknown locators are absent.
    pub results: HashMap<String, TaskMetadataResource>,
}

/// Batched snapshot response keyed by task locator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultipleSnapshotTasksResource {
    /// Tasks found; unknown locators are absent.
    pub results: HashMap<String, TaskSnapshotResource>,
}

/// Request body for creating a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCreationResource {
    /// Relevance constraints.
    pub constraints: ConstraintsResource,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
}

/// Request body for adding a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCreationResource {
    /// Comment text.
    pub content: String,
}

/// Request body for adding a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionCreationResource {
    /// Link to the submitted document.
    pub document: LinkWrapper,
}

/// Request body for creating a base tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCreationResource {
    /// Tag value.
    pub value: String,
}

/// A tag value known to the service, independent of any entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseTagResource {
    /// Link to the base tag.
    pub base_tag: LinkWrapper,
}

/// Request body for resolving several tag values at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleValuesRequest {
    /// Tag values.
    pub values: Vec<String>,
}

/// Base tags keyed by value; unknown values are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleTagsResource {
    /// Resolved base tags.
    pub results: HashMap<String, BaseTagResource>,
}

/// Filter part of a dispatched query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResource {
    /// Time range to intersect.
    pub time: TimeRangeResource,
    /// Area to intersect.
    pub location: BoundingBoxResource,
    /// Base tag locators every match must carry.
    pub tags: Vec<String>,
}

/// Request body for dispatching a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchQueryResource {
    /// The query.
    pub query: QueryResource,
}

/// A user's vote on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVoteResource {
    /// `up`, `down`, or another marker when no vote was cast.
    pub vote: String,
}

/// Tunable parameters advertised by a service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametersResource {
    /// Largest number of tasks accepted by one batched request.
    pub batch_limit: usize,
}

/// Service instance document served at the service root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstanceResource {
    /// Instance parameters.
    pub parameters: ParametersResource,
}
