//! Conversion between wire records and domain entities.

use crate::task::{
    domain::{
        BoundingBox, Comment, CommentBuilder, CommentId, DocumentId, EntityMap, Locator,
        SubEntityId, Submission, SubmissionBuilder, SubmissionId, Tag, TagBuilder, TagId, Task,
        TaskBuilder, TaskCollections, TaskDomainError, TaskId, TimeRange, UserId, Votes,
    },
    ports::wire::{
        BoundingBoxResource, CommentResource, ConstraintsResource, DispatchQueryResource,
        LinkResource, LinkWrapper, NEXT_RELATION, QueryResource, SubmissionResource, TagResource,
        TagsResource, TaskCreationResource, TaskLinkResource, TaskMetadataResource,
        TaskResource, TaskSnapshotResource, TimeRangeResource, VotesResource,
    },
};

/// Builds domain entities from wire records and wire records from domain
/// values.
///
/// Metadata records become [`crate::task::domain::LoadType::Metadata`]
/// tasks; snapshot records become complete tasks whose sub-entities carry
/// back-references to the task and to their immediate container.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityAssembler;

impl EntityAssembler {
    /// Creates an assembler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds a metadata-only task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the record violates a domain rule.
    pub fn task_from_metadata(
        &self,
        record: &TaskMetadataResource,
    ) -> Result<Task, TaskDomainError> {
        self.task_builder(&record.task)?.build()
    }

    /// Builds a complete task including every sub-collection.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the record violates a domain rule.
    pub fn task_from_snapshot(
        &self,
        record: &TaskSnapshotResource,
    ) -> Result<Task, TaskDomainError> {
        let task_id = TaskId::new(locator(&record.task.link)?);

        let mut submissions = EntityMap::new();
        for entry in &record.submissions.list {
            let submission = self.submission(&entry.submission, &task_id)?;
            submissions.insert(submission.id().clone(), submission);
        }

        let mut comments = EntityMap::new();
        for entry in &record.comments.list {
            let comment = self.comment(&entry.comment, &task_id)?;
            comments.insert(comment.id().clone(), comment);
        }

        let tags = self.tags(&record.tags, &task_id, task_id.locator())?;

        self.task_builder(&record.task)?
            .collections(TaskCollections::new(submissions, comments, tags))
            .build()
    }

    fn task_builder(&self, record: &TaskResource) -> Result<TaskBuilder, TaskDomainError> {
        Ok(TaskBuilder::new(TaskId::new(locator(&record.link)?))
            .title(record.title.clone())
            .description(record.description.clone())
            .created_at(record.creation_time)
            .creator(user(&record.creator)?)
            .votes(votes(record.votes))
            .relevant_time_range(time_range(record.constraints.time)?)
            .relevant_area(BoundingBox::from_geojson(record.constraints.location.bbox)?))
    }

    /// Builds a submission owned by `task`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the record violates a domain rule.
    pub fn submission(
        &self,
        record: &SubmissionResource,
        task: &TaskId,
    ) -> Result<Submission, TaskDomainError> {
        let submission_locator = locator(&record.link)?;
        let tags = self.tags(&record.tags, task, &submission_locator)?;
        let id = SubmissionId::new(SubEntityId::under_task(submission_locator, task));
        SubmissionBuilder::new(id, DocumentId::new(locator(&record.document.link)?))
            .created_at(record.creation_time)
            .creator(user(&record.creator)?)
            .votes(votes(record.votes))
            .tags(tags)
            .build()
    }

    /// Builds a comment owned by `task`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the record violates a domain rule.
    pub fn comment(
        &self,
        record: &CommentResource,
        task: &TaskId,
    ) -> Result<Comment, TaskDomainError> {
        let id = CommentId::new(SubEntityId::under_task(locator(&record.link)?, task));
        CommentBuilder::new(id)
            .content(record.content.clone())
            .created_at(record.creation_time)
            .creator(user(&record.creator)?)
            .votes(votes(record.votes))
            .build()
    }

    /// Builds a tag attached to `parent` within `task`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the record violates a domain rule.
    pub fn tag(
        &self,
        record: &TagResource,
        task: &TaskId,
        parent: &Locator,
    ) -> Result<Tag, TaskDomainError> {
        let id = TagId::new(SubEntityId::new(
            locator(&record.link)?,
            task.clone(),
            parent.clone(),
        ));
        TagBuilder::new(id)
            .value(record.value.clone())
            .created_at(record.creation_time)
            .creator(user(&record.creator)?)
            .votes(votes(record.votes))
            .build()
    }

    fn tags(
        &self,
        record: &TagsResource,
        task: &TaskId,
        parent: &Locator,
    ) -> Result<EntityMap<TagId, Tag>, TaskDomainError> {
        let mut tags = EntityMap::new();
        for entry in &record.list {
            let tag = self.tag(&entry.tag, task, parent)?;
            tags.insert(tag.id().clone(), tag);
        }
        Ok(tags)
    }

    /// Reads the task identifiers of a result page, in page order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidLocator`] for malformed links.
    pub fn page_task_ids(&self, list: &[TaskLinkResource]) -> Result<Vec<TaskId>, TaskDomainError> {
        list.iter()
            .map(|entry| TaskId::parse(entry.task.href()))
            .collect()
    }

    /// Finds the `next` relation among a page's related links.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidLocator`] when the link is malformed.
    pub fn next_page(&self, related: &[LinkWrapper]) -> Result<Option<Locator>, TaskDomainError> {
        related
            .iter()
            .find(|wrapper| wrapper.link.rel == NEXT_RELATION)
            .map(|wrapper| Locator::parse(wrapper.href()))
            .transpose()
    }

    /// Builds the creation body for a task.
    #[must_use]
    pub fn task_creation(
        &self,
        title: &str,
        description: &str,
        time_range: TimeRange,
        area: BoundingBox,
    ) -> TaskCreationResource {
        TaskCreationResource {
            constraints: ConstraintsResource {
                time: time_range_record(time_range),
                location: bounding_box_record(area),
            },
            title: title.to_owned(),
            description: description.to_owned(),
        }
    }

    /// Builds a filter query body from resolved base tag locators.
    #[must_use]
    pub fn filter_query(
        &self,
        base_tags: Vec<String>,
        area: BoundingBox,
        time_range: TimeRange,
    ) -> DispatchQueryResource {
        DispatchQueryResource {
            query: QueryResource {
                time: time_range_record(time_range),
                location: bounding_box_record(area),
                tags: base_tags,
            },
        }
    }
}

fn locator(link: &LinkResource) -> Result<Locator, TaskDomainError> {
    Locator::parse(&link.href)
}

fn user(link: &LinkWrapper) -> Result<UserId, TaskDomainError> {
    Ok(UserId::new(locator(&link.link)?))
}

const fn votes(record: VotesResource) -> Votes {
    Votes::new(record.up, record.down)
}

fn time_range(record: TimeRangeResource) -> Result<TimeRange, TaskDomainError> {
    TimeRange::new(record.start, record.end)
}

const fn time_range_record(range: TimeRange) -> TimeRangeResource {
    TimeRangeResource {
        start: range.start(),
        end: range.end(),
    }
}

const fn bounding_box_record(area: BoundingBox) -> BoundingBoxResource {
    BoundingBoxResource {
        bbox: area.to_geojson(),
    }
}
