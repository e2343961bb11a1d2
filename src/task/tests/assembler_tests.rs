//! Wire-to-domain assembly tests.

use super::fixtures::{SERVICE_ROOT, instant, snapshot_record, task_id, task_locator};
use crate::task::{
    domain::{LoadType, Locator, TaskDomainError},
    ports::wire::{
        CommentEntry, CommentResource, LinkResource, LinkWrapper, SubmissionEntry,
        SubmissionResource, TagEntry, TagResource, TagsResource, TaskLinkResource,
        TaskMetadataResource, VotesResource,
    },
    services::EntityAssembler,
};
use rstest::{fixture, rstest};

#[fixture]
fn assembler() -> EntityAssembler {
    EntityAssembler::new()
}

fn link(href: String) -> LinkResource {
    LinkResource {
        rel: "self".to_owned(),
        href,
    }
}

fn creator() -> LinkWrapper {
    LinkWrapper::self_link(format!("{SERVICE_ROOT}user/bob"))
}

fn tag_record(href: String, value: &str) -> TagResource {
    TagResource {
        link: link(href),
        value: value.to_owned(),
        creation_time: instant(10),
        creator: creator(),
        votes: VotesResource { up: 1, down: 0 },
    }
}

#[rstest]
fn metadata_record_builds_metadata_task(assembler: EntityAssembler) {
    let snapshot = snapshot_record(&task_locator(1), "Survey");
    let record = TaskMetadataResource {
        task: snapshot.task,
        submissions: LinkWrapper::new("submissions", format!("{}/submissions", task_locator(1))),
        comments: LinkWrapper::new("comments", format!("{}/comments", task_locator(1))),
        tags: LinkWrapper::new("tags", format!("{}/tags", task_locator(1))),
    };

    let task = assembler.task_from_metadata(&record).expect("valid record");

    assert_eq!(task.id(), &task_id(1));
    assert_eq!(task.load_type(), LoadType::Metadata);
    assert_eq!(task.title(), "Survey");
    assert_eq!(task.votes().up(), 2);
}

#[rstest]
fn snapshot_record_links_sub_entities_to_their_task(assembler: EntityAssembler) {
    let task_href = task_locator(7);
    let submission_href = format!("{task_href}/submission/1");
    let mut record = snapshot_record(&task_href, "Survey");
    record.comments.list.push(CommentEntry {
        comment: CommentResource {
            link: link(format!("{task_href}/comment/2")),
            content: "Looks good".to_owned(),
            creation_time: instant(10),
            creator: creator(),
            votes: VotesResource { up: 0, down: 0 },
        },
    });
    record.tags.list.push(TagEntry {
        tag: tag_record(format!("{task_href}/tag/3"), "river"),
    });
    record.submissions.list.push(SubmissionEntry {
        submission: SubmissionResource {
            link: link(submission_href.clone()),
            votes: VotesResource { up: 4, down: 0 },
            document: LinkWrapper::self_link(format!("{SERVICE_ROOT}document/11")),
            creation_time: instant(11),
            creator: creator(),
            tags: TagsResource {
                list: vec![TagEntry {
                    tag: tag_record(format!("{submission_href}/tag/5"), "photo"),
                }],
            },
        },
    });

    let task = assembler.task_from_snapshot(&record).expect("valid record");
    let collections = task.collections().expect("complete task");

    assert_eq!(task.load_type(), LoadType::Complete);
    assert_eq!(collections.comments().len(), 1);
    assert_eq!(collections.tags().len(), 1);

    let submission = collections
        .submissions()
        .values()
        .next()
        .expect("one submission");
    assert_eq!(submission.id().root(), &task_id(7));
    let submission_tag = submission.tags().values().next().expect("one tag");
    assert_eq!(submission_tag.value(), "photo");
    assert_eq!(submission_tag.id().root(), &task_id(7));
    assert_eq!(
        submission_tag.id().as_sub_entity().parent().as_str(),
        submission_href
    );
}

#[rstest]
fn malformed_area_is_rejected(assembler: EntityAssembler) {
    let mut record = snapshot_record(&task_locator(1), "Survey");
    record.task.constraints.location.bbox = [13.8, 52.3, 13.0, 52.7];

    assert!(matches!(
        assembler.task_from_snapshot(&record),
        Err(TaskDomainError::InvertedLongitudes { .. })
    ));
}

#[rstest]
fn page_links_keep_order_and_find_next_relation(assembler: EntityAssembler) {
    let list = vec![
        TaskLinkResource::new(task_locator(3)),
        TaskLinkResource::new(task_locator(1)),
        TaskLinkResource::new(task_locator(2)),
    ];
    let related = vec![
        LinkWrapper::new("previous", format!("{SERVICE_ROOT}results/0/0")),
        LinkWrapper::new("next", format!("{SERVICE_ROOT}results/0/2")),
    ];

    let ids = assembler.page_task_ids(&list).expect("valid links");
    let next = assembler.next_page(&related).expect("valid links");

    assert_eq!(ids, vec![task_id(3), task_id(1), task_id(2)]);
    assert_eq!(
        next,
        Some(Locator::parse(&format!("{SERVICE_ROOT}results/0/2")).expect("valid"))
    );
    assert_eq!(assembler.next_page(&related[..1]).expect("valid"), None);
}
