//! In-memory integration tests for task CRUD and the auto-close rule.

use crate::in_memory::helpers::{engine, future_date, past_date, task_fields, Engine};
use rstest::rstest;
use volmatch::task::domain::{NgoId, TaskPatch, TaskStatus, VolunteerId};
use volmatch::task::ports::TaskRepository;
use volmatch::task::services::{ParticipationError, TaskLifecycleError};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_round_trips_through_reads(engine: Engine) {
    let owner = NgoId::new();
    let created = engine
        .lifecycle
        .create_task(owner, task_fields(future_date()))
        .await
        .expect("task creation should succeed");

    let overview = engine
        .lifecycle
        .get_task(created.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(overview.task, created);

    let open = engine
        .lifecycle
        .list_open_tasks()
        .await
        .expect("listing should succeed");
    assert_eq!(open.len(), 1);
}

// Scenario: a task dated yesterday is closed on read, and the closure
// blocks any further application.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn past_dated_task_closes_on_read_and_rejects_applications(engine: Engine) {
    let created = engine
        .lifecycle
        .create_task(NgoId::new(), task_fields(past_date()))
        .await
        .expect("task creation should succeed");
    assert_eq!(created.status(), TaskStatus::Open);

    let overview = engine
        .lifecycle
        .get_task(created.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(overview.task.status(), TaskStatus::Closed);

    let result = engine
        .participation
        .apply_to_task(created.id(), VolunteerId::new(), None)
        .await;
    assert!(matches!(
        result,
        Err(ParticipationError::TaskNotOpen {
            status: TaskStatus::Closed,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn auto_close_persists_and_later_reads_are_no_ops(engine: Engine) {
    let created = engine
        .lifecycle
        .create_task(NgoId::new(), task_fields(past_date()))
        .await
        .expect("task creation should succeed");

    engine
        .lifecycle
        .get_task(created.id())
        .await
        .expect("first read should succeed");
    let after_first = engine
        .tasks
        .find_by_id(created.id())
        .await
        .expect("raw lookup should succeed")
        .expect("task should exist");
    assert_eq!(after_first.status(), TaskStatus::Closed);

    engine
        .lifecycle
        .get_task(created.id())
        .await
        .expect("second read should succeed");
    let after_second = engine
        .tasks
        .find_by_id(created.id())
        .await
        .expect("raw lookup should succeed")
        .expect("task should exist");
    assert_eq!(
        after_second.updated_at(),
        after_first.updated_at(),
        "a second read does not rewrite the closed task"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn organizer_lifecycle_runs_open_in_progress_completed(engine: Engine) {
    let owner = NgoId::new();
    let created = engine
        .lifecycle
        .create_task(owner, task_fields(future_date()))
        .await
        .expect("task creation should succeed");

    let in_progress = engine
        .lifecycle
        .update_task(
            created.id(),
            owner,
            TaskPatch {
                status: Some(TaskStatus::InProgress),
                ..TaskPatch::new()
            },
        )
        .await
        .expect("start should succeed");
    assert_eq!(in_progress.status(), TaskStatus::InProgress);

    let completed = engine
        .lifecycle
        .update_task(
            created.id(),
            owner,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::new()
            },
        )
        .await
        .expect("completion should succeed");
    assert_eq!(completed.status(), TaskStatus::Completed);

    let reopen = engine
        .lifecycle
        .update_task(
            created.id(),
            owner,
            TaskPatch {
                status: Some(TaskStatus::Open),
                ..TaskPatch::new()
            },
        )
        .await;
    assert!(matches!(reopen, Err(TaskLifecycleError::Domain(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletion_cascade_hides_applications_from_volunteer_views(engine: Engine) {
    let owner = NgoId::new();
    let volunteer = VolunteerId::new();
    let created = engine
        .lifecycle
        .create_task(owner, task_fields(future_date()))
        .await
        .expect("task creation should succeed");
    engine
        .participation
        .apply_to_task(created.id(), volunteer, None)
        .await
        .expect("application should succeed");

    engine
        .lifecycle
        .delete_task(created.id(), owner)
        .await
        .expect("deletion should succeed");

    let mine = engine
        .participation
        .list_applications_for_volunteer(volunteer)
        .await
        .expect("listing should succeed");
    assert!(mine.is_empty(), "no orphaned application reaches a client view");

    let task_lookup = engine.lifecycle.get_task(created.id()).await;
    assert!(matches!(task_lookup, Err(TaskLifecycleError::NotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_counts_follow_the_application_flow(engine: Engine) {
    let owner = NgoId::new();
    let created = engine
        .lifecycle
        .create_task(owner, task_fields(future_date()))
        .await
        .expect("task creation should succeed");

    let first = engine
        .participation
        .apply_to_task(created.id(), VolunteerId::new(), None)
        .await
        .expect("first application should succeed");
    engine
        .participation
        .apply_to_task(created.id(), VolunteerId::new(), None)
        .await
        .expect("second application should succeed");
    engine
        .participation
        .decide_application(first.id(), owner, volmatch::task::domain::Decision::Approve)
        .await
        .expect("approval should succeed");

    let overview = engine
        .lifecycle
        .get_task(created.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(overview.approved_volunteers, 1);
    assert_eq!(overview.pending_applications, 1);
}
