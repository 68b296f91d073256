//! In-memory integration tests for the apply/decide flow and its
//! notifications.

use crate::in_memory::helpers::{engine, future_date, task_fields, Engine};
use rstest::rstest;
use volmatch::task::domain::{ApplicationStatus, Decision, NgoId, VolunteerId};
use volmatch::task::ports::{Notification, Recipient};
use volmatch::task::services::ParticipationError;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn apply_notifies_the_task_owner(engine: Engine) {
    let owner = NgoId::new();
    let volunteer = VolunteerId::new();
    let task = engine
        .lifecycle
        .create_task(owner, task_fields(future_date()))
        .await
        .expect("task creation should succeed");

    let application = engine
        .participation
        .apply_to_task(task.id(), volunteer, Some("I know the area".to_owned()))
        .await
        .expect("application should succeed");

    let deliveries = engine
        .notifier
        .deliveries()
        .expect("delivery log should be readable");
    assert!(deliveries.iter().any(|notification| matches!(
        notification,
        Notification::ApplicationSubmitted {
            owner: recipient,
            application_id,
            ..
        } if *recipient == owner && *application_id == application.id()
    )));
    assert_eq!(
        deliveries.first().map(Notification::recipient),
        Some(Recipient::Ngo { id: owner }),
        "the submission notification is addressed to the task owner"
    );
}

// Scenario: a volunteer applies twice; the second call surfaces the
// original application rather than creating or erroring destructively.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_application_surfaces_the_original(engine: Engine) {
    let volunteer = VolunteerId::new();
    let task = engine
        .lifecycle
        .create_task(NgoId::new(), task_fields(future_date()))
        .await
        .expect("task creation should succeed");

    let first = engine
        .participation
        .apply_to_task(task.id(), volunteer, None)
        .await
        .expect("first application should succeed");

    let second = engine
        .participation
        .apply_to_task(task.id(), volunteer, None)
        .await;

    let Err(ParticipationError::AlreadyApplied {
        application_id,
        status,
    }) = &second
    else {
        panic!("expected AlreadyApplied, got {second:?}");
    };
    assert_eq!(*application_id, first.id());
    assert_eq!(*status, ApplicationStatus::Pending);

    let all = engine
        .participation
        .list_applications_for_volunteer(volunteer)
        .await
        .expect("listing should succeed");
    assert_eq!(all.len(), 1, "no second record was created");
}

// Scenario: an NGO tries to decide on an application belonging to a
// different NGO's task.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn foreign_ngo_cannot_decide(engine: Engine) {
    let owner = NgoId::new();
    let task = engine
        .lifecycle
        .create_task(owner, task_fields(future_date()))
        .await
        .expect("task creation should succeed");
    let application = engine
        .participation
        .apply_to_task(task.id(), VolunteerId::new(), None)
        .await
        .expect("application should succeed");

    let result = engine
        .participation
        .decide_application(application.id(), NgoId::new(), Decision::Approve)
        .await;

    assert!(matches!(result, Err(ParticipationError::Forbidden { .. })));

    let unchanged = engine
        .participation
        .list_applications_for_task(task.id(), owner)
        .await
        .expect("owner listing should succeed");
    assert!(
        unchanged
            .iter()
            .all(|candidate| candidate.status() == ApplicationStatus::Pending)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn decision_notification_carries_the_verdict(engine: Engine) {
    let owner = NgoId::new();
    let volunteer = VolunteerId::new();
    let task = engine
        .lifecycle
        .create_task(owner, task_fields(future_date()))
        .await
        .expect("task creation should succeed");
    let application = engine
        .participation
        .apply_to_task(task.id(), volunteer, None)
        .await
        .expect("application should succeed");

    engine
        .participation
        .decide_application(application.id(), owner, Decision::Reject)
        .await
        .expect("decision should succeed");

    let deliveries = engine
        .notifier
        .deliveries()
        .expect("delivery log should be readable");
    assert!(deliveries.iter().any(|notification| matches!(
        notification,
        Notification::ApplicationDecided {
            decision: Decision::Reject,
            volunteer_id,
            ..
        } if *volunteer_id == volunteer
    )));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delivery_failure_never_rolls_back_a_transition(engine: Engine) {
    let owner = NgoId::new();
    let volunteer = VolunteerId::new();
    let task = engine
        .lifecycle
        .create_task(owner, task_fields(future_date()))
        .await
        .expect("task creation should succeed");
    engine
        .notifier
        .set_failing("mail relay down")
        .expect("failure toggle should succeed");

    let application = engine
        .participation
        .apply_to_task(task.id(), volunteer, None)
        .await
        .expect("application should succeed despite the failing sink");

    let decided = engine
        .participation
        .decide_application(application.id(), owner, Decision::Approve)
        .await
        .expect("decision should succeed despite the failing sink");
    assert_eq!(decided.status(), ApplicationStatus::Approved);

    let stored = engine
        .participation
        .list_applications_for_volunteer(volunteer)
        .await
        .expect("listing should succeed");
    assert!(
        stored
            .iter()
            .any(|candidate| candidate.status() == ApplicationStatus::Approved),
        "the approved state persisted even though no notification went out"
    );
}
