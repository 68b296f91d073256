//! In-memory integration tests for attendance marking and verification
//! gating.

use crate::in_memory::helpers::{engine, future_date, task_fields, Engine};
use rstest::rstest;
use volmatch::task::domain::{
    ApplicationDomainError, AttendanceStatus, Decision, HoursWorked, NgoId, TaskId, VolunteerId,
};
use volmatch::task::services::ParticipationError;

/// Seeds a task with an approved application and returns the pair.
async fn approved_pair(engine: &Engine) -> (NgoId, TaskId, VolunteerId) {
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
        .decide_application(application.id(), owner, Decision::Approve)
        .await
        .expect("approval should succeed");
    (owner, task.id(), volunteer)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn present_mark_then_verify_completes_the_chain(engine: Engine) {
    let (owner, task_id, volunteer) = approved_pair(&engine).await;

    engine
        .participation
        .mark_attendance(
            task_id,
            volunteer,
            owner,
            AttendanceStatus::Present,
            HoursWorked::new(4),
        )
        .await
        .expect("marking should succeed");

    let verified = engine
        .participation
        .verify_attendance(task_id, volunteer, owner)
        .await
        .expect("verification should succeed");

    let record = verified.attendance().expect("attendance record expected");
    assert!(record.verified());
    assert_eq!(record.verified_by(), Some(owner));
    assert_eq!(record.hours_worked(), HoursWorked::new(4));
}

// Scenario: an absent volunteer cannot be verified and cannot earn a
// certificate.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn absent_branch_blocks_verification(engine: Engine) {
    let (owner, task_id, volunteer) = approved_pair(&engine).await;

    engine
        .participation
        .mark_attendance(
            task_id,
            volunteer,
            owner,
            AttendanceStatus::Absent,
            HoursWorked::new(5),
        )
        .await
        .expect("marking should succeed");

    let result = engine
        .participation
        .verify_attendance(task_id, volunteer, owner)
        .await;

    assert!(matches!(
        result,
        Err(ParticipationError::Domain(
            ApplicationDomainError::VerificationRequiresPresence(_)
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn absent_mark_zeroes_the_submitted_hours(engine: Engine) {
    let (owner, task_id, volunteer) = approved_pair(&engine).await;

    let marked = engine
        .participation
        .mark_attendance(
            task_id,
            volunteer,
            owner,
            AttendanceStatus::Absent,
            HoursWorked::new(8),
        )
        .await
        .expect("marking should succeed");

    let record = marked.attendance().expect("attendance record expected");
    assert_eq!(record.hours_worked(), HoursWorked::ZERO);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn re_marking_requires_the_amend_operation(engine: Engine) {
    let (owner, task_id, volunteer) = approved_pair(&engine).await;
    engine
        .participation
        .mark_attendance(
            task_id,
            volunteer,
            owner,
            AttendanceStatus::Absent,
            HoursWorked::ZERO,
        )
        .await
        .expect("marking should succeed");

    let re_mark = engine
        .participation
        .mark_attendance(
            task_id,
            volunteer,
            owner,
            AttendanceStatus::Present,
            HoursWorked::new(4),
        )
        .await;
    assert!(matches!(
        re_mark,
        Err(ParticipationError::Domain(
            ApplicationDomainError::AttendanceAlreadyMarked(_)
        ))
    ));

    let amended = engine
        .participation
        .amend_attendance(
            task_id,
            volunteer,
            owner,
            AttendanceStatus::Present,
            HoursWorked::new(4),
        )
        .await
        .expect("amendment should succeed");
    let record = amended.attendance().expect("attendance record expected");
    assert_eq!(record.status(), AttendanceStatus::Present);
    assert_eq!(record.hours_worked(), HoursWorked::new(4));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn attendance_on_pending_application_is_rejected(engine: Engine) {
    let owner = NgoId::new();
    let volunteer = VolunteerId::new();
    let task = engine
        .lifecycle
        .create_task(owner, task_fields(future_date()))
        .await
        .expect("task creation should succeed");
    engine
        .participation
        .apply_to_task(task.id(), volunteer, None)
        .await
        .expect("application should succeed");

    let result = engine
        .participation
        .mark_attendance(
            task.id(),
            volunteer,
            owner,
            AttendanceStatus::Present,
            HoursWorked::new(2),
        )
        .await;

    assert!(matches!(
        result,
        Err(ParticipationError::Domain(
            ApplicationDomainError::AttendanceRequiresApproval { .. }
        ))
    ));
}
