//! In-memory integration tests for the certificate chain.

use crate::in_memory::helpers::{engine, future_date, task_fields, Engine};
use rstest::rstest;
use volmatch::certificate::domain::CertificateStatus;
use volmatch::certificate::ports::CertificateRepository;
use volmatch::certificate::services::{CertificateIssuanceError, CertificateRequester};
use volmatch::task::domain::{
    AttendanceStatus, Decision, HoursWorked, NgoId, TaskId, VolunteerId,
};
use volmatch::task::ports::Notification;

/// Drives a pair through apply, approve, present mark, and verify.
async fn verified_pair(engine: &Engine, hours: u32) -> (NgoId, TaskId, VolunteerId) {
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
    engine
        .participation
        .mark_attendance(
            task.id(),
            volunteer,
            owner,
            AttendanceStatus::Present,
            HoursWorked::new(hours),
        )
        .await
        .expect("marking should succeed");
    engine
        .participation
        .verify_attendance(task.id(), volunteer, owner)
        .await
        .expect("verification should succeed");
    (owner, task.id(), volunteer)
}

// Scenario: the full happy path from application to a generated
// certificate carrying the verified hours.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn verified_presence_earns_a_certificate_with_snapshotted_hours(engine: Engine) {
    let (_, task_id, volunteer) = verified_pair(&engine, 4).await;

    let certificate = engine
        .issuance
        .request_certificate(task_id, volunteer, CertificateRequester::Volunteer(volunteer))
        .await
        .expect("certificate request should succeed");

    assert_eq!(certificate.status(), CertificateStatus::Generated);
    assert_eq!(certificate.hours_completed(), HoursWorked::new(4));

    let body = engine
        .renderer
        .document(certificate.url())
        .expect("document store should be readable")
        .expect("rendered document should exist");
    assert!(body.contains(certificate.number().as_str()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeat_requests_return_the_same_certificate(engine: Engine) {
    let (owner, task_id, volunteer) = verified_pair(&engine, 3).await;

    let first = engine
        .issuance
        .request_certificate(task_id, volunteer, CertificateRequester::Volunteer(volunteer))
        .await
        .expect("first request should succeed");
    let second = engine
        .issuance
        .request_certificate(task_id, volunteer, CertificateRequester::Ngo(owner))
        .await
        .expect("repeat request should succeed");

    assert_eq!(second.id(), first.id());
    assert_eq!(second.hours_completed(), first.hours_completed());

    let listed = engine
        .issuance
        .list_certificates_for_volunteer(volunteer)
        .await
        .expect("listing should succeed");
    assert_eq!(listed.len(), 1, "no duplicate record exists");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unverified_pair_cannot_request(engine: Engine) {
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
    engine
        .participation
        .mark_attendance(
            task.id(),
            volunteer,
            owner,
            AttendanceStatus::Present,
            HoursWorked::new(4),
        )
        .await
        .expect("marking should succeed");

    let result = engine
        .issuance
        .request_certificate(
            task.id(),
            volunteer,
            CertificateRequester::Volunteer(volunteer),
        )
        .await;

    assert!(matches!(
        result,
        Err(CertificateIssuanceError::Eligibility(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_generator_leaves_no_record_behind(engine: Engine) {
    let (_, task_id, volunteer) = verified_pair(&engine, 4).await;
    engine
        .renderer
        .set_failing("template store unavailable")
        .expect("failure toggle should succeed");

    let result = engine
        .issuance
        .request_certificate(task_id, volunteer, CertificateRequester::Volunteer(volunteer))
        .await;

    assert!(matches!(result, Err(CertificateIssuanceError::Generation(_))));
    let stored = engine
        .certificates
        .find_by_pair(task_id, volunteer)
        .await
        .expect("pair lookup should succeed");
    assert!(stored.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn issue_then_download_walks_the_ladder_monotonically(engine: Engine) {
    let (owner, task_id, volunteer) = verified_pair(&engine, 6).await;
    let certificate = engine
        .issuance
        .request_certificate(task_id, volunteer, CertificateRequester::Volunteer(volunteer))
        .await
        .expect("certificate request should succeed");

    let issued = engine
        .issuance
        .issue_certificate(certificate.id(), owner)
        .await
        .expect("issuance should succeed");
    assert_eq!(issued.status(), CertificateStatus::Issued);

    let deliveries = engine
        .notifier
        .deliveries()
        .expect("delivery log should be readable");
    assert!(deliveries.iter().any(|notification| matches!(
        notification,
        Notification::CertificateReady { volunteer_id, .. } if *volunteer_id == volunteer
    )));

    let downloaded = engine
        .issuance
        .download_certificate(certificate.id(), volunteer)
        .await
        .expect("download should succeed");
    assert_eq!(downloaded.status(), CertificateStatus::Downloaded);
    let stamp = downloaded.downloaded_at();

    let repeat = engine
        .issuance
        .download_certificate(certificate.id(), volunteer)
        .await
        .expect("repeat download should succeed");
    assert_eq!(repeat.downloaded_at(), stamp, "downloaded_at is stamped once");

    let re_issue = engine
        .issuance
        .issue_certificate(certificate.id(), owner)
        .await
        .expect("late issuance should be a no-op");
    assert_eq!(
        re_issue.status(),
        CertificateStatus::Downloaded,
        "the ladder never regresses"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hours_snapshot_is_immutable_after_creation(engine: Engine) {
    let (owner, task_id, volunteer) = verified_pair(&engine, 4).await;
    let certificate = engine
        .issuance
        .request_certificate(task_id, volunteer, CertificateRequester::Volunteer(volunteer))
        .await
        .expect("certificate request should succeed");

    // The attendance record is verified, so hours can no longer change
    // upstream either; the certificate keeps its creation-time copy.
    let amend = engine
        .participation
        .amend_attendance(
            task_id,
            volunteer,
            owner,
            AttendanceStatus::Present,
            HoursWorked::new(9),
        )
        .await;
    assert!(amend.is_err());

    let fetched = engine
        .issuance
        .get_certificate(certificate.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(fetched.hours_completed(), HoursWorked::new(4));
}
