//! Uniqueness and update contracts of the in-memory repositories.

use mockable::DefaultClock;
use rstest::rstest;
use volmatch::certificate::adapters::memory::InMemoryCertificateRepository;
use volmatch::certificate::domain::{Certificate, CertificateNumber};
use volmatch::certificate::ports::{CertificateRepository, CertificateRepositoryError};
use volmatch::task::adapters::memory::InMemoryApplicationRepository;
use volmatch::task::domain::{Application, HoursWorked, TaskId, VolunteerId};
use volmatch::task::ports::{ApplicationRepository, ApplicationRepositoryError};

fn certificate(
    task_id: TaskId,
    volunteer_id: VolunteerId,
    number: &str,
) -> eyre::Result<Certificate> {
    Ok(Certificate::new(
        task_id,
        volunteer_id,
        CertificateNumber::new(number)?,
        format!("memory://certificates/{number}"),
        HoursWorked::new(2),
        &DefaultClock,
    )?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn application_pair_uniqueness_is_atomic() {
    let repo = InMemoryApplicationRepository::new();
    let task_id = TaskId::new();
    let volunteer_id = VolunteerId::new();

    let first = Application::new(task_id, volunteer_id, None, &DefaultClock);
    repo.store(&first).await.expect("first store should succeed");

    let rival = Application::new(task_id, volunteer_id, None, &DefaultClock);
    let result = repo.store(&rival).await;

    assert!(matches!(
        result,
        Err(ApplicationRepositoryError::DuplicateApplication { .. })
    ));

    let stored = repo
        .find_by_pair(task_id, volunteer_id)
        .await
        .expect("pair lookup should succeed")
        .expect("application should exist");
    assert_eq!(stored.id(), first.id(), "the first writer wins the pair");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn application_update_requires_an_existing_record() {
    let repo = InMemoryApplicationRepository::new();
    let unstored = Application::new(TaskId::new(), VolunteerId::new(), None, &DefaultClock);

    let result = repo.update(&unstored).await;

    assert!(matches!(
        result,
        Err(ApplicationRepositoryError::NotFound(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_volunteer_may_apply_to_different_tasks() {
    let repo = InMemoryApplicationRepository::new();
    let volunteer_id = VolunteerId::new();

    repo.store(&Application::new(TaskId::new(), volunteer_id, None, &DefaultClock))
        .await
        .expect("first store should succeed");
    repo.store(&Application::new(TaskId::new(), volunteer_id, None, &DefaultClock))
        .await
        .expect("second store should succeed");

    let listed = repo
        .list_for_volunteer(volunteer_id)
        .await
        .expect("listing should succeed");
    assert_eq!(listed.len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn certificate_pair_uniqueness_is_atomic() -> eyre::Result<()> {
    let repo = InMemoryCertificateRepository::new();
    let task_id = TaskId::new();
    let volunteer_id = VolunteerId::new();

    let first = certificate(task_id, volunteer_id, "VOL-000001")?;
    repo.store(&first).await?;

    let rival = certificate(task_id, volunteer_id, "VOL-000002")?;
    let result = repo.store(&rival).await;

    eyre::ensure!(matches!(
        result,
        Err(CertificateRepositoryError::DuplicateCertificate { .. })
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn certificate_numbers_are_unique_across_pairs() -> eyre::Result<()> {
    let repo = InMemoryCertificateRepository::new();

    repo.store(&certificate(TaskId::new(), VolunteerId::new(), "VOL-000009")?)
        .await?;
    let result = repo
        .store(&certificate(TaskId::new(), VolunteerId::new(), "VOL-000009")?)
        .await;

    eyre::ensure!(matches!(
        result,
        Err(CertificateRepositoryError::DuplicateNumber(_))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn certificate_update_round_trips_status_changes() -> eyre::Result<()> {
    let repo = InMemoryCertificateRepository::new();
    let mut stored = certificate(TaskId::new(), VolunteerId::new(), "VOL-000011")?;
    repo.store(&stored).await?;

    stored.mark_issued(&DefaultClock);
    repo.update(&stored).await?;

    let fetched = repo
        .find_by_id(stored.id())
        .await?
        .ok_or_else(|| eyre::eyre!("certificate should exist"))?;
    eyre::ensure!(fetched == stored);
    Ok(())
}
