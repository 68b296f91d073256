//! Shared fixtures for the in-memory integration suites.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use volmatch::certificate::adapters::memory::{
    InMemoryCertificateRepository, InMemoryDocumentRenderer,
};
use volmatch::certificate::services::CertificateIssuanceService;
use volmatch::task::adapters::memory::{
    InMemoryApplicationRepository, InMemoryTaskRepository, RecordingNotifier,
};
use volmatch::task::domain::{TaskFields, Urgency};
use volmatch::task::services::{ParticipationService, TaskLifecycleService};

/// Task lifecycle service over the in-memory adapters.
pub type Lifecycle =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryApplicationRepository, DefaultClock>;

/// Participation service over the in-memory adapters.
pub type Participation = ParticipationService<
    InMemoryTaskRepository,
    InMemoryApplicationRepository,
    RecordingNotifier,
    DefaultClock,
>;

/// Certificate issuance service over the in-memory adapters.
pub type Issuance = CertificateIssuanceService<
    InMemoryCertificateRepository,
    InMemoryTaskRepository,
    InMemoryApplicationRepository,
    InMemoryDocumentRenderer,
    RecordingNotifier,
    DefaultClock,
>;

/// The whole engine wired over shared in-memory state.
pub struct Engine {
    /// Raw task store, for persistence assertions.
    pub tasks: Arc<InMemoryTaskRepository>,
    /// Raw application store, for persistence assertions.
    pub applications: Arc<InMemoryApplicationRepository>,
    /// Raw certificate store, for persistence assertions.
    pub certificates: Arc<InMemoryCertificateRepository>,
    /// Document generator, for rendered-body assertions.
    pub renderer: Arc<InMemoryDocumentRenderer>,
    /// Notification sink, for dispatch assertions.
    pub notifier: Arc<RecordingNotifier>,
    /// Task CRUD service.
    pub lifecycle: Lifecycle,
    /// Application flow service.
    pub participation: Participation,
    /// Certificate service.
    pub issuance: Issuance,
}

/// Builds a fresh engine over empty in-memory stores.
#[fixture]
pub fn engine() -> Engine {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let applications = Arc::new(InMemoryApplicationRepository::new());
    let certificates = Arc::new(InMemoryCertificateRepository::new());
    let renderer = Arc::new(InMemoryDocumentRenderer::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let clock = Arc::new(DefaultClock);

    let lifecycle = TaskLifecycleService::new(tasks.clone(), applications.clone(), clock.clone());
    let participation = ParticipationService::new(
        tasks.clone(),
        applications.clone(),
        notifier.clone(),
        clock.clone(),
    );
    let issuance = CertificateIssuanceService::new(
        certificates.clone(),
        tasks.clone(),
        applications.clone(),
        renderer.clone(),
        notifier.clone(),
        clock,
    );

    Engine {
        tasks,
        applications,
        certificates,
        renderer,
        notifier,
        lifecycle,
        participation,
        issuance,
    }
}

/// Valid task fields for the given activity date.
pub fn task_fields(date: NaiveDate) -> TaskFields {
    TaskFields {
        title: "Community garden day".to_owned(),
        description: "Prepare beds and plant seedlings".to_owned(),
        location: "Riverside allotments".to_owned(),
        date,
        required_skills: vec!["gardening".to_owned()],
        max_volunteers: 6,
        category: "environment".to_owned(),
        urgency: Urgency::Medium,
    }
}

/// A date safely in the future.
pub fn future_date() -> NaiveDate {
    Utc::now().date_naive() + Days::new(14)
}

/// Yesterday, for auto-close scenarios.
pub fn past_date() -> NaiveDate {
    Utc::now().date_naive() - Days::new(1)
}
