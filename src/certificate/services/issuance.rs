//! Service layer for certificate request, issuance, and download.

use crate::certificate::{
    domain::{Certificate, CertificateDomainError, CertificateId},
    ports::{
        CertificateMetadata, CertificateRepository, CertificateRepositoryError, DocumentRenderer,
        RendererError,
    },
};
use crate::task::{
    domain::{ApplicationDomainError, NgoId, Task, TaskId, VolunteerId},
    ports::{
        ApplicationRepository, ApplicationRepositoryError, Notification, Notifier, TaskRepository,
        TaskRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Who is asking for a certificate to be created.
///
/// The applying volunteer may request their own certificate; the owning
/// NGO may create one proactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateRequester {
    /// The volunteer the certificate would belong to.
    Volunteer(VolunteerId),
    /// The NGO that owns the task.
    Ngo(NgoId),
}

/// Service-level errors for certificate operations.
#[derive(Debug, Error)]
pub enum CertificateIssuanceError {
    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The referenced certificate does not exist.
    #[error("certificate not found: {0}")]
    NotFound(CertificateId),

    /// No application exists for the `(task, volunteer)` pair.
    #[error("volunteer {volunteer_id} has no application for task {task_id}")]
    NoApplicationForPair {
        /// Task identifier.
        task_id: TaskId,
        /// Volunteer identifier.
        volunteer_id: VolunteerId,
    },

    /// The requester may not act on this certificate or pair.
    #[error("requester may not act on the certificate for task {task_id}")]
    Forbidden {
        /// Task the certificate covers.
        task_id: TaskId,
    },

    /// Attendance gating failed: the application is not certifiable.
    #[error(transparent)]
    Eligibility(#[from] ApplicationDomainError),

    /// Certificate construction failed.
    #[error(transparent)]
    Domain(#[from] CertificateDomainError),

    /// The external document generator failed; nothing was persisted.
    #[error("certificate generation failed: {0}")]
    Generation(#[source] RendererError),

    /// Certificate repository operation failed.
    #[error(transparent)]
    Certificates(#[from] CertificateRepositoryError),

    /// Task repository operation failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),

    /// Application repository operation failed.
    #[error(transparent)]
    Applications(#[from] ApplicationRepositoryError),
}

/// Result type for certificate service operations.
pub type CertificateIssuanceResult<T> = Result<T, CertificateIssuanceError>;

/// Certificate issuance orchestration service.
#[derive(Clone)]
pub struct CertificateIssuanceService<R, T, A, D, N, C>
where
    R: CertificateRepository,
    T: TaskRepository,
    A: ApplicationRepository,
    D: DocumentRenderer,
    N: Notifier,
    C: Clock + Send + Sync,
{
    certificates: Arc<R>,
    tasks: Arc<T>,
    applications: Arc<A>,
    renderer: Arc<D>,
    notifier: Arc<N>,
    clock: Arc<C>,
}

impl<R, T, A, D, N, C> CertificateIssuanceService<R, T, A, D, N, C>
where
    R: CertificateRepository,
    T: TaskRepository,
    A: ApplicationRepository,
    D: DocumentRenderer,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates a new certificate issuance service.
    #[must_use]
    pub const fn new(
        certificates: Arc<R>,
        tasks: Arc<T>,
        applications: Arc<A>,
        renderer: Arc<D>,
        notifier: Arc<N>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            certificates,
            tasks,
            applications,
            renderer,
            notifier,
            clock,
        }
    }

    async fn find_certificate_or_error(
        &self,
        certificate_id: CertificateId,
    ) -> CertificateIssuanceResult<Certificate> {
        self.certificates
            .find_by_id(certificate_id)
            .await?
            .ok_or(CertificateIssuanceError::NotFound(certificate_id))
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> CertificateIssuanceResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(CertificateIssuanceError::TaskNotFound(task_id))
    }

    /// Dispatches a notification without letting delivery failures reach
    /// the caller.
    async fn dispatch(&self, notification: Notification) {
        let kind = notification.kind();
        if let Err(err) = self.notifier.notify(notification).await {
            tracing::warn!(kind, error = %err, "notification dispatch failed");
        }
    }

    /// Requests a certificate for a verified, present application.
    ///
    /// Idempotent: when a certificate already exists for the pair, or a
    /// concurrent request wins the storage uniqueness race, the existing
    /// record is returned unchanged. The renderer runs before anything is
    /// persisted, so a generation failure leaves no trace.
    ///
    /// # Errors
    ///
    /// Returns [`CertificateIssuanceError::TaskNotFound`] or
    /// [`CertificateIssuanceError::NoApplicationForPair`] for missing
    /// entities, [`CertificateIssuanceError::Forbidden`] when the
    /// requester is neither the volunteer nor the task owner, eligibility
    /// errors when attendance is not verified present, or
    /// [`CertificateIssuanceError::Generation`] when the renderer fails.
    pub async fn request_certificate(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
        requester: CertificateRequester,
    ) -> CertificateIssuanceResult<Certificate> {
        if let Some(existing) = self.certificates.find_by_pair(task_id, volunteer_id).await? {
            return Ok(existing);
        }

        let task = self.find_task_or_error(task_id).await?;
        let authorized = match requester {
            CertificateRequester::Volunteer(id) => id == volunteer_id,
            CertificateRequester::Ngo(id) => id == task.owner(),
        };
        if !authorized {
            return Err(CertificateIssuanceError::Forbidden { task_id });
        }

        let application = self
            .applications
            .find_by_pair(task_id, volunteer_id)
            .await?
            .ok_or(CertificateIssuanceError::NoApplicationForPair {
                task_id,
                volunteer_id,
            })?;
        let hours_completed = application.certificate_hours()?;

        let metadata = CertificateMetadata {
            task_id,
            volunteer_id,
            task_title: task.title().to_owned(),
            task_location: task.location().to_owned(),
            task_date: task.date(),
            hours_completed,
        };
        let rendered = self
            .renderer
            .render(&metadata)
            .await
            .map_err(CertificateIssuanceError::Generation)?;

        let certificate = Certificate::new(
            task_id,
            volunteer_id,
            rendered.certificate_number,
            rendered.url,
            hours_completed,
            &*self.clock,
        )?;
        match self.certificates.store(&certificate).await {
            Ok(()) => {}
            Err(CertificateRepositoryError::DuplicateCertificate { .. }) => {
                // Lost the uniqueness race; the surviving record wins.
                if let Some(existing) =
                    self.certificates.find_by_pair(task_id, volunteer_id).await?
                {
                    return Ok(existing);
                }
                return Err(CertificateRepositoryError::DuplicateCertificate {
                    task_id,
                    volunteer_id,
                }
                .into());
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(
            certificate_id = %certificate.id(),
            number = %certificate.number(),
            task_id = %task_id,
            volunteer_id = %volunteer_id,
            "certificate generated"
        );
        Ok(certificate)
    }

    /// Formally issues a generated certificate.
    ///
    /// Idempotent on already issued or downloaded certificates. On the
    /// first issuance a certificate-ready notification goes to the
    /// volunteer, fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns [`CertificateIssuanceError::NotFound`] when the
    /// certificate is absent, [`CertificateIssuanceError::TaskNotFound`]
    /// when its task is gone, or
    /// [`CertificateIssuanceError::Forbidden`] when `issuer` does not own
    /// the task.
    pub async fn issue_certificate(
        &self,
        certificate_id: CertificateId,
        issuer: NgoId,
    ) -> CertificateIssuanceResult<Certificate> {
        let mut certificate = self.find_certificate_or_error(certificate_id).await?;
        let task = self.find_task_or_error(certificate.task_id()).await?;
        if task.owner() != issuer {
            return Err(CertificateIssuanceError::Forbidden {
                task_id: certificate.task_id(),
            });
        }

        if certificate.mark_issued(&*self.clock) {
            self.certificates.update(&certificate).await?;
            tracing::info!(certificate_id = %certificate_id, "certificate issued");
            self.dispatch(Notification::CertificateReady {
                task_id: certificate.task_id(),
                volunteer_id: certificate.volunteer_id(),
                certificate_number: certificate.number().as_str().to_owned(),
                url: certificate.url().to_owned(),
            })
            .await;
        }
        Ok(certificate)
    }

    /// Records a download by the certified volunteer.
    ///
    /// The status advances monotonically; `downloaded_at` is stamped on
    /// the first download only and repeat downloads succeed unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CertificateIssuanceError::NotFound`] when the
    /// certificate is absent, or
    /// [`CertificateIssuanceError::Forbidden`] when `requester` is not
    /// the certificate's volunteer.
    pub async fn download_certificate(
        &self,
        certificate_id: CertificateId,
        requester: VolunteerId,
    ) -> CertificateIssuanceResult<Certificate> {
        let mut certificate = self.find_certificate_or_error(certificate_id).await?;
        if certificate.volunteer_id() != requester {
            return Err(CertificateIssuanceError::Forbidden {
                task_id: certificate.task_id(),
            });
        }

        if certificate.mark_downloaded(&*self.clock) {
            self.certificates.update(&certificate).await?;
            tracing::debug!(certificate_id = %certificate_id, "certificate downloaded");
        }
        Ok(certificate)
    }

    /// Retrieves a certificate by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CertificateIssuanceError::NotFound`] when the
    /// certificate does not exist.
    pub async fn get_certificate(
        &self,
        certificate_id: CertificateId,
    ) -> CertificateIssuanceResult<Certificate> {
        self.find_certificate_or_error(certificate_id).await
    }

    /// Returns all certificates earned by a volunteer.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the certificate store.
    pub async fn list_certificates_for_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> CertificateIssuanceResult<Vec<Certificate>> {
        Ok(self.certificates.list_for_volunteer(volunteer_id).await?)
    }
}
