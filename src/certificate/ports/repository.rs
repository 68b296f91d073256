//! Repository port for certificate persistence and pair-keyed lookup.

use crate::certificate::domain::{Certificate, CertificateId, CertificateNumber};
use crate::task::domain::{TaskId, VolunteerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for certificate repository operations.
pub type CertificateRepositoryResult<T> = Result<T, CertificateRepositoryError>;

/// Certificate persistence contract.
///
/// Storage owns the one-certificate-per-(task, volunteer) uniqueness
/// constraint: [`CertificateRepository::store`] is an atomic
/// create-if-absent on that pair.
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Stores a new certificate, failing atomically when one already
    /// exists for the same `(task, volunteer)` pair.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`CertificateRepositoryError::DuplicateCertificate`] when the pair
    /// is taken, [`CertificateRepositoryError::DuplicateNumber`] when the
    /// certificate number is taken, or
    /// [`CertificateRepositoryError::DuplicateId`] when the identifier
    /// already exists.
    async fn store(&self, certificate: &Certificate) -> CertificateRepositoryResult<()>;

    /// Persists changes to an existing certificate (status ladder,
    /// timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`CertificateRepositoryError::NotFound`] when the
    /// certificate does not exist.
    async fn update(&self, certificate: &Certificate) -> CertificateRepositoryResult<()>;

    /// Finds a certificate by identifier.
    ///
    /// Returns `None` when the certificate does not exist.
    async fn find_by_id(
        &self,
        id: CertificateId,
    ) -> CertificateRepositoryResult<Option<Certificate>>;

    /// Finds the certificate for a `(task, volunteer)` pair.
    ///
    /// Returns `None` when the pair has no certificate.
    async fn find_by_pair(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
    ) -> CertificateRepositoryResult<Option<Certificate>>;

    /// Returns all certificates earned by a volunteer.
    async fn list_for_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> CertificateRepositoryResult<Vec<Certificate>>;
}

/// Errors returned by certificate repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CertificateRepositoryError {
    /// A certificate already exists for the `(task, volunteer)` pair.
    #[error("certificate already exists for volunteer {volunteer_id} on task {task_id}")]
    DuplicateCertificate {
        /// Task reference.
        task_id: TaskId,
        /// Volunteer reference.
        volunteer_id: VolunteerId,
    },

    /// A certificate with the same number already exists.
    #[error("duplicate certificate number: {0}")]
    DuplicateNumber(CertificateNumber),

    /// A certificate with the same identifier already exists.
    #[error("duplicate certificate identifier: {0}")]
    DuplicateId(CertificateId),

    /// The certificate was not found.
    #[error("certificate not found: {0}")]
    NotFound(CertificateId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CertificateRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
