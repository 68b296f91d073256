//! In-memory certificate repository enforcing pair and number
//! uniqueness.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::certificate::{
    domain::{Certificate, CertificateId, CertificateNumber},
    ports::{CertificateRepository, CertificateRepositoryError, CertificateRepositoryResult},
};
use crate::task::domain::{TaskId, VolunteerId};

/// Thread-safe in-memory certificate repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCertificateRepository {
    state: Arc<RwLock<InMemoryCertificateState>>,
}

#[derive(Debug, Default)]
struct InMemoryCertificateState {
    certificates: HashMap<CertificateId, Certificate>,
    pair_index: HashMap<(TaskId, VolunteerId), CertificateId>,
    number_index: HashMap<CertificateNumber, CertificateId>,
}

impl InMemoryCertificateRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CertificateRepository for InMemoryCertificateRepository {
    async fn store(&self, certificate: &Certificate) -> CertificateRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            CertificateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.certificates.contains_key(&certificate.id()) {
            return Err(CertificateRepositoryError::DuplicateId(certificate.id()));
        }
        let pair = (certificate.task_id(), certificate.volunteer_id());
        if state.pair_index.contains_key(&pair) {
            return Err(CertificateRepositoryError::DuplicateCertificate {
                task_id: certificate.task_id(),
                volunteer_id: certificate.volunteer_id(),
            });
        }
        if state.number_index.contains_key(certificate.number()) {
            return Err(CertificateRepositoryError::DuplicateNumber(
                certificate.number().clone(),
            ));
        }
        state.pair_index.insert(pair, certificate.id());
        state
            .number_index
            .insert(certificate.number().clone(), certificate.id());
        state
            .certificates
            .insert(certificate.id(), certificate.clone());
        Ok(())
    }

    async fn update(&self, certificate: &Certificate) -> CertificateRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            CertificateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.certificates.contains_key(&certificate.id()) {
            return Err(CertificateRepositoryError::NotFound(certificate.id()));
        }
        state
            .certificates
            .insert(certificate.id(), certificate.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: CertificateId,
    ) -> CertificateRepositoryResult<Option<Certificate>> {
        let state = self.state.read().map_err(|err| {
            CertificateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.certificates.get(&id).cloned())
    }

    async fn find_by_pair(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
    ) -> CertificateRepositoryResult<Option<Certificate>> {
        let state = self.state.read().map_err(|err| {
            CertificateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let certificate = state
            .pair_index
            .get(&(task_id, volunteer_id))
            .and_then(|certificate_id| state.certificates.get(certificate_id))
            .cloned();
        Ok(certificate)
    }

    async fn list_for_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> CertificateRepositoryResult<Vec<Certificate>> {
        let state = self.state.read().map_err(|err| {
            CertificateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .certificates
            .values()
            .filter(|certificate| certificate.volunteer_id() == volunteer_id)
            .cloned()
            .collect())
    }
}
