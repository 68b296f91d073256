//! Repository port for application persistence and pair-keyed lookup.

use crate::task::domain::{Application, ApplicationId, TaskId, VolunteerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for application repository operations.
pub type ApplicationRepositoryResult<T> = Result<T, ApplicationRepositoryError>;

/// Application persistence contract.
///
/// Storage owns the one-application-per-(task, volunteer) uniqueness
/// constraint: [`ApplicationRepository::store`] is an atomic
/// create-if-absent on that pair, and the duplicate case is a typed,
/// caller-recoverable rejection rather than a generic fault.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Stores a new application, failing atomically when one already
    /// exists for the same `(task, volunteer)` pair.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`ApplicationRepositoryError::DuplicateApplication`] when the pair
    /// is taken, or [`ApplicationRepositoryError::DuplicateId`] when the
    /// application ID already exists.
    async fn store(&self, application: &Application) -> ApplicationRepositoryResult<()>;

    /// Persists changes to an existing application (decision, attendance,
    /// verification, timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationRepositoryError::NotFound`] when the
    /// application does not exist.
    async fn update(&self, application: &Application) -> ApplicationRepositoryResult<()>;

    /// Finds an application by identifier.
    ///
    /// Returns `None` when the application does not exist.
    async fn find_by_id(&self, id: ApplicationId)
    -> ApplicationRepositoryResult<Option<Application>>;

    /// Finds the application for a `(task, volunteer)` pair.
    ///
    /// Returns `None` when the volunteer has not applied to the task.
    async fn find_by_pair(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
    ) -> ApplicationRepositoryResult<Option<Application>>;

    /// Returns all applications for a task.
    async fn list_for_task(&self, task_id: TaskId) -> ApplicationRepositoryResult<Vec<Application>>;

    /// Returns all applications submitted by a volunteer.
    async fn list_for_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> ApplicationRepositoryResult<Vec<Application>>;

    /// Removes every application for a task, returning how many were
    /// removed.
    ///
    /// Called from the task-deletion cascade so that no orphaned
    /// application is ever returned by a query.
    async fn delete_for_task(&self, task_id: TaskId) -> ApplicationRepositoryResult<usize>;
}

/// Errors returned by application repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ApplicationRepositoryError {
    /// An application already exists for the `(task, volunteer)` pair.
    #[error("volunteer {volunteer_id} already applied to task {task_id}")]
    DuplicateApplication {
        /// Task reference.
        task_id: TaskId,
        /// Volunteer reference.
        volunteer_id: VolunteerId,
    },

    /// An application with the same identifier already exists.
    #[error("duplicate application identifier: {0}")]
    DuplicateId(ApplicationId),

    /// The application was not found.
    #[error("application not found: {0}")]
    NotFound(ApplicationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ApplicationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
