//! In-memory application repository enforcing the pair uniqueness
//! constraint.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Application, ApplicationId, TaskId, VolunteerId},
    ports::{ApplicationRepository, ApplicationRepositoryError, ApplicationRepositoryResult},
};

/// Thread-safe in-memory application repository.
///
/// The `(task, volunteer)` pair index is the create-if-absent
/// enforcement point: a second store for the same pair is rejected
/// atomically under the write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryApplicationRepository {
    state: Arc<RwLock<InMemoryApplicationState>>,
}

#[derive(Debug, Default)]
struct InMemoryApplicationState {
    applications: HashMap<ApplicationId, Application>,
    pair_index: HashMap<(TaskId, VolunteerId), ApplicationId>,
}

impl InMemoryApplicationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn store(&self, application: &Application) -> ApplicationRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            ApplicationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.applications.contains_key(&application.id()) {
            return Err(ApplicationRepositoryError::DuplicateId(application.id()));
        }
        let pair = (application.task_id(), application.volunteer_id());
        if state.pair_index.contains_key(&pair) {
            return Err(ApplicationRepositoryError::DuplicateApplication {
                task_id: application.task_id(),
                volunteer_id: application.volunteer_id(),
            });
        }
        state.pair_index.insert(pair, application.id());
        state
            .applications
            .insert(application.id(), application.clone());
        Ok(())
    }

    async fn update(&self, application: &Application) -> ApplicationRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            ApplicationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.applications.contains_key(&application.id()) {
            return Err(ApplicationRepositoryError::NotFound(application.id()));
        }
        state
            .applications
            .insert(application.id(), application.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> ApplicationRepositoryResult<Option<Application>> {
        let state = self.state.read().map_err(|err| {
            ApplicationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.applications.get(&id).cloned())
    }

    async fn find_by_pair(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
    ) -> ApplicationRepositoryResult<Option<Application>> {
        let state = self.state.read().map_err(|err| {
            ApplicationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let application = state
            .pair_index
            .get(&(task_id, volunteer_id))
            .and_then(|application_id| state.applications.get(application_id))
            .cloned();
        Ok(application)
    }

    async fn list_for_task(
        &self,
        task_id: TaskId,
    ) -> ApplicationRepositoryResult<Vec<Application>> {
        let state = self.state.read().map_err(|err| {
            ApplicationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .applications
            .values()
            .filter(|application| application.task_id() == task_id)
            .cloned()
            .collect())
    }

    async fn list_for_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> ApplicationRepositoryResult<Vec<Application>> {
        let state = self.state.read().map_err(|err| {
            ApplicationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .applications
            .values()
            .filter(|application| application.volunteer_id() == volunteer_id)
            .cloned()
            .collect())
    }

    async fn delete_for_task(&self, task_id: TaskId) -> ApplicationRepositoryResult<usize> {
        let mut state = self.state.write().map_err(|err| {
            ApplicationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let removed: Vec<ApplicationId> = state
            .applications
            .values()
            .filter(|application| application.task_id() == task_id)
            .map(Application::id)
            .collect();
        for application_id in &removed {
            state.applications.remove(application_id);
        }
        state.pair_index.retain(|(pair_task, _), _| *pair_task != task_id);
        Ok(removed.len())
    }
}
