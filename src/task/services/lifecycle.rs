//! Service layer for task creation, reads, edits, and deletion.
//!
//! Every read path applies the auto-close rule and persists the
//! transition when it fires; the engine never assumes a background sweep
//! keeps stored statuses fresh.

use crate::task::{
    domain::{ApplicationStatus, NgoId, Task, TaskDomainError, TaskFields, TaskId, TaskPatch, TaskStatus},
    ports::{ApplicationRepository, ApplicationRepositoryError, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// A task together with its derived application counts.
///
/// The counts are computed from stored applications on every read and
/// are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOverview {
    /// The task, with its status resolved.
    pub task: Task,
    /// Number of approved applications.
    pub approved_volunteers: usize,
    /// Number of applications still awaiting a decision.
    pub pending_applications: usize,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation or transition failure.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// The actor does not own the task.
    #[error("NGO {actor} does not own task {task_id}")]
    Forbidden {
        /// Task identifier.
        task_id: TaskId,
        /// Acting NGO.
        actor: NgoId,
    },
    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Application repository operation failed.
    #[error(transparent)]
    Applications(#[from] ApplicationRepositoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<T, A, C>
where
    T: TaskRepository,
    A: ApplicationRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    applications: Arc<A>,
    clock: Arc<C>,
}

impl<T, A, C> TaskLifecycleService<T, A, C>
where
    T: TaskRepository,
    A: ApplicationRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(tasks: Arc<T>, applications: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            applications,
            clock,
        }
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    /// Applies the auto-close rule to `task` and persists the transition
    /// when it fires.
    ///
    /// Concurrent readers may race here; closing is idempotent, so the
    /// last write is indistinguishable from the first.
    async fn resolve_and_store(&self, task: &mut Task) -> TaskLifecycleResult<()> {
        let today = self.clock.utc().date_naive();
        if task.close_if_due(today, &*self.clock) {
            tracing::debug!(task_id = %task.id(), "auto-closed past-dated task");
            self.tasks.update(task).await?;
        }
        Ok(())
    }

    /// Creates a new open task owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when field validation fails or the
    /// repository rejects persistence.
    pub async fn create_task(&self, owner: NgoId, fields: TaskFields) -> TaskLifecycleResult<Task> {
        let task = Task::new(owner, fields, &*self.clock)?;
        self.tasks.store(&task).await?;
        tracing::info!(task_id = %task.id(), owner = %owner, "task created");
        Ok(task)
    }

    /// Retrieves a task with derived application counts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not
    /// exist, or repository errors from either store.
    pub async fn get_task(&self, task_id: TaskId) -> TaskLifecycleResult<TaskOverview> {
        let mut task = self.find_task_or_error(task_id).await?;
        self.resolve_and_store(&mut task).await?;

        let applications = self.applications.list_for_task(task_id).await?;
        let approved_volunteers = applications
            .iter()
            .filter(|application| application.status() == ApplicationStatus::Approved)
            .count();
        let pending_applications = applications
            .iter()
            .filter(|application| application.status() == ApplicationStatus::Pending)
            .count();

        Ok(TaskOverview {
            task,
            approved_volunteers,
            pending_applications,
        })
    }

    /// Returns all tasks posted by `owner`, statuses resolved.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the task store.
    pub async fn list_tasks_by_owner(&self, owner: NgoId) -> TaskLifecycleResult<Vec<Task>> {
        let mut tasks = self.tasks.list_by_owner(owner).await?;
        for task in &mut tasks {
            self.resolve_and_store(task).await?;
        }
        Ok(tasks)
    }

    /// Returns every task still open for applications.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the task store.
    pub async fn list_open_tasks(&self) -> TaskLifecycleResult<Vec<Task>> {
        let mut tasks = self.tasks.list_all().await?;
        for task in &mut tasks {
            self.resolve_and_store(task).await?;
        }
        tasks.retain(|task| task.status() == TaskStatus::Open);
        Ok(tasks)
    }

    /// Applies a partial update on behalf of `actor`.
    ///
    /// The auto-close rule runs first, so an organizer cannot edit a task
    /// whose date has already passed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is absent,
    /// [`TaskLifecycleError::Forbidden`] when `actor` is not the owner,
    /// or domain errors for illegal edits and transitions.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        actor: NgoId,
        patch: TaskPatch,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        if task.owner() != actor {
            return Err(TaskLifecycleError::Forbidden { task_id, actor });
        }
        self.resolve_and_store(&mut task).await?;

        task.apply_patch(patch, &*self.clock)?;
        self.tasks.update(&task).await?;
        tracing::info!(task_id = %task_id, status = %task.status(), "task updated");
        Ok(task)
    }

    /// Deletes a task and every application attached to it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is absent,
    /// [`TaskLifecycleError::Forbidden`] when `actor` is not the owner,
    /// or repository errors from either store.
    pub async fn delete_task(&self, task_id: TaskId, actor: NgoId) -> TaskLifecycleResult<()> {
        let task = self.find_task_or_error(task_id).await?;
        if task.owner() != actor {
            return Err(TaskLifecycleError::Forbidden { task_id, actor });
        }

        let removed_applications = self.applications.delete_for_task(task_id).await?;
        self.tasks.delete(task_id).await?;
        tracing::info!(
            task_id = %task_id,
            removed_applications,
            "task deleted with application cascade"
        );
        Ok(())
    }
}
