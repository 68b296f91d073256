//! Service layer for the application flow: applying, deciding,
//! attendance marking, and verification.

use crate::task::{
    domain::{
        Application, ApplicationDomainError, ApplicationId, ApplicationStatus, AttendanceStatus,
        Decision, HoursWorked, MaxVolunteers, NgoId, Task, TaskId, TaskStatus, VolunteerId,
    },
    ports::{
        ApplicationRepository, ApplicationRepositoryError, Notification, Notifier, TaskRepository,
        TaskRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for application flow operations.
#[derive(Debug, Error)]
pub enum ParticipationError {
    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The referenced application does not exist.
    #[error("application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    /// The task is not accepting applications.
    #[error("task {task_id} is {status}, not open")]
    TaskNotOpen {
        /// Task identifier.
        task_id: TaskId,
        /// Resolved status blocking the application.
        status: TaskStatus,
    },

    /// The volunteer already applied to this task.
    ///
    /// Carries the existing application's identity so callers can treat
    /// the conflict as a discovery rather than a failure.
    #[error("already applied; existing application {application_id} is {status}")]
    AlreadyApplied {
        /// The existing application.
        application_id: ApplicationId,
        /// Its current status.
        status: ApplicationStatus,
    },

    /// No application exists for the `(task, volunteer)` pair.
    #[error("volunteer {volunteer_id} has no application for task {task_id}")]
    NoApplicationForPair {
        /// Task identifier.
        task_id: TaskId,
        /// Volunteer identifier.
        volunteer_id: VolunteerId,
    },

    /// The task already has its maximum number of approved volunteers.
    #[error("task {task_id} already has {capacity} approved volunteers")]
    TaskFull {
        /// Task identifier.
        task_id: TaskId,
        /// The task's capacity.
        capacity: MaxVolunteers,
    },

    /// The actor does not own the task.
    #[error("NGO {actor} does not own task {task_id}")]
    Forbidden {
        /// Task identifier.
        task_id: TaskId,
        /// Acting NGO.
        actor: NgoId,
    },

    /// Application state machine violation.
    #[error(transparent)]
    Domain(#[from] ApplicationDomainError),

    /// Task repository operation failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),

    /// Application repository operation failed.
    #[error(transparent)]
    Applications(#[from] ApplicationRepositoryError),
}

/// Result type for application flow operations.
pub type ParticipationResult<T> = Result<T, ParticipationError>;

/// Application flow orchestration service.
#[derive(Clone)]
pub struct ParticipationService<T, A, N, C>
where
    T: TaskRepository,
    A: ApplicationRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    applications: Arc<A>,
    notifier: Arc<N>,
    clock: Arc<C>,
}

impl<T, A, N, C> ParticipationService<T, A, N, C>
where
    T: TaskRepository,
    A: ApplicationRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates a new participation service.
    #[must_use]
    pub const fn new(tasks: Arc<T>, applications: Arc<A>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            applications,
            notifier,
            clock,
        }
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> ParticipationResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(ParticipationError::TaskNotFound(task_id))
    }

    async fn find_owned_task(&self, task_id: TaskId, actor: NgoId) -> ParticipationResult<Task> {
        let task = self.find_task_or_error(task_id).await?;
        if task.owner() != actor {
            return Err(ParticipationError::Forbidden { task_id, actor });
        }
        Ok(task)
    }

    async fn find_pair_or_error(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
    ) -> ParticipationResult<Application> {
        self.applications
            .find_by_pair(task_id, volunteer_id)
            .await?
            .ok_or(ParticipationError::NoApplicationForPair {
                task_id,
                volunteer_id,
            })
    }

    /// Dispatches a notification without letting delivery failures reach
    /// the caller.
    async fn dispatch(&self, notification: Notification) {
        let kind = notification.kind();
        if let Err(err) = self.notifier.notify(notification).await {
            tracing::warn!(kind, error = %err, "notification dispatch failed");
        }
    }

    /// Submits a volunteer's application to an open task.
    ///
    /// The auto-close rule is applied (and persisted) before eligibility
    /// is checked, so a past-dated task can never accept an application.
    /// On success an application-submitted notification goes to the task
    /// owner, fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipationError::TaskNotFound`] when the task is
    /// absent, [`ParticipationError::TaskNotOpen`] when its resolved
    /// status is not open, or [`ParticipationError::AlreadyApplied`] with
    /// the existing application's identity when the pair is taken.
    pub async fn apply_to_task(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
        motivation: Option<String>,
    ) -> ParticipationResult<Application> {
        let mut task = self.find_task_or_error(task_id).await?;
        let today = self.clock.utc().date_naive();
        if task.close_if_due(today, &*self.clock) {
            self.tasks.update(&task).await?;
        }
        if task.status() != TaskStatus::Open {
            return Err(ParticipationError::TaskNotOpen {
                task_id,
                status: task.status(),
            });
        }

        let application = Application::new(task_id, volunteer_id, motivation, &*self.clock);
        match self.applications.store(&application).await {
            Ok(()) => {}
            Err(ApplicationRepositoryError::DuplicateApplication { .. }) => {
                // The storage uniqueness constraint is the arbiter; report
                // the surviving record instead of a generic fault.
                return Err(self.already_applied(task_id, volunteer_id).await?);
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(
            application_id = %application.id(),
            task_id = %task_id,
            volunteer_id = %volunteer_id,
            "application submitted"
        );
        self.dispatch(Notification::ApplicationSubmitted {
            task_id,
            task_title: task.title().to_owned(),
            owner: task.owner(),
            application_id: application.id(),
            volunteer_id,
        })
        .await;
        Ok(application)
    }

    /// Builds the conflict error for a pair that is already taken.
    async fn already_applied(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
    ) -> ParticipationResult<ParticipationError> {
        let existing = self.find_pair_or_error(task_id, volunteer_id).await?;
        Ok(ParticipationError::AlreadyApplied {
            application_id: existing.id(),
            status: existing.status(),
        })
    }

    /// Approves or rejects a pending application.
    ///
    /// Approval also enforces the task's volunteer capacity. The decision
    /// notification goes to the volunteer, fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipationError::ApplicationNotFound`] or
    /// [`ParticipationError::TaskNotFound`] for missing entities,
    /// [`ParticipationError::Forbidden`] when `decider` does not own the
    /// task, [`ParticipationError::TaskFull`] when approving beyond
    /// capacity, or the domain error for a re-decision.
    pub async fn decide_application(
        &self,
        application_id: ApplicationId,
        decider: NgoId,
        decision: Decision,
    ) -> ParticipationResult<Application> {
        let mut application = self
            .applications
            .find_by_id(application_id)
            .await?
            .ok_or(ParticipationError::ApplicationNotFound(application_id))?;
        let task = self.find_owned_task(application.task_id(), decider).await?;

        if decision == Decision::Approve {
            let approved = self
                .applications
                .list_for_task(task.id())
                .await?
                .iter()
                .filter(|candidate| candidate.status() == ApplicationStatus::Approved)
                .count();
            let capacity = usize::try_from(task.max_volunteers().value()).unwrap_or(usize::MAX);
            if approved >= capacity {
                return Err(ParticipationError::TaskFull {
                    task_id: task.id(),
                    capacity: task.max_volunteers(),
                });
            }
        }

        application.decide(decision, &*self.clock)?;
        self.applications.update(&application).await?;

        tracing::info!(
            application_id = %application_id,
            task_id = %task.id(),
            decision = ?decision,
            "application decided"
        );
        self.dispatch(Notification::ApplicationDecided {
            task_id: task.id(),
            task_title: task.title().to_owned(),
            application_id,
            volunteer_id: application.volunteer_id(),
            decision,
        })
        .await;
        Ok(application)
    }

    /// Marks attendance for an approved volunteer, once.
    ///
    /// An absent mark carries zero hours regardless of `hours_worked`.
    /// Corrections go through [`Self::amend_attendance`].
    ///
    /// # Errors
    ///
    /// Returns [`ParticipationError::Forbidden`] unless `marker` owns the
    /// task, [`ParticipationError::NoApplicationForPair`] when the
    /// volunteer never applied, or domain errors for an unapproved
    /// application or an existing mark.
    pub async fn mark_attendance(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
        marker: NgoId,
        status: AttendanceStatus,
        hours_worked: HoursWorked,
    ) -> ParticipationResult<Application> {
        self.find_owned_task(task_id, marker).await?;
        let mut application = self.find_pair_or_error(task_id, volunteer_id).await?;
        application.mark_attendance(status, marker, hours_worked, &*self.clock)?;
        self.applications.update(&application).await?;
        tracing::info!(
            application_id = %application.id(),
            status = %status,
            hours = %hours_worked,
            "attendance marked"
        );
        Ok(application)
    }

    /// Corrects an existing, unverified attendance mark.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipationError::Forbidden`] unless `marker` owns the
    /// task, [`ParticipationError::NoApplicationForPair`] when the
    /// volunteer never applied, or domain errors when no mark exists or
    /// it is already verified.
    pub async fn amend_attendance(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
        marker: NgoId,
        status: AttendanceStatus,
        hours_worked: HoursWorked,
    ) -> ParticipationResult<Application> {
        self.find_owned_task(task_id, marker).await?;
        let mut application = self.find_pair_or_error(task_id, volunteer_id).await?;
        application.amend_attendance(status, marker, hours_worked, &*self.clock)?;
        self.applications.update(&application).await?;
        tracing::info!(
            application_id = %application.id(),
            status = %status,
            hours = %hours_worked,
            "attendance amended"
        );
        Ok(application)
    }

    /// Verifies a present attendance mark.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipationError::Forbidden`] unless `verifier` owns
    /// the task, [`ParticipationError::NoApplicationForPair`] when the
    /// volunteer never applied, or domain errors when the mark is
    /// missing, absent, or already verified.
    pub async fn verify_attendance(
        &self,
        task_id: TaskId,
        volunteer_id: VolunteerId,
        verifier: NgoId,
    ) -> ParticipationResult<Application> {
        self.find_owned_task(task_id, verifier).await?;
        let mut application = self.find_pair_or_error(task_id, volunteer_id).await?;
        application.verify_attendance(verifier, &*self.clock)?;
        self.applications.update(&application).await?;
        tracing::info!(application_id = %application.id(), "attendance verified");
        Ok(application)
    }

    /// Returns all applications for a task, owner-only.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipationError::TaskNotFound`] or
    /// [`ParticipationError::Forbidden`], or repository errors.
    pub async fn list_applications_for_task(
        &self,
        task_id: TaskId,
        actor: NgoId,
    ) -> ParticipationResult<Vec<Application>> {
        self.find_owned_task(task_id, actor).await?;
        Ok(self.applications.list_for_task(task_id).await?)
    }

    /// Returns all applications submitted by a volunteer.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the application store.
    pub async fn list_applications_for_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> ParticipationResult<Vec<Application>> {
        Ok(self.applications.list_for_volunteer(volunteer_id).await?)
    }
}
