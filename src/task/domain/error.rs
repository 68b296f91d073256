//! Error types for task domain validation, transitions, and parsing.

use super::{ApplicationId, ApplicationStatus, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating task aggregates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// The task location is empty after trimming.
    #[error("task location must not be empty")]
    EmptyLocation,

    /// The task category is empty after trimming.
    #[error("task category must not be empty")]
    EmptyCategory,

    /// The task lists no required skills.
    #[error("task must list at least one required skill")]
    NoRequiredSkills,

    /// A required skill entry is empty after trimming.
    #[error("required skill entries must not be empty")]
    EmptySkill,

    /// The volunteer capacity is zero.
    #[error("task must accept at least one volunteer")]
    ZeroMaxVolunteers,

    /// The requested status change is not an organizer-driven transition.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidStatusChange {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// Field edits were requested on a task that is no longer open.
    #[error("task {task_id} is {status} and can no longer be edited")]
    TaskNotEditable {
        /// Task identifier.
        task_id: TaskId,
        /// Status blocking the edit.
        status: TaskStatus,
    },
}

/// Errors returned while mutating application aggregates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplicationDomainError {
    /// The application has already been approved or rejected.
    #[error("application {application_id} is already {status}")]
    AlreadyDecided {
        /// Application identifier.
        application_id: ApplicationId,
        /// Status blocking the decision.
        status: ApplicationStatus,
    },

    /// Attendance was marked on an application that is not approved.
    #[error("application {application_id} is {status}; attendance requires approval")]
    AttendanceRequiresApproval {
        /// Application identifier.
        application_id: ApplicationId,
        /// Status blocking the mark.
        status: ApplicationStatus,
    },

    /// Attendance has already been marked for this application.
    #[error("attendance already marked for application {0}")]
    AttendanceAlreadyMarked(ApplicationId),

    /// An attendance amendment or verification was requested before any
    /// mark exists.
    #[error("attendance not yet marked for application {0}")]
    AttendanceNotMarked(ApplicationId),

    /// The attendance record has already been verified.
    #[error("attendance already verified for application {0}")]
    AttendanceAlreadyVerified(ApplicationId),

    /// Verification requires the volunteer to have been present.
    #[error("application {0} has no present attendance to verify")]
    VerificationRequiresPresence(ApplicationId),

    /// Certificate eligibility requires verified attendance.
    #[error("application {0} has no verified attendance")]
    CertificateRequiresVerification(ApplicationId),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing urgency levels from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown urgency level: {0}")]
pub struct ParseUrgencyError(pub String);

/// Error returned while parsing application statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown application status: {0}")]
pub struct ParseApplicationStatusError(pub String);

/// Error returned while parsing attendance statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown attendance status: {0}")]
pub struct ParseAttendanceStatusError(pub String);
