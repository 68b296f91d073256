//! Domain model for task and application lifecycle management.
//!
//! The task domain models NGO-posted tasks, volunteer applications,
//! attendance marking and verification, and the transition rules coupling
//! the two state machines, while keeping all infrastructure concerns
//! outside of the domain boundary.

mod application;
mod attendance;
mod error;
mod ids;
mod task;

pub use application::{Application, ApplicationStatus, Decision, PersistedApplicationData};
pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use error::{
    ApplicationDomainError, ParseApplicationStatusError, ParseAttendanceStatusError,
    ParseTaskStatusError, ParseUrgencyError, TaskDomainError,
};
pub use ids::{ApplicationId, HoursWorked, MaxVolunteers, NgoId, TaskId, VolunteerId};
pub use task::{PersistedTaskData, Task, TaskFields, TaskPatch, TaskStatus, Urgency};
