//! Application aggregate root: a volunteer's request to join a task.

use super::{
    ApplicationDomainError, ApplicationId, AttendanceRecord, AttendanceStatus, HoursWorked, NgoId,
    ParseApplicationStatusError, TaskId, VolunteerId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Awaiting an organizer decision.
    Pending,
    /// Accepted; attendance may be marked.
    Approved,
    /// Declined. Terminal: no attendance or certificate path.
    Rejected,
}

impl ApplicationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for ApplicationStatus {
    type Error = ParseApplicationStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseApplicationStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An organizer's decision on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Accept the volunteer.
    Approve,
    /// Decline the volunteer.
    Reject,
}

/// Application aggregate root.
///
/// Progression after approval is strictly ordered: attendance is marked
/// once, a present mark may be verified, and verified presence is the
/// only gate to certificate eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    id: ApplicationId,
    task_id: TaskId,
    volunteer_id: VolunteerId,
    motivation: Option<String>,
    status: ApplicationStatus,
    decided_at: Option<DateTime<Utc>>,
    attendance: Option<AttendanceRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted application aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedApplicationData {
    /// Persisted application identifier.
    pub id: ApplicationId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted volunteer reference.
    pub volunteer_id: VolunteerId,
    /// Persisted motivation text, if any.
    pub motivation: Option<String>,
    /// Persisted lifecycle status.
    pub status: ApplicationStatus,
    /// Persisted decision timestamp, if decided.
    pub decided_at: Option<DateTime<Utc>>,
    /// Persisted attendance record, if marked.
    pub attendance: Option<AttendanceRecord>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Creates a pending application for `(task_id, volunteer_id)`.
    ///
    /// Blank motivation text is normalized to `None`.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        volunteer_id: VolunteerId,
        motivation: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ApplicationId::new(),
            task_id,
            volunteer_id,
            motivation: motivation
                .map(|text| text.trim().to_owned())
                .filter(|text| !text.is_empty()),
            status: ApplicationStatus::Pending,
            decided_at: None,
            attendance: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an application from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedApplicationData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            volunteer_id: data.volunteer_id,
            motivation: data.motivation,
            status: data.status,
            decided_at: data.decided_at,
            attendance: data.attendance,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the application identifier.
    #[must_use]
    pub const fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the task this application targets.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the applying volunteer.
    #[must_use]
    pub const fn volunteer_id(&self) -> VolunteerId {
        self.volunteer_id
    }

    /// Returns the motivation text, if any.
    #[must_use]
    pub fn motivation(&self) -> Option<&str> {
        self.motivation.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ApplicationStatus {
        self.status
    }

    /// Returns when the application was decided, if it was.
    #[must_use]
    pub const fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    /// Returns the attendance record, if marked.
    #[must_use]
    pub const fn attendance(&self) -> Option<&AttendanceRecord> {
        self.attendance.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies an organizer decision.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationDomainError::AlreadyDecided`] when the
    /// application is no longer pending.
    pub fn decide(&mut self, decision: Decision, clock: &impl Clock) -> Result<(), ApplicationDomainError> {
        if self.status != ApplicationStatus::Pending {
            return Err(ApplicationDomainError::AlreadyDecided {
                application_id: self.id,
                status: self.status,
            });
        }
        self.status = match decision {
            Decision::Approve => ApplicationStatus::Approved,
            Decision::Reject => ApplicationStatus::Rejected,
        };
        let timestamp = clock.utc();
        self.decided_at = Some(timestamp);
        self.updated_at = timestamp;
        Ok(())
    }

    /// Marks attendance for the first time.
    ///
    /// An absent mark always carries zero hours. Re-marking goes through
    /// [`Self::amend_attendance`], never through a second mark.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationDomainError::AttendanceRequiresApproval`]
    /// unless the application is approved, or
    /// [`ApplicationDomainError::AttendanceAlreadyMarked`] when a mark
    /// already exists.
    pub fn mark_attendance(
        &mut self,
        status: AttendanceStatus,
        marked_by: NgoId,
        hours_worked: HoursWorked,
        clock: &impl Clock,
    ) -> Result<(), ApplicationDomainError> {
        if self.status != ApplicationStatus::Approved {
            return Err(ApplicationDomainError::AttendanceRequiresApproval {
                application_id: self.id,
                status: self.status,
            });
        }
        if self.attendance.is_some() {
            return Err(ApplicationDomainError::AttendanceAlreadyMarked(self.id));
        }
        self.attendance = Some(AttendanceRecord::new(status, marked_by, hours_worked, clock));
        self.touch(clock);
        Ok(())
    }

    /// Corrects an existing, unverified attendance mark.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationDomainError::AttendanceNotMarked`] when no
    /// mark exists, or
    /// [`ApplicationDomainError::AttendanceAlreadyVerified`] when the
    /// mark has been verified and is no longer correctable.
    pub fn amend_attendance(
        &mut self,
        status: AttendanceStatus,
        marked_by: NgoId,
        hours_worked: HoursWorked,
        clock: &impl Clock,
    ) -> Result<(), ApplicationDomainError> {
        let record = self
            .attendance
            .as_mut()
            .ok_or(ApplicationDomainError::AttendanceNotMarked(self.id))?;
        if record.verified() {
            return Err(ApplicationDomainError::AttendanceAlreadyVerified(self.id));
        }
        record.amend(status, marked_by, hours_worked, clock);
        self.touch(clock);
        Ok(())
    }

    /// Confirms a present attendance mark as accurate.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationDomainError::AttendanceNotMarked`] when no
    /// mark exists,
    /// [`ApplicationDomainError::VerificationRequiresPresence`] when the
    /// volunteer was absent, or
    /// [`ApplicationDomainError::AttendanceAlreadyVerified`] when already
    /// verified.
    pub fn verify_attendance(
        &mut self,
        verified_by: NgoId,
        clock: &impl Clock,
    ) -> Result<(), ApplicationDomainError> {
        let application_id = self.id;
        let record = self
            .attendance
            .as_mut()
            .ok_or(ApplicationDomainError::AttendanceNotMarked(application_id))?;
        if record.status() != AttendanceStatus::Present {
            return Err(ApplicationDomainError::VerificationRequiresPresence(
                application_id,
            ));
        }
        if record.verified() {
            return Err(ApplicationDomainError::AttendanceAlreadyVerified(
                application_id,
            ));
        }
        record.verify(verified_by, clock);
        self.touch(clock);
        Ok(())
    }

    /// Returns the verified present hours, the single certificate gate.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationDomainError::VerificationRequiresPresence`]
    /// unless a present attendance mark exists, or
    /// [`ApplicationDomainError::CertificateRequiresVerification`] when
    /// that mark has not been verified.
    pub fn certificate_hours(&self) -> Result<HoursWorked, ApplicationDomainError> {
        let record = self
            .attendance
            .as_ref()
            .filter(|record| record.status() == AttendanceStatus::Present)
            .ok_or(ApplicationDomainError::VerificationRequiresPresence(self.id))?;
        if !record.verified() {
            return Err(ApplicationDomainError::CertificateRequiresVerification(
                self.id,
            ));
        }
        Ok(record.hours_worked())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
