//! Attendance record for an approved application.

use super::{HoursWorked, NgoId, ParseAttendanceStatusError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the volunteer showed up.
///
/// "Not marked" is represented by the absence of an
/// [`AttendanceRecord`], not by a status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// The volunteer attended the task.
    Present,
    /// The volunteer did not attend.
    Absent,
}

impl AttendanceStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl TryFrom<&str> for AttendanceStatus {
    type Error = ParseAttendanceStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            _ => Err(ParseAttendanceStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a single attendance mark and its verification state.
///
/// Mutation goes through the owning
/// [`Application`](super::Application), which enforces the
/// approval/one-mark/verification gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    status: AttendanceStatus,
    marked_by: NgoId,
    marked_at: DateTime<Utc>,
    hours_worked: HoursWorked,
    verified: bool,
    verified_by: Option<NgoId>,
    verified_at: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    /// Creates a fresh, unverified mark.
    ///
    /// An absent mark always carries zero hours, whatever the caller
    /// supplied.
    pub(super) fn new(
        status: AttendanceStatus,
        marked_by: NgoId,
        hours_worked: HoursWorked,
        clock: &impl Clock,
    ) -> Self {
        Self {
            status,
            marked_by,
            marked_at: clock.utc(),
            hours_worked: effective_hours(status, hours_worked),
            verified: false,
            verified_by: None,
            verified_at: None,
        }
    }

    /// Overwrites the mark with corrected values.
    pub(super) fn amend(
        &mut self,
        status: AttendanceStatus,
        marked_by: NgoId,
        hours_worked: HoursWorked,
        clock: &impl Clock,
    ) {
        self.status = status;
        self.marked_by = marked_by;
        self.marked_at = clock.utc();
        self.hours_worked = effective_hours(status, hours_worked);
    }

    /// Confirms the mark as accurate.
    pub(super) fn verify(&mut self, verified_by: NgoId, clock: &impl Clock) {
        self.verified = true;
        self.verified_by = Some(verified_by);
        self.verified_at = Some(clock.utc());
    }

    /// Returns the attendance status.
    #[must_use]
    pub const fn status(&self) -> AttendanceStatus {
        self.status
    }

    /// Returns who marked the attendance.
    #[must_use]
    pub const fn marked_by(&self) -> NgoId {
        self.marked_by
    }

    /// Returns when the attendance was marked.
    #[must_use]
    pub const fn marked_at(&self) -> DateTime<Utc> {
        self.marked_at
    }

    /// Returns the hours worked.
    #[must_use]
    pub const fn hours_worked(&self) -> HoursWorked {
        self.hours_worked
    }

    /// Returns whether the mark has been verified.
    #[must_use]
    pub const fn verified(&self) -> bool {
        self.verified
    }

    /// Returns who verified the mark, if anyone.
    #[must_use]
    pub const fn verified_by(&self) -> Option<NgoId> {
        self.verified_by
    }

    /// Returns when the mark was verified, if it was.
    #[must_use]
    pub const fn verified_at(&self) -> Option<DateTime<Utc>> {
        self.verified_at
    }
}

/// Absence cannot accrue hours.
const fn effective_hours(status: AttendanceStatus, hours_worked: HoursWorked) -> HoursWorked {
    match status {
        AttendanceStatus::Present => hours_worked,
        AttendanceStatus::Absent => HoursWorked::ZERO,
    }
}
