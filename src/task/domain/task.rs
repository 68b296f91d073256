//! Task aggregate root and the task status machine.

use super::{MaxVolunteers, NgoId, ParseTaskStatusError, ParseUrgencyError, TaskDomainError, TaskId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Task lifecycle status.
///
/// `Completed` and `Cancelled` are organizer-driven terminal states.
/// `Closed` is terminal too, but reachable only through the date-based
/// auto-close rule, never by an explicit organizer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is accepting applications.
    Open,
    /// Work on the task is underway.
    InProgress,
    /// The organizer marked the task as completed.
    Completed,
    /// The organizer cancelled the task.
    Cancelled,
    /// The task date passed while the task was still open.
    Closed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Closed => "closed",
        }
    }

    /// Returns whether the status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Closed)
    }

    /// Returns whether an organizer may move a task from this status to
    /// `target`.
    ///
    /// `Closed` is excluded from every row: it is auto-derived and cannot
    /// be requested.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::InProgress | Self::Completed | Self::Cancelled)
                | (Self::InProgress, Self::Completed | Self::Cancelled)
        )
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently the task needs volunteers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// No particular time pressure.
    Low,
    /// Volunteers needed soon.
    Medium,
    /// Volunteers needed immediately.
    High,
}

impl Urgency {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for Urgency {
    type Error = ParseUrgencyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseUrgencyError(value.to_owned())),
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw field set for creating a task.
///
/// Validation happens in [`Task::new`]; this struct only carries the
/// caller's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    /// Task title.
    pub title: String,
    /// What the task involves.
    pub description: String,
    /// Where the task takes place.
    pub location: String,
    /// Calendar date of the activity.
    pub date: NaiveDate,
    /// Skills a volunteer should bring.
    pub required_skills: Vec<String>,
    /// Maximum number of volunteers accepted.
    pub max_volunteers: u32,
    /// Task category.
    pub category: String,
    /// Urgency level.
    pub urgency: Urgency,
}

/// Partial update to an open task.
///
/// Absent fields are left untouched. A `status` entry requests an
/// organizer-driven transition and is validated against the status
/// machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement location.
    pub location: Option<String>,
    /// Replacement activity date.
    pub date: Option<NaiveDate>,
    /// Replacement skill list.
    pub required_skills: Option<Vec<String>>,
    /// Replacement volunteer capacity.
    pub max_volunteers: Option<u32>,
    /// Replacement category.
    pub category: Option<String>,
    /// Replacement urgency level.
    pub urgency: Option<Urgency>,
    /// Requested status transition.
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the patch edits any field other than status.
    #[must_use]
    pub const fn has_field_edits(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.location.is_some()
            || self.date.is_some()
            || self.required_skills.is_some()
            || self.max_volunteers.is_some()
            || self.category.is_some()
            || self.urgency.is_some()
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: NgoId,
    title: String,
    description: String,
    location: String,
    date: NaiveDate,
    required_skills: BTreeSet<String>,
    max_volunteers: MaxVolunteers,
    category: String,
    urgency: Urgency,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning NGO.
    pub owner: NgoId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted location.
    pub location: String,
    /// Persisted activity date.
    pub date: NaiveDate,
    /// Persisted skill set.
    pub required_skills: BTreeSet<String>,
    /// Persisted volunteer capacity.
    pub max_volunteers: MaxVolunteers,
    /// Persisted category.
    pub category: String,
    /// Persisted urgency level.
    pub urgency: Urgency,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new open task owned by `owner`.
    ///
    /// A past `date` is accepted; the auto-close rule surfaces such a
    /// task as closed on its first read.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when any field fails validation.
    pub fn new(owner: NgoId, fields: TaskFields, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = validated_text(fields.title, TaskDomainError::EmptyTitle)?;
        let description = validated_text(fields.description, TaskDomainError::EmptyDescription)?;
        let location = validated_text(fields.location, TaskDomainError::EmptyLocation)?;
        let category = validated_text(fields.category, TaskDomainError::EmptyCategory)?;
        let required_skills = validated_skills(fields.required_skills)?;
        let max_volunteers = MaxVolunteers::new(fields.max_volunteers)?;

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            owner,
            title,
            description,
            location,
            date: fields.date,
            required_skills,
            max_volunteers,
            category,
            urgency: fields.urgency,
            status: TaskStatus::Open,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            title: data.title,
            description: data.description,
            location: data.location,
            date: data.date,
            required_skills: data.required_skills,
            max_volunteers: data.max_volunteers,
            category: data.category,
            urgency: data.urgency,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning NGO.
    #[must_use]
    pub const fn owner(&self) -> NgoId {
        self.owner
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the task location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the calendar date of the activity.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the required skill set.
    #[must_use]
    pub const fn required_skills(&self) -> &BTreeSet<String> {
        &self.required_skills
    }

    /// Returns the volunteer capacity.
    #[must_use]
    pub const fn max_volunteers(&self) -> MaxVolunteers {
        self.max_volunteers
    }

    /// Returns the task category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the urgency level.
    #[must_use]
    pub const fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// Returns the stored lifecycle status.
    ///
    /// Read paths should prefer [`Self::resolved_status`], which also
    /// accounts for the auto-close rule.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
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

    /// The auto-close rule, as a pure function.
    ///
    /// An open task whose date is on or before `as_of` resolves to
    /// [`TaskStatus::Closed`]; any other task resolves to its stored
    /// status. The comparison is date-only and inclusive: a task is
    /// passed starting the calendar day of the event.
    #[must_use]
    pub fn resolved_status(&self, as_of: NaiveDate) -> TaskStatus {
        if self.status == TaskStatus::Open && self.date <= as_of {
            TaskStatus::Closed
        } else {
            self.status
        }
    }

    /// Applies the auto-close rule in place.
    ///
    /// Returns `true` when the transition fired. Closing an already
    /// closed task is a no-op, so concurrent readers racing to apply the
    /// rule converge on the same state.
    pub fn close_if_due(&mut self, as_of: NaiveDate, clock: &impl Clock) -> bool {
        if self.resolved_status(as_of) == self.status {
            return false;
        }
        self.status = TaskStatus::Closed;
        self.touch(clock);
        true
    }

    /// Applies an organizer-driven status transition.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusChange`] when the status
    /// machine does not permit the move.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStatusChange {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Applies a partial update.
    ///
    /// Field edits (including the date) are permitted only while the task
    /// is open; a requested status transition is validated against the
    /// status machine. Nothing is mutated unless every part of the patch
    /// is valid.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskNotEditable`] for field edits on a
    /// non-open task, [`TaskDomainError::InvalidStatusChange`] for an
    /// illegal transition, or a validation error for a malformed field.
    pub fn apply_patch(&mut self, patch: TaskPatch, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if patch.has_field_edits() && self.status != TaskStatus::Open {
            return Err(TaskDomainError::TaskNotEditable {
                task_id: self.id,
                status: self.status,
            });
        }
        if let Some(target) = patch.status {
            if !self.status.can_transition_to(target) {
                return Err(TaskDomainError::InvalidStatusChange {
                    task_id: self.id,
                    from: self.status,
                    to: target,
                });
            }
        }

        let title = patch
            .title
            .map(|value| validated_text(value, TaskDomainError::EmptyTitle))
            .transpose()?;
        let description = patch
            .description
            .map(|value| validated_text(value, TaskDomainError::EmptyDescription))
            .transpose()?;
        let location = patch
            .location
            .map(|value| validated_text(value, TaskDomainError::EmptyLocation))
            .transpose()?;
        let category = patch
            .category
            .map(|value| validated_text(value, TaskDomainError::EmptyCategory))
            .transpose()?;
        let required_skills = patch.required_skills.map(validated_skills).transpose()?;
        let max_volunteers = patch.max_volunteers.map(MaxVolunteers::new).transpose()?;

        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = location {
            self.location = value;
        }
        if let Some(value) = category {
            self.category = value;
        }
        if let Some(value) = required_skills {
            self.required_skills = value;
        }
        if let Some(value) = max_volunteers {
            self.max_volunteers = value;
        }
        if let Some(value) = patch.date {
            self.date = value;
        }
        if let Some(value) = patch.urgency {
            self.urgency = value;
        }
        if let Some(target) = patch.status {
            self.status = target;
        }
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Trims a text field, rejecting blank values with the given error.
fn validated_text(value: String, empty_error: TaskDomainError) -> Result<String, TaskDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(empty_error);
    }
    Ok(trimmed.to_owned())
}

/// Normalizes a skill list, rejecting empty lists and blank entries.
fn validated_skills(skills: Vec<String>) -> Result<BTreeSet<String>, TaskDomainError> {
    if skills.is_empty() {
        return Err(TaskDomainError::NoRequiredSkills);
    }
    let mut normalized = BTreeSet::new();
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptySkill);
        }
        normalized.insert(trimmed.to_owned());
    }
    Ok(normalized)
}
