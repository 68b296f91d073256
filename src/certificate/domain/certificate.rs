//! Certificate aggregate root and its monotonic status ladder.

use super::{CertificateDomainError, CertificateId, CertificateNumber, ParseCertificateStatusError};
use crate::task::domain::{HoursWorked, TaskId, VolunteerId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Certificate lifecycle status.
///
/// Statuses are strictly ordered and only ever advance: a downloaded
/// certificate never returns to an earlier rung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    /// Creation requested; the document is not yet rendered.
    Requested,
    /// The document has been rendered and is retrievable.
    Generated,
    /// The organizer formally issued the certificate.
    Issued,
    /// The volunteer downloaded the document at least once.
    Downloaded,
}

impl CertificateStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Generated => "generated",
            Self::Issued => "issued",
            Self::Downloaded => "downloaded",
        }
    }

    /// Returns the position on the status ladder.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Requested => 0,
            Self::Generated => 1,
            Self::Issued => 2,
            Self::Downloaded => 3,
        }
    }
}

impl TryFrom<&str> for CertificateStatus {
    type Error = ParseCertificateStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "requested" => Ok(Self::Requested),
            "generated" => Ok(Self::Generated),
            "issued" => Ok(Self::Issued),
            "downloaded" => Ok(Self::Downloaded),
            _ => Err(ParseCertificateStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certificate aggregate root.
///
/// `hours_completed` is a snapshot of the attendance record's hours at
/// creation time and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    id: CertificateId,
    number: CertificateNumber,
    task_id: TaskId,
    volunteer_id: VolunteerId,
    hours_completed: HoursWorked,
    url: String,
    status: CertificateStatus,
    created_at: DateTime<Utc>,
    issued_at: Option<DateTime<Utc>>,
    downloaded_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCertificateData {
    /// Persisted certificate identifier.
    pub id: CertificateId,
    /// Persisted certificate number.
    pub number: CertificateNumber,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted volunteer reference.
    pub volunteer_id: VolunteerId,
    /// Persisted hours snapshot.
    pub hours_completed: HoursWorked,
    /// Persisted document URL.
    pub url: String,
    /// Persisted lifecycle status.
    pub status: CertificateStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted issuance timestamp, if issued.
    pub issued_at: Option<DateTime<Utc>>,
    /// Persisted first-download timestamp, if downloaded.
    pub downloaded_at: Option<DateTime<Utc>>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Certificate {
    /// Creates a certificate in `generated` status.
    ///
    /// Called only after the external document generator has produced a
    /// number and a retrievable URL; a certificate never exists without
    /// its document.
    ///
    /// # Errors
    ///
    /// Returns [`CertificateDomainError::EmptyDocumentUrl`] when the URL
    /// is blank.
    pub fn new(
        task_id: TaskId,
        volunteer_id: VolunteerId,
        number: CertificateNumber,
        url: impl Into<String>,
        hours_completed: HoursWorked,
        clock: &impl Clock,
    ) -> Result<Self, CertificateDomainError> {
        let raw_url = url.into();
        let normalized_url = raw_url.trim();
        if normalized_url.is_empty() {
            return Err(CertificateDomainError::EmptyDocumentUrl);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: CertificateId::new(),
            number,
            task_id,
            volunteer_id,
            hours_completed,
            url: normalized_url.to_owned(),
            status: CertificateStatus::Generated,
            created_at: timestamp,
            issued_at: None,
            downloaded_at: None,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a certificate from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCertificateData) -> Self {
        Self {
            id: data.id,
            number: data.number,
            task_id: data.task_id,
            volunteer_id: data.volunteer_id,
            hours_completed: data.hours_completed,
            url: data.url,
            status: data.status,
            created_at: data.created_at,
            issued_at: data.issued_at,
            downloaded_at: data.downloaded_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the certificate identifier.
    #[must_use]
    pub const fn id(&self) -> CertificateId {
        self.id
    }

    /// Returns the human-readable certificate number.
    #[must_use]
    pub const fn number(&self) -> &CertificateNumber {
        &self.number
    }

    /// Returns the task the certificate covers.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the certified volunteer.
    #[must_use]
    pub const fn volunteer_id(&self) -> VolunteerId {
        self.volunteer_id
    }

    /// Returns the hours snapshot taken at creation.
    #[must_use]
    pub const fn hours_completed(&self) -> HoursWorked {
        self.hours_completed
    }

    /// Returns where the rendered document can be retrieved.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> CertificateStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the certificate was issued, if it was.
    #[must_use]
    pub const fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    /// Returns when the certificate was first downloaded, if ever.
    #[must_use]
    pub const fn downloaded_at(&self) -> Option<DateTime<Utc>> {
        self.downloaded_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Marks the certificate as formally issued.
    ///
    /// Returns `true` when the status advanced; issuing an already issued
    /// or downloaded certificate is a no-op.
    pub fn mark_issued(&mut self, clock: &impl Clock) -> bool {
        if !self.advance_to(CertificateStatus::Issued) {
            return false;
        }
        let timestamp = clock.utc();
        self.issued_at = Some(timestamp);
        self.updated_at = timestamp;
        true
    }

    /// Records a download.
    ///
    /// Returns `true` on the first download, which also stamps
    /// `downloaded_at`; later downloads are no-ops and never regress the
    /// status.
    pub fn mark_downloaded(&mut self, clock: &impl Clock) -> bool {
        if !self.advance_to(CertificateStatus::Downloaded) {
            return false;
        }
        let timestamp = clock.utc();
        self.downloaded_at = Some(timestamp);
        self.updated_at = timestamp;
        true
    }

    /// Advances the status ladder, refusing to move backwards.
    fn advance_to(&mut self, target: CertificateStatus) -> bool {
        if self.status.rank() >= target.rank() {
            return false;
        }
        self.status = target;
        true
    }
}
