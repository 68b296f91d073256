//! Fire-and-forget notification sink port.
//!
//! The engine addresses notification recipients by account identifier;
//! resolving contact details (email address and the like) belongs to the
//! delivering adapter, since user profiles sit outside the engine's
//! boundary. Delivery failures never roll back the state transition that
//! triggered them.

use crate::task::domain::{ApplicationId, Decision, NgoId, TaskId, VolunteerId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification dispatch.
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recipient {
    /// An NGO account.
    Ngo {
        /// NGO identifier.
        id: NgoId,
    },
    /// A volunteer account.
    Volunteer {
        /// Volunteer identifier.
        id: VolunteerId,
    },
}

/// A notification request emitted by the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A volunteer applied to a task; addressed to the task owner.
    ApplicationSubmitted {
        /// Task that received the application.
        task_id: TaskId,
        /// Task title, for message composition.
        task_title: String,
        /// Owning NGO.
        owner: NgoId,
        /// The new application.
        application_id: ApplicationId,
        /// The applying volunteer.
        volunteer_id: VolunteerId,
    },
    /// An application was approved or rejected; addressed to the
    /// volunteer.
    ApplicationDecided {
        /// Task the application targets.
        task_id: TaskId,
        /// Task title, for message composition.
        task_title: String,
        /// The decided application.
        application_id: ApplicationId,
        /// The applying volunteer.
        volunteer_id: VolunteerId,
        /// The organizer's decision.
        decision: Decision,
    },
    /// A completion certificate is ready; addressed to the volunteer.
    CertificateReady {
        /// Task the certificate covers.
        task_id: TaskId,
        /// The certified volunteer.
        volunteer_id: VolunteerId,
        /// Human-readable certificate number.
        certificate_number: String,
        /// Where the document can be retrieved.
        url: String,
    },
}

impl Notification {
    /// Returns who the notification is addressed to.
    #[must_use]
    pub const fn recipient(&self) -> Recipient {
        match self {
            Self::ApplicationSubmitted { owner, .. } => Recipient::Ngo { id: *owner },
            Self::ApplicationDecided { volunteer_id, .. }
            | Self::CertificateReady { volunteer_id, .. } => Recipient::Volunteer {
                id: *volunteer_id,
            },
        }
    }

    /// Returns the notification kind as a stable label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ApplicationSubmitted { .. } => "application_submitted",
            Self::ApplicationDecided { .. } => "application_decided",
            Self::CertificateReady { .. } => "certificate_ready",
        }
    }
}

/// Notification delivery contract.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Dispatches a notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Delivery`] when the sink rejects the
    /// notification. Callers treat the failure as loggable, never fatal.
    async fn notify(&self, notification: Notification) -> NotifierResult<()>;
}

/// Errors returned by notification sink adapters.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// The sink failed to accept the notification.
    #[error("notification delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotifierError {
    /// Wraps a delivery error from the sink adapter.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
