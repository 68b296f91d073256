//! Port for the external certificate document generator.
//!
//! The generator consumes certificate metadata and produces a retrievable
//! document plus the unique human-readable certificate number. The engine
//! treats it as synchronous: a certificate record is persisted only after
//! rendering succeeds, so a generator failure never leaves a half-created
//! certificate behind.

use crate::certificate::domain::CertificateNumber;
use crate::task::domain::{HoursWorked, TaskId, VolunteerId};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for document rendering.
pub type RendererResult<T> = Result<T, RendererError>;

/// Everything the generator needs to compose the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateMetadata {
    /// Task the certificate covers.
    pub task_id: TaskId,
    /// The certified volunteer.
    pub volunteer_id: VolunteerId,
    /// Task title, printed on the document.
    pub task_title: String,
    /// Where the task took place.
    pub task_location: String,
    /// Calendar date of the activity.
    pub task_date: NaiveDate,
    /// Verified hours, snapshotted by the caller.
    pub hours_completed: HoursWorked,
}

/// The generator's output: a retrievable document and its number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Unique human-readable certificate number.
    pub certificate_number: CertificateNumber,
    /// Where the rendered document can be retrieved.
    pub url: String,
}

/// Document generation contract.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Renders the certificate document.
    ///
    /// # Errors
    ///
    /// Returns [`RendererError::Failed`] when the generator cannot
    /// produce the document.
    async fn render(&self, metadata: &CertificateMetadata) -> RendererResult<RenderedDocument>;
}

/// Errors returned by document generator adapters.
#[derive(Debug, Clone, Error)]
pub enum RendererError {
    /// The generator failed to produce a document.
    #[error("certificate document generation failed: {0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync>),
}

impl RendererError {
    /// Wraps a generation error from the renderer adapter.
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Arc::new(err))
    }
}
