//! Error types for certificate domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain certificate values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CertificateDomainError {
    /// The certificate number is blank or contains whitespace.
    #[error("invalid certificate number '{0}'")]
    InvalidCertificateNumber(String),

    /// The document URL is empty after trimming.
    #[error("certificate document URL must not be empty")]
    EmptyDocumentUrl,
}

/// Error returned while parsing certificate statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown certificate status: {0}")]
pub struct ParseCertificateStatusError(pub String);
