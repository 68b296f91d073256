//! Port contracts for certificate issuance.
//!
//! Ports define infrastructure-agnostic interfaces used by certificate
//! services.

pub mod renderer;
pub mod repository;

pub use renderer::{
    CertificateMetadata, DocumentRenderer, RenderedDocument, RendererError, RendererResult,
};
pub use repository::{CertificateRepository, CertificateRepositoryError, CertificateRepositoryResult};
