//! In-memory adapters for certificate ports.

mod renderer;
mod repository;

pub use renderer::InMemoryDocumentRenderer;
pub use repository::InMemoryCertificateRepository;
