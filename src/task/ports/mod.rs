//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod application;
pub mod notifier;
pub mod repository;

pub use application::{ApplicationRepository, ApplicationRepositoryError, ApplicationRepositoryResult};
pub use notifier::{Notification, Notifier, NotifierError, NotifierResult, Recipient};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
