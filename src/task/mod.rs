//! Task lifecycle management for Volmatch.
//!
//! This module owns the two coupled state machines at the heart of the
//! platform: the task machine (open, in progress, completed, cancelled,
//! closed) and the application machine (pending, approved, rejected, then
//! attendance, verification, and certificate eligibility). Tasks whose
//! date has passed while still open are closed lazily on every read path
//! rather than by a background sweep. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
