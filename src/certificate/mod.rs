//! Completion certificate issuance for Volmatch.
//!
//! A certificate is the proof-of-completion artifact for one verified,
//! present application. Issuance is gated entirely by the task context's
//! application machine: only verified present attendance can ever earn a
//! certificate, the worked hours are snapshotted at creation time, and
//! the certificate status only moves forward (requested, generated,
//! issued, downloaded). The module follows hexagonal architecture:
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
