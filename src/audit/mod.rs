//! Audit Trail
//!
//! Transition records persisted alongside every commit.

pub mod entity;

pub use entity::AuditEntry;
