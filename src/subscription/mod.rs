//! Subscription Aggregate
//!
//! The subscription binds an application to a plan and walks a fixed
//! lifecycle: PENDING, then ACCEPTED/PAUSED, ending in REJECTED or CLOSED.
//! Admission rules live in [`eligibility`], transitions on the entity, and
//! orchestration in [`operations`].

pub mod eligibility;
pub mod entity;
pub mod operations;
pub mod repository;

pub use entity::{Subscription, SubscriptionStatus};
pub use repository::{SubscriptionRepository, SubscriptionStore};
