//! Gateway Platform
//!
//! Subscription lifecycle engine for an API gateway control plane. An
//! application subscribes to a plan published on an API; the subscription
//! walks a fixed lifecycle (PENDING, ACCEPTED, PAUSED, and the terminal
//! REJECTED/CLOSED) and every transition cascades onto the API keys bound
//! to it.
//!
//! # Architecture
//!
//! - Aggregates own their entities and repositories: [`subscription`] is the
//!   root, [`api_key`] the dependent aggregate, [`plan`], [`application`]
//!   and [`group`] read-only reference data owned by external services.
//! - Lifecycle transitions live in [`subscription::operations`], one use
//!   case per transition. A use case validates, mutates the aggregate, and
//!   commits through the [`usecase::UnitOfWork`]; the subscription write,
//!   the key cascade, the outbox event and the audit entry land in one
//!   MongoDB transaction.
//! - [`notification`] hooks fire strictly after the commit, fire-and-forget.

pub mod api_key;
pub mod application;
pub mod audit;
pub mod group;
pub mod notification;
pub mod plan;
pub mod shared;
pub mod subscription;
pub mod usecase;

#[cfg(test)]
pub(crate) mod testing;

pub use shared::{MongoConfig, PlatformError};
pub use subscription::{Subscription, SubscriptionStatus};
pub use usecase::{ExecutionContext, MongoUnitOfWork, UseCaseError, UseCaseResult};
