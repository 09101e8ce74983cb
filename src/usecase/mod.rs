//! Use Case Infrastructure
//!
//! Shared plumbing for the lifecycle operations: the error taxonomy, the
//! sealed result type, execution context, domain events and the unit of
//! work that commits transitions atomically.

pub mod domain_event;
pub mod error;
pub mod execution_context;
pub mod result;
pub mod unit_of_work;

pub use domain_event::{DomainEvent, EventMetadata};
pub use error::UseCaseError;
pub use execution_context::ExecutionContext;
pub use result::UseCaseResult;
pub use unit_of_work::{MongoUnitOfWork, OutboxEvent, UnitOfWork};
