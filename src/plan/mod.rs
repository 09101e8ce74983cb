//! Plan Reference Data
//!
//! Read-only view of plans, owned by an external collaborator.

pub mod entity;
pub mod repository;

pub use entity::{Plan, PlanSecurity, PlanStatus, PlanValidation};
pub use repository::{PlanDirectory, PlanRepository};
