//! API Key Aggregate
//!
//! Keys issued under API_KEY plans. Their lifecycle is driven entirely by
//! the owning subscription through the entitlement cascade.

pub mod cascade;
pub mod entity;
pub mod repository;

pub use entity::ApiKey;
pub use repository::{ApiKeyRepository, ApiKeyStore};
