//! Shared Infrastructure
//!
//! Cross-cutting concerns: configuration, error types, logging setup and
//! index bootstrap.

pub mod config;
pub mod error;
pub mod indexes;
pub mod logging;

pub use config::MongoConfig;
pub use error::{PlatformError, Result};
pub use indexes::initialize_indexes;
pub use logging::init_logging;
