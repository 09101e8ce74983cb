//! Environment-driven configuration.

use mongodb::{Client, Database};

use super::error::{PlatformError, Result};

/// MongoDB connection settings.
///
/// Transactions require a replica set deployment, so the default URI points
/// at a single-node replica set as used in development.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/?replicaSet=rs0".to_string(),
            database: "gateway".to_string(),
        }
    }
}

impl MongoConfig {
    /// Read configuration from `MONGODB_URI` / `MONGODB_DATABASE`,
    /// falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            uri: std::env::var("MONGODB_URI").unwrap_or(defaults.uri),
            database: std::env::var("MONGODB_DATABASE").unwrap_or(defaults.database),
        }
    }

    /// Connect and return the driver client and database handle.
    pub async fn connect(&self) -> Result<(Client, Database)> {
        if self.database.trim().is_empty() {
            return Err(PlatformError::configuration("MONGODB_DATABASE must not be empty"));
        }
        let client = Client::with_uri_str(&self.uri).await?;
        let database = client.database(&self.database);
        Ok((client, database))
    }
}
