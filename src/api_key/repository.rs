//! API Key Store
//!
//! Read side of the key aggregate. Writes go through the unit of work so
//! key mutations commit atomically with the subscription transition that
//! caused them.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use super::entity::ApiKey;
use crate::shared::error::Result;

/// Read contract consumed by the lifecycle operations.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    async fn find_by_subscription(&self, subscription_id: &str) -> Result<Vec<ApiKey>>;
}

pub struct ApiKeyRepository {
    collection: Collection<ApiKey>,
}

impl ApiKeyRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("api_keys"),
        }
    }
}

#[async_trait]
impl ApiKeyStore for ApiKeyRepository {
    async fn find_by_subscription(&self, subscription_id: &str) -> Result<Vec<ApiKey>> {
        let cursor = self
            .collection
            .find(doc! { "subscription": subscription_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
