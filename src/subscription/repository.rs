//! Subscription Store
//!
//! Read side of the subscription aggregate. All writes go through the unit
//! of work so transitions commit atomically with their key cascade.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use super::entity::Subscription;
use crate::shared::error::Result;

/// Read contract consumed by the lifecycle operations.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Subscription>>;

    /// All subscriptions of an application on a given API, any status.
    async fn find_by_application_and_api(
        &self,
        application_id: &str,
        api_id: &str,
    ) -> Result<Vec<Subscription>>;
}

pub struct SubscriptionRepository {
    collection: Collection<Subscription>,
}

impl SubscriptionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("subscriptions"),
        }
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Subscription>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_application_and_api(
        &self,
        application_id: &str,
        api_id: &str,
    ) -> Result<Vec<Subscription>> {
        let cursor = self
            .collection
            .find(doc! { "application": application_id, "api": api_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
