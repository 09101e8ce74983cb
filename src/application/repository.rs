//! Application Directory
//!
//! Read-only lookup of applications owned by the application management
//! service.

use async_trait::async_trait;
use mongodb::{bson::doc, Collection, Database};

use super::entity::Application;
use crate::shared::error::Result;

/// Lookup contract consumed by the subscription engine.
#[async_trait]
pub trait ApplicationDirectory: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Application>>;
}

pub struct ApplicationRepository {
    collection: Collection<Application>,
}

impl ApplicationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("applications"),
        }
    }
}

#[async_trait]
impl ApplicationDirectory for ApplicationRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Application>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }
}
