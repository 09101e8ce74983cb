//! Plan Directory
//!
//! Read-only lookup of plans owned by the plan management service.

use async_trait::async_trait;
use mongodb::{bson::doc, Collection, Database};

use super::entity::Plan;
use crate::shared::error::Result;

/// Lookup contract consumed by the subscription engine.
#[async_trait]
pub trait PlanDirectory: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Plan>>;
}

pub struct PlanRepository {
    collection: Collection<Plan>,
}

impl PlanRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("plans"),
        }
    }
}

#[async_trait]
impl PlanDirectory for PlanRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Plan>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }
}
