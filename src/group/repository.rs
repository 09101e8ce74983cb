//! Group Membership Lookup

use std::collections::HashSet;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};
use serde::{Deserialize, Serialize};

use crate::shared::error::Result;

/// Membership contract consumed by the admission rules.
#[async_trait]
pub trait GroupMembership: Send + Sync {
    /// Groups the subject belongs to.
    async fn groups_of(&self, subject_id: &str) -> Result<HashSet<String>>;
}

/// One membership row: a subject belonging to a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject_id: String,
    pub group_id: String,
}

pub struct GroupMembershipRepository {
    collection: Collection<Membership>,
}

impl GroupMembershipRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("memberships"),
        }
    }
}

#[async_trait]
impl GroupMembership for GroupMembershipRepository {
    async fn groups_of(&self, subject_id: &str) -> Result<HashSet<String>> {
        let cursor = self
            .collection
            .find(doc! { "subjectId": subject_id })
            .await?;
        let memberships: Vec<Membership> = cursor.try_collect().await?;
        Ok(memberships.into_iter().map(|m| m.group_id).collect())
    }
}
