//! API Key Entity
//!
//! Dependent aggregate of a subscription. Keys are issued when an API_KEY
//! plan subscription is accepted and follow the subscription through every
//! lifecycle transition.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::subscription::entity::Subscription;

/// API key entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    #[serde(rename = "_id")]
    pub id: String,

    /// The secret key material presented by the gateway consumer
    pub key: String,

    /// Owning subscription
    pub subscription: String,

    /// Application the key was issued to
    pub application: String,

    /// Plan the key grants access under
    pub plan: String,

    /// Expiry; never later than the owning subscription's ending_at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime<Utc>>,

    /// Set while the owning subscription is paused
    #[serde(default)]
    pub paused: bool,

    #[serde(default)]
    pub revoked: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ApiKey {
    /// Generate a fresh key for a subscription. The expiry is seeded from
    /// the subscription's ending_at.
    pub fn generate(subscription: &Subscription) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            key: Uuid::new_v4().to_string(),
            subscription: subscription.id.clone(),
            application: subscription.application.clone(),
            plan: subscription.plan.clone(),
            expire_at: subscription.ending_at,
            paused: false,
            revoked: false,
            revoked_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.map_or(false, |e| e <= now)
    }

    /// A key is live while it is neither revoked nor expired.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired(now)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
