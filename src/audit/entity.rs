//! Audit Entry
//!
//! Records every lifecycle transition for compliance. Entries are written by
//! the unit of work inside the same transaction as the transition itself.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::subscription::entity::Subscription;
use crate::usecase::ExecutionContext;

/// Audit entry with before/after snapshots of the subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    #[serde(rename = "_id")]
    pub id: String,

    /// API the audited subscription belongs to
    pub api_id: String,

    /// Consuming application
    pub application_id: String,

    /// Transition kind, e.g. "SUBSCRIPTION_CLOSED"
    pub event: String,

    /// Subscription state before the transition (absent on creation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// Subscription state after the transition (absent on deletion)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Principal who performed the transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub performed_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Build an entry for a subscription transition. At least one snapshot
    /// must be given; the api/application references come from whichever is
    /// present.
    pub fn for_subscription(
        event: impl Into<String>,
        before: Option<&Subscription>,
        after: Option<&Subscription>,
        ctx: &ExecutionContext,
    ) -> Self {
        let reference = after.or(before);
        let (api_id, application_id) = reference
            .map(|s| (s.api.clone(), s.application.clone()))
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4().to_string(),
            api_id,
            application_id,
            event: event.into(),
            before: before.and_then(|s| serde_json::to_value(s).ok()),
            after: after.and_then(|s| serde_json::to_value(s).ok()),
            principal_id: Some(ctx.principal_id.clone()),
            performed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_creation_entry_has_no_before() {
        let ctx = ExecutionContext::create("user-1");
        let sub = testing::pending_subscription("sub-1", "app-1", "plan-1", "api-1");

        let entry = AuditEntry::for_subscription("SUBSCRIPTION_CREATED", None, Some(&sub), &ctx);

        assert_eq!(entry.api_id, "api-1");
        assert_eq!(entry.application_id, "app-1");
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
        assert_eq!(entry.principal_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_deletion_entry_has_no_after() {
        let ctx = ExecutionContext::create("user-1");
        let sub = testing::pending_subscription("sub-1", "app-1", "plan-1", "api-1");

        let entry = AuditEntry::for_subscription("SUBSCRIPTION_DELETED", Some(&sub), None, &ctx);

        assert_eq!(entry.api_id, "api-1");
        assert!(entry.before.is_some());
        assert!(entry.after.is_none());
    }
}
