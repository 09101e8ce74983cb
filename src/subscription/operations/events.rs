//! Subscription Domain Events
//!
//! One event per committed transition, written to the outbox by the unit of
//! work. All events share the `gateway:subscription` source and a per
//! subscription message group so consumers observe each subscription's
//! transitions in order.

use serde::Serialize;

use crate::impl_domain_event;
use crate::subscription::entity::{Subscription, SubscriptionStatus};
use crate::usecase::{EventMetadata, ExecutionContext};

pub const SOURCE: &str = "gateway:subscription";
pub const SPEC_VERSION: &str = "1.0";

fn metadata(event_type: &str, subscription_id: &str, ctx: &ExecutionContext) -> EventMetadata {
    EventMetadata::new(
        event_type,
        SPEC_VERSION,
        SOURCE,
        format!("gateway.subscription.{}", subscription_id),
        format!("gateway:subscription:{}", subscription_id),
        ctx.execution_id.clone(),
        ctx.correlation_id.clone(),
        ctx.causation_id.clone(),
        ctx.principal_id.clone(),
    )
}

/// A subscription request was admitted. Carries the birth status so a
/// consumer can tell an auto-accepted subscription from a pending one
/// without waiting for a second event.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionCreated {
    #[serde(skip)]
    metadata: EventMetadata,
    pub subscription_id: String,
    pub application_id: String,
    pub plan_id: String,
    pub api_id: String,
    pub status: SubscriptionStatus,
}

impl SubscriptionCreated {
    pub fn new(subscription: &Subscription, ctx: &ExecutionContext) -> Self {
        Self {
            metadata: metadata("gateway:subscription:created", &subscription.id, ctx),
            subscription_id: subscription.id.clone(),
            application_id: subscription.application.clone(),
            plan_id: subscription.plan.clone(),
            api_id: subscription.api.clone(),
            status: subscription.status,
        }
    }
}

impl_domain_event!(SubscriptionCreated);

/// A pending subscription was processed by a publisher. The event type
/// reflects the outcome: `gateway:subscription:accepted` or
/// `gateway:subscription:rejected`.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionProcessed {
    #[serde(skip)]
    metadata: EventMetadata,
    pub subscription_id: String,
    pub application_id: String,
    pub plan_id: String,
    pub api_id: String,
    pub status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub keys_generated: usize,
}

impl SubscriptionProcessed {
    pub fn accepted(
        subscription: &Subscription,
        keys_generated: usize,
        ctx: &ExecutionContext,
    ) -> Self {
        Self::new(
            "gateway:subscription:accepted",
            subscription,
            keys_generated,
            ctx,
        )
    }

    pub fn rejected(subscription: &Subscription, ctx: &ExecutionContext) -> Self {
        Self::new("gateway:subscription:rejected", subscription, 0, ctx)
    }

    fn new(
        event_type: &str,
        subscription: &Subscription,
        keys_generated: usize,
        ctx: &ExecutionContext,
    ) -> Self {
        Self {
            metadata: metadata(event_type, &subscription.id, ctx),
            subscription_id: subscription.id.clone(),
            application_id: subscription.application.clone(),
            plan_id: subscription.plan.clone(),
            api_id: subscription.api.clone(),
            status: subscription.status,
            reason: subscription.reason.clone(),
            keys_generated,
        }
    }
}

impl_domain_event!(SubscriptionProcessed);

/// An accepted subscription's terms were rescheduled.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionUpdated {
    #[serde(skip)]
    metadata: EventMetadata,
    pub subscription_id: String,
    pub application_id: String,
    pub plan_id: String,
    pub api_id: String,
    pub keys_clamped: usize,
}

impl SubscriptionUpdated {
    pub fn new(subscription: &Subscription, keys_clamped: usize, ctx: &ExecutionContext) -> Self {
        Self {
            metadata: metadata("gateway:subscription:updated", &subscription.id, ctx),
            subscription_id: subscription.id.clone(),
            application_id: subscription.application.clone(),
            plan_id: subscription.plan.clone(),
            api_id: subscription.api.clone(),
            keys_clamped,
        }
    }
}

impl_domain_event!(SubscriptionUpdated);

/// A subscription ended. Closing a still-pending subscription resolves to a
/// rejection, so the event type is `gateway:subscription:closed` or
/// `gateway:subscription:rejected` depending on the prior status.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionClosed {
    #[serde(skip)]
    metadata: EventMetadata,
    pub subscription_id: String,
    pub application_id: String,
    pub plan_id: String,
    pub api_id: String,
    pub status: SubscriptionStatus,
    pub keys_revoked: usize,
}

impl SubscriptionClosed {
    pub fn closed(
        subscription: &Subscription,
        keys_revoked: usize,
        ctx: &ExecutionContext,
    ) -> Self {
        Self::new("gateway:subscription:closed", subscription, keys_revoked, ctx)
    }

    pub fn rejected(subscription: &Subscription, ctx: &ExecutionContext) -> Self {
        Self::new("gateway:subscription:rejected", subscription, 0, ctx)
    }

    fn new(
        event_type: &str,
        subscription: &Subscription,
        keys_revoked: usize,
        ctx: &ExecutionContext,
    ) -> Self {
        Self {
            metadata: metadata(event_type, &subscription.id, ctx),
            subscription_id: subscription.id.clone(),
            application_id: subscription.application.clone(),
            plan_id: subscription.plan.clone(),
            api_id: subscription.api.clone(),
            status: subscription.status,
            keys_revoked,
        }
    }
}

impl_domain_event!(SubscriptionClosed);

/// An accepted subscription was suspended.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionPaused {
    #[serde(skip)]
    metadata: EventMetadata,
    pub subscription_id: String,
    pub application_id: String,
    pub plan_id: String,
    pub api_id: String,
    pub keys_paused: usize,
}

impl SubscriptionPaused {
    pub fn new(subscription: &Subscription, keys_paused: usize, ctx: &ExecutionContext) -> Self {
        Self {
            metadata: metadata("gateway:subscription:paused", &subscription.id, ctx),
            subscription_id: subscription.id.clone(),
            application_id: subscription.application.clone(),
            plan_id: subscription.plan.clone(),
            api_id: subscription.api.clone(),
            keys_paused,
        }
    }
}

impl_domain_event!(SubscriptionPaused);

/// A paused subscription went live again.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResumed {
    #[serde(skip)]
    metadata: EventMetadata,
    pub subscription_id: String,
    pub application_id: String,
    pub plan_id: String,
    pub api_id: String,
    pub keys_resumed: usize,
}

impl SubscriptionResumed {
    pub fn new(subscription: &Subscription, keys_resumed: usize, ctx: &ExecutionContext) -> Self {
        Self {
            metadata: metadata("gateway:subscription:resumed", &subscription.id, ctx),
            subscription_id: subscription.id.clone(),
            application_id: subscription.application.clone(),
            plan_id: subscription.plan.clone(),
            api_id: subscription.api.clone(),
            keys_resumed,
        }
    }
}

impl_domain_event!(SubscriptionResumed);

/// A subscription was re-pointed to another plan on the same API.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionTransferred {
    #[serde(skip)]
    metadata: EventMetadata,
    pub subscription_id: String,
    pub application_id: String,
    pub api_id: String,
    pub source_plan_id: String,
    pub target_plan_id: String,
}

impl SubscriptionTransferred {
    pub fn new(
        subscription: &Subscription,
        source_plan_id: impl Into<String>,
        ctx: &ExecutionContext,
    ) -> Self {
        Self {
            metadata: metadata("gateway:subscription:transferred", &subscription.id, ctx),
            subscription_id: subscription.id.clone(),
            application_id: subscription.application.clone(),
            api_id: subscription.api.clone(),
            source_plan_id: source_plan_id.into(),
            target_plan_id: subscription.plan.clone(),
        }
    }
}

impl_domain_event!(SubscriptionTransferred);

/// A subscription row and its keys were hard-deleted.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionDeleted {
    #[serde(skip)]
    metadata: EventMetadata,
    pub subscription_id: String,
    pub application_id: String,
    pub plan_id: String,
    pub api_id: String,
    pub keys_deleted: usize,
}

impl SubscriptionDeleted {
    pub fn new(subscription: &Subscription, keys_deleted: usize, ctx: &ExecutionContext) -> Self {
        Self {
            metadata: metadata("gateway:subscription:deleted", &subscription.id, ctx),
            subscription_id: subscription.id.clone(),
            application_id: subscription.application.clone(),
            plan_id: subscription.plan.clone(),
            api_id: subscription.api.clone(),
            keys_deleted,
        }
    }
}

impl_domain_event!(SubscriptionDeleted);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use crate::usecase::DomainEvent;

    #[test]
    fn test_created_event_shape() {
        let ctx = ExecutionContext::create("user-1");
        let sub = testing::pending_subscription("sub-1", "app-1", "plan-1", "api-1");

        let event = SubscriptionCreated::new(&sub, &ctx);

        assert_eq!(event.event_type(), "gateway:subscription:created");
        assert_eq!(event.subject(), "gateway.subscription.sub-1");
        assert_eq!(event.message_group(), "gateway:subscription:sub-1");
        assert_eq!(event.principal_id(), "user-1");
        assert_eq!(event.status, SubscriptionStatus::Pending);
    }

    #[test]
    fn test_processed_event_type_reflects_outcome() {
        let ctx = ExecutionContext::create("publisher-1");
        let mut sub = testing::pending_subscription("sub-1", "app-1", "plan-1", "api-1");
        sub.accept(None, None, "publisher-1").unwrap();

        let event = SubscriptionProcessed::accepted(&sub, 1, &ctx);
        assert_eq!(event.event_type(), "gateway:subscription:accepted");
        assert_eq!(event.keys_generated, 1);

        let mut sub = testing::pending_subscription("sub-2", "app-1", "plan-1", "api-1");
        sub.reject(Some("no".to_string()), "publisher-1").unwrap();

        let event = SubscriptionProcessed::rejected(&sub, &ctx);
        assert_eq!(event.event_type(), "gateway:subscription:rejected");
        assert_eq!(event.reason.as_deref(), Some("no"));
    }

    #[test]
    fn test_close_of_pending_is_a_rejection() {
        let ctx = ExecutionContext::create("publisher-1");
        let mut sub = testing::pending_subscription("sub-1", "app-1", "plan-1", "api-1");
        sub.reject(Some("Subscription has been closed.".to_string()), "publisher-1")
            .unwrap();

        let event = SubscriptionClosed::rejected(&sub, &ctx);
        assert_eq!(event.event_type(), "gateway:subscription:rejected");
        assert_eq!(event.keys_revoked, 0);
    }

    #[test]
    fn test_data_json_omits_metadata() {
        let ctx = ExecutionContext::create("user-1");
        let sub = testing::pending_subscription("sub-1", "app-1", "plan-1", "api-1");

        let json = SubscriptionCreated::new(&sub, &ctx).to_data_json();
        assert!(json.contains("subscription_id"));
        assert!(!json.contains("correlation_id"));
    }
}
