//! Notification Hooks
//!
//! Outbound, fire-and-forget boundary. Hooks are triggered strictly after a
//! unit-of-work commit succeeds, so a notification failure can never abort a
//! committed transition. Each subscription hook fires twice: once targeted
//! at the API, once at the application.

use async_trait::async_trait;
use serde_json::json;

use crate::subscription::entity::Subscription;

/// Hook kinds raised by the subscription lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionHook {
    New,
    Accepted,
    Rejected,
    Closed,
    Paused,
    Resumed,
    Transferred,
}

impl SubscriptionHook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "SUBSCRIPTION_NEW",
            Self::Accepted => "SUBSCRIPTION_ACCEPTED",
            Self::Rejected => "SUBSCRIPTION_REJECTED",
            Self::Closed => "SUBSCRIPTION_CLOSED",
            Self::Paused => "SUBSCRIPTION_PAUSED",
            Self::Resumed => "SUBSCRIPTION_RESUMED",
            Self::Transferred => "SUBSCRIPTION_TRANSFERRED",
        }
    }
}

/// Target of a hook trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookTarget {
    Api(String),
    Application(String),
}

/// Delivery contract. Implementations must not fail the caller: delivery
/// problems are their own to log and retry.
#[async_trait]
pub trait NotificationHub: Send + Sync {
    async fn trigger(&self, hook: SubscriptionHook, target: HookTarget, params: serde_json::Value);
}

/// Hub that records triggers in the service log. Stands in until a real
/// delivery channel is wired up by the embedding service.
pub struct LoggingNotificationHub;

#[async_trait]
impl NotificationHub for LoggingNotificationHub {
    async fn trigger(&self, hook: SubscriptionHook, target: HookTarget, params: serde_json::Value) {
        tracing::info!(
            hook = hook.as_str(),
            target = ?target,
            params = %params,
            "Notification hook triggered"
        );
    }
}

/// Parameter bag shared by all subscription hooks.
pub fn subscription_params(subscription: &Subscription) -> serde_json::Value {
    json!({
        "subscription": subscription.id,
        "api": subscription.api,
        "plan": subscription.plan,
        "application": subscription.application,
        "status": subscription.status,
        "reason": subscription.reason,
    })
}

/// Fire the API-side and application-side triggers for one transition.
pub async fn trigger_subscription_hooks(
    hub: &dyn NotificationHub,
    hook: SubscriptionHook,
    subscription: &Subscription,
) {
    let params = subscription_params(subscription);
    hub.trigger(
        hook,
        HookTarget::Api(subscription.api.clone()),
        params.clone(),
    )
    .await;
    hub.trigger(
        hook,
        HookTarget::Application(subscription.application.clone()),
        params,
    )
    .await;
}
