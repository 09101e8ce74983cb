//! Close Subscription Use Case
//!
//! Ends a subscription. A live (accepted or paused) subscription closes and
//! every bound key is revoked in the same commit; a still-pending one
//! resolves to a rejection. Key revocation is silent: only the
//! subscription-level notification fires.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::events::SubscriptionClosed;
use crate::api_key::{cascade, ApiKeyStore};
use crate::audit::AuditEntry;
use crate::notification::{trigger_subscription_hooks, NotificationHub, SubscriptionHook};
use crate::subscription::entity::SubscriptionStatus;
use crate::subscription::repository::SubscriptionStore;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

/// Command to close a subscription.
#[derive(Debug, Clone)]
pub struct CloseSubscriptionCommand {
    pub subscription_id: String,
}

/// Use case for closing a subscription.
pub struct CloseSubscriptionUseCase<U: UnitOfWork> {
    unit_of_work: Arc<U>,
    subscriptions: Arc<dyn SubscriptionStore>,
    api_keys: Arc<dyn ApiKeyStore>,
    notifications: Arc<dyn NotificationHub>,
}

impl<U: UnitOfWork> CloseSubscriptionUseCase<U> {
    pub fn new(
        unit_of_work: Arc<U>,
        subscriptions: Arc<dyn SubscriptionStore>,
        api_keys: Arc<dyn ApiKeyStore>,
        notifications: Arc<dyn NotificationHub>,
    ) -> Self {
        Self {
            unit_of_work,
            subscriptions,
            api_keys,
            notifications,
        }
    }

    pub async fn execute(
        &self,
        command: CloseSubscriptionCommand,
        ctx: &ExecutionContext,
    ) -> UseCaseResult<SubscriptionClosed> {
        let mut subscription = match self.subscriptions.find_by_id(&command.subscription_id).await
        {
            Ok(Some(s)) => s,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "SUBSCRIPTION_NOT_FOUND",
                    format!("Subscription '{}' does not exist", command.subscription_id),
                ));
            }
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        let before = subscription.clone();
        let (revoked, event, hook) = match subscription.status {
            SubscriptionStatus::Pending => {
                // Closing a request that was never granted is a rejection.
                if let Err(e) = subscription.reject(
                    Some("Subscription has been closed.".to_string()),
                    &ctx.principal_id,
                ) {
                    return UseCaseResult::failure(e);
                }
                let event = SubscriptionClosed::rejected(&subscription, ctx);
                (Vec::new(), event, SubscriptionHook::Rejected)
            }
            SubscriptionStatus::Accepted | SubscriptionStatus::Paused => {
                if let Err(e) = subscription.close() {
                    return UseCaseResult::failure(e);
                }
                let keys = match self.api_keys.find_by_subscription(&subscription.id).await {
                    Ok(k) => k,
                    Err(e) => return UseCaseResult::failure(e.into()),
                };
                let closed_at = subscription.closed_at.unwrap_or_else(Utc::now);
                let revoked = cascade::on_close(closed_at, keys);
                let event = SubscriptionClosed::closed(&subscription, revoked.len(), ctx);
                (revoked, event, SubscriptionHook::Closed)
            }
            SubscriptionStatus::Rejected | SubscriptionStatus::Closed => {
                return UseCaseResult::failure(UseCaseError::state_violation(
                    "NOT_CLOSABLE",
                    format!(
                        "Subscription '{}' is not in a state to be closed",
                        subscription.id
                    ),
                ));
            }
        };

        let audit = AuditEntry::for_subscription(
            "SUBSCRIPTION_CLOSED",
            Some(&before),
            Some(&subscription),
            ctx,
        );

        let result = self
            .unit_of_work
            .commit(&subscription, &revoked, event, audit)
            .await;

        if result.is_success() {
            info!(
                subscription_id = %subscription.id,
                status = ?subscription.status,
                keys_revoked = revoked.len(),
                "Subscription closed"
            );
            trigger_subscription_hooks(self.notifications.as_ref(), hook, &subscription).await;
        }

        result
    }
}
