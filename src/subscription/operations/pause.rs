//! Pause Subscription Use Case
//!
//! Suspends an accepted subscription. Live keys are flagged paused so the
//! gateway refuses them until the subscription resumes.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::events::SubscriptionPaused;
use crate::api_key::{cascade, ApiKeyStore};
use crate::audit::AuditEntry;
use crate::notification::{trigger_subscription_hooks, NotificationHub, SubscriptionHook};
use crate::subscription::repository::SubscriptionStore;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

/// Command to pause a subscription.
#[derive(Debug, Clone)]
pub struct PauseSubscriptionCommand {
    pub subscription_id: String,
}

/// Use case for pausing an accepted subscription.
pub struct PauseSubscriptionUseCase<U: UnitOfWork> {
    unit_of_work: Arc<U>,
    subscriptions: Arc<dyn SubscriptionStore>,
    api_keys: Arc<dyn ApiKeyStore>,
    notifications: Arc<dyn NotificationHub>,
}

impl<U: UnitOfWork> PauseSubscriptionUseCase<U> {
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
        command: PauseSubscriptionCommand,
        ctx: &ExecutionContext,
    ) -> UseCaseResult<SubscriptionPaused> {
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
        if let Err(e) = subscription.pause() {
            return UseCaseResult::failure(e);
        }

        let keys = match self.api_keys.find_by_subscription(&subscription.id).await {
            Ok(k) => k,
            Err(e) => return UseCaseResult::failure(e.into()),
        };
        let paused = cascade::on_pause(subscription.paused_at.unwrap_or_else(Utc::now), keys);

        let event = SubscriptionPaused::new(&subscription, paused.len(), ctx);
        let audit = AuditEntry::for_subscription(
            "SUBSCRIPTION_PAUSED",
            Some(&before),
            Some(&subscription),
            ctx,
        );

        let result = self
            .unit_of_work
            .commit(&subscription, &paused, event, audit)
            .await;

        if result.is_success() {
            info!(
                subscription_id = %subscription.id,
                keys_paused = paused.len(),
                "Subscription paused"
            );
            trigger_subscription_hooks(
                self.notifications.as_ref(),
                SubscriptionHook::Paused,
                &subscription,
            )
            .await;
        }

        result
    }
}
