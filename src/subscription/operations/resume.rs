//! Resume Subscription Use Case
//!
//! Lifts the suspension of a paused subscription and clears the paused flag
//! on every live key.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::events::SubscriptionResumed;
use crate::api_key::{cascade, ApiKeyStore};
use crate::audit::AuditEntry;
use crate::notification::{trigger_subscription_hooks, NotificationHub, SubscriptionHook};
use crate::subscription::repository::SubscriptionStore;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

/// Command to resume a paused subscription.
#[derive(Debug, Clone)]
pub struct ResumeSubscriptionCommand {
    pub subscription_id: String,
}

/// Use case for resuming a paused subscription.
pub struct ResumeSubscriptionUseCase<U: UnitOfWork> {
    unit_of_work: Arc<U>,
    subscriptions: Arc<dyn SubscriptionStore>,
    api_keys: Arc<dyn ApiKeyStore>,
    notifications: Arc<dyn NotificationHub>,
}

impl<U: UnitOfWork> ResumeSubscriptionUseCase<U> {
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
        command: ResumeSubscriptionCommand,
        ctx: &ExecutionContext,
    ) -> UseCaseResult<SubscriptionResumed> {
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
        if let Err(e) = subscription.resume() {
            return UseCaseResult::failure(e);
        }

        let keys = match self.api_keys.find_by_subscription(&subscription.id).await {
            Ok(k) => k,
            Err(e) => return UseCaseResult::failure(e.into()),
        };
        let resumed = cascade::on_resume(Utc::now(), keys);

        let event = SubscriptionResumed::new(&subscription, resumed.len(), ctx);
        let audit = AuditEntry::for_subscription(
            "SUBSCRIPTION_RESUMED",
            Some(&before),
            Some(&subscription),
            ctx,
        );

        let result = self
            .unit_of_work
            .commit(&subscription, &resumed, event, audit)
            .await;

        if result.is_success() {
            info!(
                subscription_id = %subscription.id,
                keys_resumed = resumed.len(),
                "Subscription resumed"
            );
            trigger_subscription_hooks(
                self.notifications.as_ref(),
                SubscriptionHook::Resumed,
                &subscription,
            )
            .await;
        }

        result
    }
}
