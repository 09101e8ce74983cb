//! Update Subscription Use Case
//!
//! Reschedules an accepted subscription. Live key expiries are clamped to
//! the new ending_at, shrink-only. No notification fires: a reschedule is
//! administrative, not a lifecycle transition.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::events::SubscriptionUpdated;
use crate::api_key::{cascade, ApiKeyStore};
use crate::audit::AuditEntry;
use crate::subscription::repository::SubscriptionStore;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

/// Command to update a subscription's terms.
#[derive(Debug, Clone)]
pub struct UpdateSubscriptionCommand {
    pub subscription_id: String,
    pub starting_at: Option<DateTime<Utc>>,
    pub ending_at: Option<DateTime<Utc>>,
    /// Overrides the stamped client_id; ignored when none was stamped
    pub client_id: Option<String>,
}

/// Use case for updating an accepted subscription.
pub struct UpdateSubscriptionUseCase<U: UnitOfWork> {
    unit_of_work: Arc<U>,
    subscriptions: Arc<dyn SubscriptionStore>,
    api_keys: Arc<dyn ApiKeyStore>,
}

impl<U: UnitOfWork> UpdateSubscriptionUseCase<U> {
    pub fn new(
        unit_of_work: Arc<U>,
        subscriptions: Arc<dyn SubscriptionStore>,
        api_keys: Arc<dyn ApiKeyStore>,
    ) -> Self {
        Self {
            unit_of_work,
            subscriptions,
            api_keys,
        }
    }

    pub async fn execute(
        &self,
        command: UpdateSubscriptionCommand,
        ctx: &ExecutionContext,
    ) -> UseCaseResult<SubscriptionUpdated> {
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
        if let Err(e) = subscription.update_terms(
            command.starting_at,
            command.ending_at,
            command.client_id.clone(),
        ) {
            return UseCaseResult::failure(e);
        }

        let keys = match self.api_keys.find_by_subscription(&subscription.id).await {
            Ok(k) => k,
            Err(e) => return UseCaseResult::failure(e.into()),
        };
        let changed = cascade::on_update(&subscription, keys);

        let event = SubscriptionUpdated::new(&subscription, changed.len(), ctx);
        let audit = AuditEntry::for_subscription(
            "SUBSCRIPTION_UPDATED",
            Some(&before),
            Some(&subscription),
            ctx,
        );

        let result = self
            .unit_of_work
            .commit(&subscription, &changed, event, audit)
            .await;

        if result.is_success() {
            info!(
                subscription_id = %subscription.id,
                keys_clamped = changed.len(),
                "Subscription updated"
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::subscription::entity::SubscriptionStatus;
    use crate::testing::{self, TestHarness};

    fn accepted_subscription(harness: &TestHarness) {
        let mut sub = testing::pending_subscription("sub-1", "app-1", "plan-1", "api-1");
        sub.accept(None, None, "publisher-1").unwrap();
        harness.subscriptions.insert(sub);
    }

    fn command(ending_at: Option<DateTime<Utc>>) -> UpdateSubscriptionCommand {
        UpdateSubscriptionCommand {
            subscription_id: "sub-1".to_string(),
            starting_at: None,
            ending_at,
            client_id: None,
        }
    }

    #[tokio::test]
    async fn test_update_clamps_later_key_expiry() {
        let harness = TestHarness::new();
        accepted_subscription(&harness);

        let ending_at = Utc::now() + Duration::days(10);
        let mut key = testing::api_key("sub-1");
        key.expire_at = Some(ending_at + Duration::days(20));
        harness.api_keys.insert(key);

        let ctx = ExecutionContext::create("publisher-1");
        let event = harness
            .update_use_case()
            .execute(command(Some(ending_at)), &ctx)
            .await
            .unwrap();

        assert_eq!(event.keys_clamped, 1);
        let keys = harness.api_keys.all();
        assert_eq!(keys[0].expire_at, Some(ending_at));
        assert!(harness.hub.triggered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_never_extends_key_expiry() {
        let harness = TestHarness::new();
        accepted_subscription(&harness);

        let near = Utc::now() + Duration::days(5);
        let mut key = testing::api_key("sub-1");
        key.expire_at = Some(near);
        harness.api_keys.insert(key);

        let ctx = ExecutionContext::create("publisher-1");
        let event = harness
            .update_use_case()
            .execute(command(Some(near + Duration::days(30))), &ctx)
            .await
            .unwrap();

        assert_eq!(event.keys_clamped, 0);
        assert_eq!(harness.api_keys.all()[0].expire_at, Some(near));
    }

    #[tokio::test]
    async fn test_update_without_ending_at_touches_no_key() {
        let harness = TestHarness::new();
        accepted_subscription(&harness);

        let mut key = testing::api_key("sub-1");
        key.expire_at = Some(Utc::now() + Duration::days(5));
        harness.api_keys.insert(key);

        let ctx = ExecutionContext::create("publisher-1");
        let event = harness
            .update_use_case()
            .execute(command(None), &ctx)
            .await
            .unwrap();

        assert_eq!(event.keys_clamped, 0);
    }

    #[tokio::test]
    async fn test_update_requires_accepted_status() {
        let harness = TestHarness::new();
        harness.subscriptions.insert(testing::pending_subscription(
            "sub-1", "app-1", "plan-1", "api-1",
        ));

        let ctx = ExecutionContext::create("publisher-1");
        let err = harness
            .update_use_case()
            .execute(command(None), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_UPDATABLE");

        let stored = harness.subscriptions.get("sub-1").unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_unknown_subscription() {
        let harness = TestHarness::new();

        let ctx = ExecutionContext::create("publisher-1");
        let err = harness
            .update_use_case()
            .execute(command(None), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "SUBSCRIPTION_NOT_FOUND");
    }
}
