//! Delete Subscription Use Case
//!
//! Hard deletion of a subscription row and every key bound to it. No
//! notification fires; the audit entry and outbox event are the only trace
//! left behind.

use std::sync::Arc;

use tracing::info;

use super::events::SubscriptionDeleted;
use crate::api_key::ApiKeyStore;
use crate::audit::AuditEntry;
use crate::subscription::repository::SubscriptionStore;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

/// Command to delete a subscription.
#[derive(Debug, Clone)]
pub struct DeleteSubscriptionCommand {
    pub subscription_id: String,
}

/// Use case for deleting a subscription.
pub struct DeleteSubscriptionUseCase<U: UnitOfWork> {
    unit_of_work: Arc<U>,
    subscriptions: Arc<dyn SubscriptionStore>,
    api_keys: Arc<dyn ApiKeyStore>,
}

impl<U: UnitOfWork> DeleteSubscriptionUseCase<U> {
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
        command: DeleteSubscriptionCommand,
        ctx: &ExecutionContext,
    ) -> UseCaseResult<SubscriptionDeleted> {
        let subscription = match self.subscriptions.find_by_id(&command.subscription_id).await {
            Ok(Some(s)) => s,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "SUBSCRIPTION_NOT_FOUND",
                    format!("Subscription '{}' does not exist", command.subscription_id),
                ));
            }
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        let keys = match self.api_keys.find_by_subscription(&subscription.id).await {
            Ok(k) => k,
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        let event = SubscriptionDeleted::new(&subscription, keys.len(), ctx);
        let audit =
            AuditEntry::for_subscription("SUBSCRIPTION_DELETED", Some(&subscription), None, ctx);

        let result = self
            .unit_of_work
            .commit_delete(&subscription, event, audit)
            .await;

        if result.is_success() {
            info!(
                subscription_id = %subscription.id,
                keys_deleted = keys.len(),
                "Subscription deleted"
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, TestHarness};

    fn command(subscription_id: &str) -> DeleteSubscriptionCommand {
        DeleteSubscriptionCommand {
            subscription_id: subscription_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_delete_removes_subscription_and_keys() {
        let harness = TestHarness::new();
        let mut sub = testing::pending_subscription("sub-1", "app-1", "plan-1", "api-1");
        sub.accept(None, None, "publisher-1").unwrap();
        harness.subscriptions.insert(sub);
        harness.api_keys.insert(testing::api_key("sub-1"));
        harness.api_keys.insert(testing::api_key("sub-1"));
        harness.api_keys.insert(testing::api_key("sub-other"));

        let ctx = ExecutionContext::create("admin-1");
        let event = harness
            .delete_use_case()
            .execute(command("sub-1"), &ctx)
            .await
            .unwrap();

        assert_eq!(event.keys_deleted, 2);
        assert!(harness.subscriptions.get("sub-1").is_none());
        // Only keys of the deleted subscription go with it.
        let remaining = harness.api_keys.all();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].subscription, "sub-other");
        assert!(harness.hub.triggered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_works_in_any_status() {
        let harness = TestHarness::new();
        let mut sub = testing::pending_subscription("sub-1", "app-1", "plan-1", "api-1");
        sub.reject(None, "publisher-1").unwrap();
        harness.subscriptions.insert(sub);

        let ctx = ExecutionContext::create("admin-1");
        harness
            .delete_use_case()
            .execute(command("sub-1"), &ctx)
            .await
            .unwrap();
        assert!(harness.subscriptions.get("sub-1").is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_subscription() {
        let harness = TestHarness::new();

        let ctx = ExecutionContext::create("admin-1");
        let err = harness
            .delete_use_case()
            .execute(command("sub-missing"), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "SUBSCRIPTION_NOT_FOUND");
    }
}
