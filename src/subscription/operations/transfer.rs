//! Transfer Subscription Use Case
//!
//! Re-points a subscription to another plan on the same API. The target
//! must be published and carry the same security scheme as the current
//! plan; bound keys follow the subscription without being re-issued.

use std::sync::Arc;

use tracing::info;

use super::events::SubscriptionTransferred;
use crate::api_key::{cascade, ApiKeyStore};
use crate::audit::AuditEntry;
use crate::notification::{trigger_subscription_hooks, NotificationHub, SubscriptionHook};
use crate::plan::{Plan, PlanDirectory, PlanStatus};
use crate::subscription::repository::SubscriptionStore;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

/// Command to transfer a subscription to another plan.
#[derive(Debug, Clone)]
pub struct TransferSubscriptionCommand {
    pub subscription_id: String,
    pub target_plan_id: String,
}

/// Use case for transferring a subscription between plans.
pub struct TransferSubscriptionUseCase<U: UnitOfWork> {
    unit_of_work: Arc<U>,
    subscriptions: Arc<dyn SubscriptionStore>,
    plans: Arc<dyn PlanDirectory>,
    api_keys: Arc<dyn ApiKeyStore>,
    notifications: Arc<dyn NotificationHub>,
}

impl<U: UnitOfWork> TransferSubscriptionUseCase<U> {
    pub fn new(
        unit_of_work: Arc<U>,
        subscriptions: Arc<dyn SubscriptionStore>,
        plans: Arc<dyn PlanDirectory>,
        api_keys: Arc<dyn ApiKeyStore>,
        notifications: Arc<dyn NotificationHub>,
    ) -> Self {
        Self {
            unit_of_work,
            subscriptions,
            plans,
            api_keys,
            notifications,
        }
    }

    pub async fn execute(
        &self,
        command: TransferSubscriptionCommand,
        ctx: &ExecutionContext,
    ) -> UseCaseResult<SubscriptionTransferred> {
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

        let current_plan = match self.plans.find_by_id(&subscription.plan).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "PLAN_NOT_FOUND",
                    format!("Plan '{}' does not exist", subscription.plan),
                ));
            }
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        let target_plan = match self.plans.find_by_id(&command.target_plan_id).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "PLAN_NOT_FOUND",
                    format!("Plan '{}' does not exist", command.target_plan_id),
                ));
            }
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        if let Err(e) = check_compatibility(&current_plan, &target_plan) {
            return UseCaseResult::failure(e);
        }

        let before = subscription.clone();
        let source_plan_id = subscription.plan.clone();
        subscription.transfer_to(&target_plan);

        let keys = match self.api_keys.find_by_subscription(&subscription.id).await {
            Ok(k) => k,
            Err(e) => return UseCaseResult::failure(e.into()),
        };
        let moved = cascade::on_transfer(&target_plan, keys);

        let event = SubscriptionTransferred::new(&subscription, source_plan_id, ctx);
        let audit = AuditEntry::for_subscription(
            "SUBSCRIPTION_TRANSFERRED",
            Some(&before),
            Some(&subscription),
            ctx,
        );

        let result = self
            .unit_of_work
            .commit(&subscription, &moved, event, audit)
            .await;

        if result.is_success() {
            info!(
                subscription_id = %subscription.id,
                target_plan_id = %subscription.plan,
                keys_moved = moved.len(),
                "Subscription transferred"
            );
            trigger_subscription_hooks(
                self.notifications.as_ref(),
                SubscriptionHook::Transferred,
                &subscription,
            )
            .await;
        }

        result
    }
}

/// Target plan compatibility: same API, published, same security scheme.
fn check_compatibility(current: &Plan, target: &Plan) -> Result<(), UseCaseError> {
    if target.api != current.api {
        return Err(UseCaseError::state_violation(
            "TRANSFER_NOT_ALLOWED",
            format!("Plan '{}' belongs to a different API", target.id),
        ));
    }
    if target.status != PlanStatus::Published {
        return Err(UseCaseError::state_violation(
            "TRANSFER_NOT_ALLOWED",
            format!("Plan '{}' is not published", target.id),
        ));
    }
    if target.security != current.security {
        return Err(UseCaseError::state_violation(
            "TRANSFER_NOT_ALLOWED",
            format!(
                "Plan '{}' uses a different security scheme than plan '{}'",
                target.id, current.id
            ),
        ));
    }
    Ok(())
}
