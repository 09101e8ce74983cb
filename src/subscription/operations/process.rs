//! Process Subscription Use Case
//!
//! Publisher decision on a pending subscription: accept or reject. Accepting
//! an API_KEY plan generates the key in the same commit as the transition.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::events::SubscriptionProcessed;
use crate::api_key::cascade;
use crate::audit::AuditEntry;
use crate::notification::{trigger_subscription_hooks, NotificationHub, SubscriptionHook};
use crate::plan::{PlanDirectory, PlanStatus};
use crate::subscription::repository::SubscriptionStore;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

/// Publisher decision.
#[derive(Debug, Clone)]
pub enum ProcessDecision {
    Accept {
        starting_at: Option<DateTime<Utc>>,
        ending_at: Option<DateTime<Utc>>,
    },
    Reject {
        reason: Option<String>,
    },
}

/// Command to process a pending subscription.
#[derive(Debug, Clone)]
pub struct ProcessSubscriptionCommand {
    pub subscription_id: String,
    pub decision: ProcessDecision,
}

/// Use case for processing a pending subscription.
pub struct ProcessSubscriptionUseCase<U: UnitOfWork> {
    unit_of_work: Arc<U>,
    subscriptions: Arc<dyn SubscriptionStore>,
    plans: Arc<dyn PlanDirectory>,
    notifications: Arc<dyn NotificationHub>,
}

impl<U: UnitOfWork> ProcessSubscriptionUseCase<U> {
    pub fn new(
        unit_of_work: Arc<U>,
        subscriptions: Arc<dyn SubscriptionStore>,
        plans: Arc<dyn PlanDirectory>,
        notifications: Arc<dyn NotificationHub>,
    ) -> Self {
        Self {
            unit_of_work,
            subscriptions,
            plans,
            notifications,
        }
    }

    pub async fn execute(
        &self,
        command: ProcessSubscriptionCommand,
        ctx: &ExecutionContext,
    ) -> UseCaseResult<SubscriptionProcessed> {
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

        let plan = match self.plans.find_by_id(&subscription.plan).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "PLAN_NOT_FOUND",
                    format!("Plan '{}' does not exist", subscription.plan),
                ));
            }
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        // A plan closed since the request was filed can no longer be granted.
        if plan.status == PlanStatus::Closed {
            return UseCaseResult::failure(UseCaseError::policy_violation(
                "PLAN_ALREADY_CLOSED",
                format!("Plan '{}' is closed", plan.id),
            ));
        }

        let before = subscription.clone();
        let (keys, event, hook) = match command.decision {
            ProcessDecision::Accept {
                starting_at,
                ending_at,
            } => {
                if let Err(e) = subscription.accept(starting_at, ending_at, &ctx.principal_id) {
                    return UseCaseResult::failure(e);
                }
                let keys = cascade::on_accept(&plan, &subscription);
                let event = SubscriptionProcessed::accepted(&subscription, keys.len(), ctx);
                (keys, event, SubscriptionHook::Accepted)
            }
            ProcessDecision::Reject { reason } => {
                if let Err(e) = subscription.reject(reason, &ctx.principal_id) {
                    return UseCaseResult::failure(e);
                }
                let event = SubscriptionProcessed::rejected(&subscription, ctx);
                (Vec::new(), event, SubscriptionHook::Rejected)
            }
        };

        let audit = AuditEntry::for_subscription(
            "SUBSCRIPTION_UPDATED",
            Some(&before),
            Some(&subscription),
            ctx,
        );

        let result = self
            .unit_of_work
            .commit(&subscription, &keys, event, audit)
            .await;

        if result.is_success() {
            info!(
                subscription_id = %subscription.id,
                status = ?subscription.status,
                "Subscription processed"
            );
            trigger_subscription_hooks(self.notifications.as_ref(), hook, &subscription).await;
        }

        result
    }
}
