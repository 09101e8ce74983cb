//! Create Subscription Use Case
//!
//! Admits a subscription request for an application on a plan. Eligibility
//! is validated up front; the surviving race on concurrent creates for the
//! same (application, plan) pair is closed by the unique partial index the
//! unit of work inserts against, so the check here is advisory only. The
//! OAuth2/JWT exclusivity across plans has no index backing it and stays
//! check-then-act.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::events::SubscriptionCreated;
use crate::api_key::cascade;
use crate::application::ApplicationDirectory;
use crate::audit::AuditEntry;
use crate::group::GroupMembership;
use crate::notification::{trigger_subscription_hooks, NotificationHub, SubscriptionHook};
use crate::plan::{PlanDirectory, PlanValidation};
use crate::subscription::eligibility::{self, PriorSubscription};
use crate::subscription::entity::Subscription;
use crate::subscription::repository::SubscriptionStore;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

/// Command to create a subscription.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub application_id: String,
    pub plan_id: String,
    /// Free-text justification shown to the publisher
    pub request: Option<String>,
    /// Schedule applied when the plan auto-validates
    pub starting_at: Option<DateTime<Utc>>,
    pub ending_at: Option<DateTime<Utc>>,
}

/// Use case for creating a subscription.
pub struct CreateSubscriptionUseCase<U: UnitOfWork> {
    unit_of_work: Arc<U>,
    plans: Arc<dyn PlanDirectory>,
    applications: Arc<dyn ApplicationDirectory>,
    groups: Arc<dyn GroupMembership>,
    subscriptions: Arc<dyn SubscriptionStore>,
    notifications: Arc<dyn NotificationHub>,
}

impl<U: UnitOfWork> CreateSubscriptionUseCase<U> {
    pub fn new(
        unit_of_work: Arc<U>,
        plans: Arc<dyn PlanDirectory>,
        applications: Arc<dyn ApplicationDirectory>,
        groups: Arc<dyn GroupMembership>,
        subscriptions: Arc<dyn SubscriptionStore>,
        notifications: Arc<dyn NotificationHub>,
    ) -> Self {
        Self {
            unit_of_work,
            plans,
            applications,
            groups,
            subscriptions,
            notifications,
        }
    }

    pub async fn execute(
        &self,
        command: CreateSubscriptionCommand,
        ctx: &ExecutionContext,
    ) -> UseCaseResult<SubscriptionCreated> {
        let plan = match self.plans.find_by_id(&command.plan_id).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "PLAN_NOT_FOUND",
                    format!("Plan '{}' does not exist", command.plan_id),
                ));
            }
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        let application = match self.applications.find_by_id(&command.application_id).await {
            Ok(Some(a)) => a,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "APPLICATION_NOT_FOUND",
                    format!("Application '{}' does not exist", command.application_id),
                ));
            }
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        let requester_groups = match self.groups.groups_of(&ctx.principal_id).await {
            Ok(g) => g,
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        let priors = match self.prior_subscriptions(&command.application_id, &plan.api).await {
            Ok(p) => p,
            Err(e) => return UseCaseResult::failure(e),
        };

        let client_id =
            match eligibility::validate(&plan, &application, &requester_groups, &priors) {
                Ok(c) => c,
                Err(e) => return UseCaseResult::failure(e),
            };

        let mut subscription = Subscription::new(
            &command.application_id,
            &plan,
            &ctx.principal_id,
            command.request.clone(),
            client_id,
        );

        // Auto-validating plans accept in the same commit: the subscription
        // is never observable in PENDING.
        let (keys, hook) = match plan.validation {
            PlanValidation::Manual => (Vec::new(), SubscriptionHook::New),
            PlanValidation::Auto => {
                if let Err(e) =
                    subscription.accept(command.starting_at, command.ending_at, "system")
                {
                    return UseCaseResult::failure(e);
                }
                (
                    cascade::on_accept(&plan, &subscription),
                    SubscriptionHook::Accepted,
                )
            }
        };

        let event = SubscriptionCreated::new(&subscription, ctx);
        let audit =
            AuditEntry::for_subscription("SUBSCRIPTION_CREATED", None, Some(&subscription), ctx);

        let result = self
            .unit_of_work
            .commit_create(&subscription, &keys, event, audit)
            .await;

        if result.is_success() {
            info!(
                subscription_id = %subscription.id,
                plan_id = %subscription.plan,
                application_id = %subscription.application,
                status = ?subscription.status,
                "Subscription created"
            );
            trigger_subscription_hooks(self.notifications.as_ref(), hook, &subscription).await;
        }

        result
    }

    /// Non-terminal subscriptions of the application on the plan's API, with
    /// each prior plan's security scheme resolved. Priors whose plan no
    /// longer resolves are skipped.
    async fn prior_subscriptions(
        &self,
        application_id: &str,
        api_id: &str,
    ) -> Result<Vec<PriorSubscription>, UseCaseError> {
        let existing = self
            .subscriptions
            .find_by_application_and_api(application_id, api_id)
            .await
            .map_err(UseCaseError::from)?;

        let mut priors = Vec::new();
        for sub in existing.into_iter().filter(|s| !s.is_terminal()) {
            if let Some(plan) = self.plans.find_by_id(&sub.plan).await.map_err(UseCaseError::from)? {
                priors.push(PriorSubscription {
                    plan: plan.id,
                    security: plan.security,
                });
            }
        }
        Ok(priors)
    }
}
