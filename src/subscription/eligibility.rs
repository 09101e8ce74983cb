//! Eligibility & Admission Rules
//!
//! Pure validation of a subscription request against plan, application and
//! prior-subscription state. Checks run in a fixed order and the first
//! failing check wins, so error reporting is reproducible.

use std::collections::HashSet;

use crate::application::Application;
use crate::plan::{Plan, PlanSecurity, PlanStatus};
use crate::usecase::UseCaseError;
use crate::details;

/// A non-terminal subscription the application already holds on the plan's
/// API, with its plan's security scheme resolved.
#[derive(Debug, Clone)]
pub struct PriorSubscription {
    pub plan: String,
    pub security: PlanSecurity,
}

/// Run the admission checks for a subscription request.
///
/// `existing` must contain only the application's non-terminal subscriptions
/// on the plan's API (REJECTED/CLOSED excluded by the caller).
///
/// Returns the client_id to stamp on the new subscription, derived from the
/// application.
pub fn validate(
    plan: &Plan,
    application: &Application,
    requester_groups: &HashSet<String>,
    existing: &[PriorSubscription],
) -> Result<Option<String>, UseCaseError> {
    // 1-3: plan publication status
    match plan.status {
        PlanStatus::Deprecated => {
            return Err(UseCaseError::policy_violation(
                "PLAN_NOT_SUBSCRIBABLE",
                format!("Plan '{}' is deprecated and can not be subscribed", plan.id),
            ));
        }
        PlanStatus::Closed => {
            return Err(UseCaseError::policy_violation(
                "PLAN_ALREADY_CLOSED",
                format!("Plan '{}' is closed", plan.id),
            ));
        }
        PlanStatus::Staging => {
            return Err(UseCaseError::policy_violation(
                "PLAN_NOT_YET_PUBLISHED",
                format!("Plan '{}' is not yet published", plan.id),
            ));
        }
        PlanStatus::Published => {}
    }

    // 4: key-less plans need no binding
    if plan.security == PlanSecurity::KeyLess {
        return Err(UseCaseError::policy_violation(
            "PLAN_NOT_SUBSCRIBABLE",
            format!("Plan '{}' is key-less and requires no subscription", plan.id),
        ));
    }

    // 5: group exclusions
    if plan
        .excluded_groups
        .iter()
        .any(|g| requester_groups.contains(g))
    {
        return Err(UseCaseError::policy_violation(
            "PLAN_RESTRICTED",
            format!("Plan '{}' is restricted for the requesting subject", plan.id),
        ));
    }

    // 6: archived applications may not subscribe
    if application.is_archived() {
        return Err(UseCaseError::policy_violation(
            "APPLICATION_ARCHIVED",
            format!("Application '{}' is archived", application.id),
        ));
    }

    // 7: one non-terminal subscription per (application, plan)
    if existing.iter().any(|s| s.plan == plan.id) {
        return Err(UseCaseError::conflict_with_details(
            "PLAN_ALREADY_SUBSCRIBED",
            format!(
                "Application '{}' already holds a subscription to plan '{}'",
                application.id, plan.id
            ),
            details! { "plan" => plan.id, "application" => application.id },
        ));
    }

    // 8: OAuth2/JWT exclusivity across plans of the same API
    if plan.security.is_client_credentials()
        && existing.iter().any(|s| s.security.is_client_credentials())
    {
        return Err(UseCaseError::conflict(
            "EXCLUSIVE_SECURITY_CONFLICT",
            "Another OAuth2 or JWT plan is already subscribed by the same application",
        ));
    }

    // 9: derive the client_id; mandatory for client-credential schemes
    let client_id = application.client_id().map(String::from);
    if plan.security.is_client_credentials()
        && client_id.as_deref().map_or(true, |c| c.trim().is_empty())
    {
        return Err(UseCaseError::policy_violation(
            "CLIENT_ID_MISSING",
            "A client_id is required to subscribe to an OAuth2 or JWT plan",
        ));
    }

    Ok(client_id)
}
