//! Subscription Entity
//!
//! The aggregate root binding an application to a plan. Every transition is
//! an exhaustive match over the status so an unhandled state is a compile
//! error, never a silent fall-through.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::Plan;
use crate::usecase::UseCaseError;

/// Subscription lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Awaiting a publisher decision
    Pending,
    /// Live: the application may invoke the plan's API
    Accepted,
    /// Temporarily suspended by the publisher
    Paused,
    /// Terminal: refused by the publisher
    Rejected,
    /// Terminal: ended after having been live
    Closed,
}

impl SubscriptionStatus {
    /// Terminal states admit no further lifecycle transition except
    /// hard deletion.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Rejected | Self::Closed => true,
            Self::Pending | Self::Accepted | Self::Paused => false,
        }
    }
}

/// Subscription entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: String,

    /// Consuming application
    pub application: String,

    /// Subscribed plan
    pub plan: String,

    /// API the plan belongs to (denormalized from the plan)
    pub api: String,

    pub status: SubscriptionStatus,

    /// Client id stamped at admission time for OAuth2/JWT enforcement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Free-text justification supplied by the requester
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,

    /// Publisher-supplied reason (rejection, forced closure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub subscribed_by: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ending_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Create a pending subscription for an admitted request.
    pub fn new(
        application_id: impl Into<String>,
        plan: &Plan,
        subscribed_by: impl Into<String>,
        request: Option<String>,
        client_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            application: application_id.into(),
            plan: plan.id.clone(),
            api: plan.api.clone(),
            status: SubscriptionStatus::Pending,
            client_id,
            request,
            reason: None,
            subscribed_by: subscribed_by.into(),
            processed_by: None,
            created_at: now,
            updated_at: now,
            processed_at: None,
            starting_at: None,
            ending_at: None,
            paused_at: None,
            closed_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Accept a pending subscription.
    pub fn accept(
        &mut self,
        starting_at: Option<DateTime<Utc>>,
        ending_at: Option<DateTime<Utc>>,
        validator: &str,
    ) -> Result<(), UseCaseError> {
        match self.status {
            SubscriptionStatus::Pending => {
                let now = Utc::now();
                self.status = SubscriptionStatus::Accepted;
                self.starting_at = Some(starting_at.unwrap_or(now));
                self.ending_at = ending_at;
                self.processed_at = Some(now);
                self.processed_by = Some(validator.to_string());
                self.updated_at = now;
                Ok(())
            }
            SubscriptionStatus::Accepted
            | SubscriptionStatus::Paused
            | SubscriptionStatus::Rejected
            | SubscriptionStatus::Closed => Err(self.already_processed()),
        }
    }

    /// Reject a pending subscription.
    pub fn reject(&mut self, reason: Option<String>, validator: &str) -> Result<(), UseCaseError> {
        match self.status {
            SubscriptionStatus::Pending => {
                let now = Utc::now();
                self.status = SubscriptionStatus::Rejected;
                self.reason = reason;
                self.processed_at = Some(now);
                self.processed_by = Some(validator.to_string());
                self.closed_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            SubscriptionStatus::Accepted
            | SubscriptionStatus::Paused
            | SubscriptionStatus::Rejected
            | SubscriptionStatus::Closed => Err(self.already_processed()),
        }
    }

    /// Reschedule an accepted subscription.
    ///
    /// A caller-supplied client_id only overrides an existing one; it never
    /// introduces a client_id on a subscription admitted without one.
    pub fn update_terms(
        &mut self,
        starting_at: Option<DateTime<Utc>>,
        ending_at: Option<DateTime<Utc>>,
        client_id: Option<String>,
    ) -> Result<(), UseCaseError> {
        match self.status {
            SubscriptionStatus::Accepted => {
                self.starting_at = starting_at;
                self.ending_at = ending_at;
                if client_id.is_some() && self.client_id.is_some() {
                    self.client_id = client_id;
                }
                self.updated_at = Utc::now();
                Ok(())
            }
            SubscriptionStatus::Pending
            | SubscriptionStatus::Paused
            | SubscriptionStatus::Rejected
            | SubscriptionStatus::Closed => Err(UseCaseError::state_violation(
                "NOT_UPDATABLE",
                format!("Subscription '{}' is not in a state to be updated", self.id),
            )),
        }
    }

    /// Close an accepted or paused subscription. Pending subscriptions are
    /// handled by the close use case via the reject path.
    pub fn close(&mut self) -> Result<(), UseCaseError> {
        match self.status {
            SubscriptionStatus::Accepted | SubscriptionStatus::Paused => {
                let now = Utc::now();
                self.status = SubscriptionStatus::Closed;
                self.closed_at = Some(now);
                self.paused_at = None;
                self.updated_at = now;
                Ok(())
            }
            SubscriptionStatus::Pending
            | SubscriptionStatus::Rejected
            | SubscriptionStatus::Closed => Err(UseCaseError::state_violation(
                "NOT_CLOSABLE",
                format!("Subscription '{}' is not in a state to be closed", self.id),
            )),
        }
    }

    /// Pause an accepted subscription.
    pub fn pause(&mut self) -> Result<(), UseCaseError> {
        match self.status {
            SubscriptionStatus::Accepted => {
                let now = Utc::now();
                self.status = SubscriptionStatus::Paused;
                self.paused_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            SubscriptionStatus::Pending
            | SubscriptionStatus::Paused
            | SubscriptionStatus::Rejected
            | SubscriptionStatus::Closed => Err(UseCaseError::state_violation(
                "NOT_PAUSABLE",
                format!("Subscription '{}' is not in a state to be paused", self.id),
            )),
        }
    }

    /// Resume a paused subscription.
    pub fn resume(&mut self) -> Result<(), UseCaseError> {
        match self.status {
            SubscriptionStatus::Paused => {
                self.status = SubscriptionStatus::Accepted;
                self.paused_at = None;
                self.updated_at = Utc::now();
                Ok(())
            }
            SubscriptionStatus::Pending
            | SubscriptionStatus::Accepted
            | SubscriptionStatus::Rejected
            | SubscriptionStatus::Closed => Err(UseCaseError::state_violation(
                "NOT_PAUSED",
                format!("Subscription '{}' is not paused", self.id),
            )),
        }
    }

    /// Re-point the subscription to another plan. Transfer carries no
    /// status precondition; plan compatibility is checked by the use case.
    pub fn transfer_to(&mut self, target_plan: &Plan) {
        self.plan = target_plan.id.clone();
        self.api = target_plan.api.clone();
        self.updated_at = Utc::now();
    }

    fn already_processed(&self) -> UseCaseError {
        UseCaseError::conflict(
            "ALREADY_PROCESSED",
            format!("Subscription '{}' has already been processed", self.id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn pending() -> Subscription {
        testing::pending_subscription("sub-1", "app-1", "plan-1", "api-1")
    }

    #[test]
    fn test_accept_pending() {
        let mut sub = pending();
        sub.accept(None, None, "publisher-1").unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Accepted);
        assert!(sub.starting_at.is_some());
        assert!(sub.processed_at.is_some());
        assert_eq!(sub.processed_by.as_deref(), Some("publisher-1"));
    }

    #[test]
    fn test_accept_twice_fails() {
        let mut sub = pending();
        sub.accept(None, None, "publisher-1").unwrap();

        let err = sub.accept(None, None, "publisher-1").unwrap_err();
        assert_eq!(err.code(), "ALREADY_PROCESSED");
    }

    #[test]
    fn test_reject_stamps_closed_at() {
        let mut sub = pending();
        sub.reject(Some("no capacity".to_string()), "publisher-1")
            .unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Rejected);
        assert_eq!(sub.reason.as_deref(), Some("no capacity"));
        assert!(sub.closed_at.is_some());
        assert!(sub.is_terminal());
    }

    #[test]
    fn test_update_requires_accepted() {
        let mut sub = pending();
        let err = sub.update_terms(None, None, None).unwrap_err();
        assert_eq!(err.code(), "NOT_UPDATABLE");
    }

    #[test]
    fn test_update_client_id_override_requires_existing() {
        let mut sub = pending();
        sub.accept(None, None, "publisher-1").unwrap();

        sub.update_terms(None, None, Some("new-client".to_string()))
            .unwrap();
        assert_eq!(sub.client_id, None);

        sub.client_id = Some("old-client".to_string());
        sub.update_terms(None, None, Some("new-client".to_string()))
            .unwrap();
        assert_eq!(sub.client_id.as_deref(), Some("new-client"));
    }

    #[test]
    fn test_close_from_accepted_and_paused() {
        let mut sub = pending();
        sub.accept(None, None, "publisher-1").unwrap();
        sub.close().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Closed);
        assert!(sub.closed_at.is_some());

        let mut sub = pending();
        sub.accept(None, None, "publisher-1").unwrap();
        sub.pause().unwrap();
        sub.close().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Closed);
        assert!(sub.paused_at.is_none());
    }

    #[test]
    fn test_terminal_states_refuse_transitions() {
        let mut sub = pending();
        sub.reject(None, "publisher-1").unwrap();

        assert_eq!(sub.accept(None, None, "p").unwrap_err().code(), "ALREADY_PROCESSED");
        assert_eq!(sub.update_terms(None, None, None).unwrap_err().code(), "NOT_UPDATABLE");
        assert_eq!(sub.close().unwrap_err().code(), "NOT_CLOSABLE");
        assert_eq!(sub.pause().unwrap_err().code(), "NOT_PAUSABLE");
        assert_eq!(sub.resume().unwrap_err().code(), "NOT_PAUSED");
    }

    #[test]
    fn test_pause_resume_round_trip() {
        let mut sub = pending();
        sub.accept(None, None, "publisher-1").unwrap();

        sub.pause().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Paused);
        assert!(sub.paused_at.is_some());

        sub.resume().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Accepted);
        assert!(sub.paused_at.is_none());
    }

    #[test]
    fn test_resume_requires_paused() {
        let mut sub = pending();
        sub.accept(None, None, "publisher-1").unwrap();
        assert_eq!(sub.resume().unwrap_err().code(), "NOT_PAUSED");
    }

    #[test]
    fn test_transfer_has_no_status_gate() {
        let target = testing::plan(
            "plan-2",
            "api-1",
            crate::plan::PlanSecurity::ApiKey,
            crate::plan::PlanStatus::Published,
            crate::plan::PlanValidation::Manual,
        );

        // Even a pending subscription can be re-pointed.
        let mut sub = pending();
        sub.transfer_to(&target);
        assert_eq!(sub.plan, "plan-2");
        assert_eq!(sub.status, SubscriptionStatus::Pending);
    }
}
