//! Use Case Errors
//!
//! Categorized error types for lifecycle operation failures.
//! Errors are categorized by kind to enable consistent HTTP status mapping
//! by whatever transport layer embeds this engine.
//!
//! # Creating Errors with Details
//!
//! Use the `details!` macro for convenient error creation:
//!
//! ```ignore
//! use gateway_platform::usecase::{UseCaseError, details};
//!
//! // Simple error
//! UseCaseError::policy_violation("PLAN_RESTRICTED", "Plan is restricted");
//!
//! // Error with details
//! UseCaseError::conflict_with_details(
//!     "PLAN_ALREADY_SUBSCRIBED",
//!     "Plan is already subscribed",
//!     details!{ "plan" => plan_id },
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::error::PlatformError;

/// Macro for creating error detail maps.
///
/// # Example
///
/// ```ignore
/// use gateway_platform::usecase::details;
///
/// let details = details! {
///     "plan" => plan_id,
///     "application" => application_id
/// };
/// ```
#[macro_export]
macro_rules! details {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), serde_json::json!($value));
        )+
        map
    }};
}

/// Categorized error types for lifecycle operation failures.
///
/// Each variant maps to a specific HTTP status code:
/// - `NotFound` -> 404 Not Found
/// - `Conflict` -> 409 Conflict
/// - `StateViolation` -> 409 Conflict
/// - `PolicyViolation` -> 400 Bad Request
/// - `Infrastructure` -> 500 Internal Server Error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    /// Subscription, plan, or application id does not resolve.
    /// Maps to HTTP 404 Not Found.
    NotFound {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// The request collides with existing state (already processed,
    /// already subscribed, exclusive security scheme taken).
    /// Maps to HTTP 409 Conflict.
    Conflict {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// The subscription's current status does not allow the transition.
    /// Maps to HTTP 409 Conflict.
    StateViolation {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// An admission rule rejected the request (plan not subscribable,
    /// application archived, client id missing, ...).
    /// Maps to HTTP 400 Bad Request.
    PolicyViolation {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Storage or a collaborator failed. Transport details are logged,
    /// never surfaced to callers.
    /// Maps to HTTP 500 Internal Server Error.
    Infrastructure {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },
}

impl UseCaseError {
    /// Create a not found error.
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Create a not found error with details.
    pub fn not_found_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Create a conflict error.
    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Create a conflict error with details.
    pub fn conflict_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Create a state violation error.
    pub fn state_violation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StateViolation {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Create a policy violation error.
    pub fn policy_violation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PolicyViolation {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Create a policy violation with details.
    pub fn policy_violation_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::PolicyViolation {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Create an infrastructure error. The generic `TECHNICAL_ERROR` code
    /// keeps storage/transport details out of the caller-visible contract.
    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure {
            code: "TECHNICAL_ERROR".to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> &str {
        match self {
            Self::NotFound { code, .. } => code,
            Self::Conflict { code, .. } => code,
            Self::StateViolation { code, .. } => code,
            Self::PolicyViolation { code, .. } => code,
            Self::Infrastructure { code, .. } => code,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message, .. } => message,
            Self::Conflict { message, .. } => message,
            Self::StateViolation { message, .. } => message,
            Self::PolicyViolation { message, .. } => message,
            Self::Infrastructure { message, .. } => message,
        }
    }

    /// Get the suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::StateViolation { .. } => 409,
            Self::PolicyViolation { .. } => 400,
            Self::Infrastructure { .. } => 500,
        }
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}

impl From<PlatformError> for UseCaseError {
    fn from(err: PlatformError) -> Self {
        tracing::error!(error = %err, "Infrastructure failure in use case");
        Self::infrastructure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = UseCaseError::not_found("SUBSCRIPTION_NOT_FOUND", "Subscription not found");
        assert_eq!(err.code(), "SUBSCRIPTION_NOT_FOUND");
        assert_eq!(err.message(), "Subscription not found");
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_conflict_error() {
        let err = UseCaseError::conflict("ALREADY_PROCESSED", "Subscription already processed");
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_state_violation_error() {
        let err = UseCaseError::state_violation("NOT_CLOSABLE", "Subscription cannot be closed");
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_policy_violation_error() {
        let err = UseCaseError::policy_violation("PLAN_RESTRICTED", "Plan is restricted");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_infrastructure_error_hides_transport() {
        let err = UseCaseError::infrastructure("connection reset");
        assert_eq!(err.code(), "TECHNICAL_ERROR");
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn test_conflict_with_details() {
        let err = UseCaseError::conflict_with_details(
            "PLAN_ALREADY_SUBSCRIBED",
            "Plan is already subscribed",
            details! { "plan" => "plan-1", "application" => "app-1" },
        );

        assert_eq!(err.code(), "PLAN_ALREADY_SUBSCRIBED");
        if let UseCaseError::Conflict { details, .. } = err {
            assert_eq!(details.get("plan"), Some(&serde_json::json!("plan-1")));
        } else {
            panic!("Expected Conflict");
        }
    }

    #[test]
    fn test_details_macro_empty() {
        let details: HashMap<String, serde_json::Value> = details!();
        assert!(details.is_empty());
    }

    #[test]
    fn test_details_macro_multiple() {
        let plan = "plan-1";
        let details = details! {
            "plan" => plan,
            "count" => 3,
        };
        assert_eq!(details.get("plan"), Some(&serde_json::json!("plan-1")));
        assert_eq!(details.get("count"), Some(&serde_json::json!(3)));
    }
}
