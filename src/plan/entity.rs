//! Plan Entity
//!
//! A plan is a published access offer on an API: a security scheme, a
//! validation mode, and optional group exclusions. Plans are owned by the
//! plan management service; this engine reads them to admit or refuse
//! subscription requests.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Plan publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Staging,
    Published,
    Deprecated,
    Closed,
}

/// Security scheme enforced by the gateway for this plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanSecurity {
    KeyLess,
    ApiKey,
    Oauth2,
    Jwt,
}

impl PlanSecurity {
    /// OAuth2 and JWT plans both authenticate through the application's
    /// client_id, so at most one of them may be active per application.
    pub fn is_client_credentials(&self) -> bool {
        matches!(self, Self::Oauth2 | Self::Jwt)
    }
}

/// How subscription requests against this plan are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanValidation {
    /// Requests are accepted immediately on creation.
    Auto,
    /// Requests stay pending until a publisher processes them.
    Manual,
}

/// Plan entity (read-only reference data for this engine)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(rename = "_id")]
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// API this plan grants access to
    pub api: String,

    pub status: PlanStatus,

    pub security: PlanSecurity,

    pub validation: PlanValidation,

    /// Groups whose members may not subscribe to this plan
    #[serde(default)]
    pub excluded_groups: Vec<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}
