//! Application Entity
//!
//! An application is the consumer side of a subscription. Applications are
//! owned by the application management service; this engine reads them to
//! check archival status and derive the client_id stamped on new
//! subscriptions.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Active,
    Archived,
}

/// Application kind. Simple applications carry a manually entered client_id;
/// every other kind gets one from its registered OAuth client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationKind {
    Simple,
    Browser,
    Web,
    Native,
    BackendToBackend,
}

/// Settings for a simple (non-OAuth) application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleAppSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

/// Settings for an application backed by a registered OAuth client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthClientSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<SimpleAppSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthClientSettings>,
}

/// Application entity (read-only reference data for this engine)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    pub status: ApplicationStatus,

    #[serde(rename = "type")]
    pub kind: ApplicationKind,

    #[serde(default)]
    pub settings: ApplicationSettings,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Derive the client_id for a subscription, depending on the
    /// application kind.
    pub fn client_id(&self) -> Option<&str> {
        match self.kind {
            ApplicationKind::Simple => self
                .settings
                .app
                .as_ref()
                .and_then(|s| s.client_id.as_deref()),
            _ => self
                .settings
                .oauth
                .as_ref()
                .and_then(|s| s.client_id.as_deref()),
        }
    }

    pub fn is_archived(&self) -> bool {
        self.status == ApplicationStatus::Archived
    }
}
