//! Unit of Work
//!
//! Atomic commit of a subscription transition, its cascaded key mutations,
//! the domain event (outbox), and the audit entry within a single MongoDB
//! transaction.

use async_trait::async_trait;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, to_document},
    Client, ClientSession, Database,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::domain_event::DomainEvent;
use super::error::UseCaseError;
use super::result::UseCaseResult;
use crate::api_key::ApiKey;
use crate::audit::AuditEntry;
use crate::subscription::entity::Subscription;

/// Unit of Work for subscription lifecycle operations.
///
/// Ensures that the subscription write, its key cascade, the domain event,
/// and the audit entry are committed atomically.
///
/// **This is the ONLY way to create a successful `UseCaseResult`.**
/// The `UseCaseResult::success()` method is crate-private, so use cases
/// must go through a UnitOfWork to return success. This guarantees that:
/// - Domain events are always emitted when state changes
/// - Audit entries are always created for operations
/// - Subscription state and its key set stay consistent (atomic commit)
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Insert a brand-new subscription together with any initial keys.
    ///
    /// The insert is conditional: the unique partial index on
    /// `(application, plan)` over non-terminal statuses turns a concurrent
    /// duplicate create into a `PLAN_ALREADY_SUBSCRIBED` conflict instead of
    /// a second row.
    async fn commit_create<E>(
        &self,
        subscription: &Subscription,
        keys: &[ApiKey],
        event: E,
        audit: AuditEntry,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static;

    /// Persist a subscription transition plus every cascaded key mutation.
    async fn commit<E>(
        &self,
        subscription: &Subscription,
        keys: &[ApiKey],
        event: E,
        audit: AuditEntry,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static;

    /// Remove a subscription and every key bound to it.
    async fn commit_delete<E>(
        &self,
        subscription: &Subscription,
        event: E,
        audit: AuditEntry,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static;
}

/// Outbox row written in the same transaction as the aggregate change.
/// A separate relay publishes these to downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEvent {
    #[serde(rename = "_id")]
    pub id: String,
    pub event_type: String,
    pub spec_version: String,
    pub source: String,
    pub subject: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub time: DateTime<Utc>,
    pub data: serde_json::Value,
    pub message_group: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    pub principal_id: String,
}

impl OutboxEvent {
    pub fn from_domain_event<E: DomainEvent>(event: &E) -> Self {
        let data: serde_json::Value =
            serde_json::from_str(&event.to_data_json()).unwrap_or(serde_json::json!({}));

        Self {
            id: event.event_id().to_string(),
            event_type: event.event_type().to_string(),
            spec_version: event.spec_version().to_string(),
            source: event.source().to_string(),
            subject: event.subject().to_string(),
            time: event.time(),
            data,
            message_group: event.message_group().to_string(),
            correlation_id: event.correlation_id().to_string(),
            causation_id: event.causation_id().map(String::from),
            principal_id: event.principal_id().to_string(),
        }
    }
}

/// MongoDB implementation of UnitOfWork using multi-document transactions.
///
/// # Requirements:
/// - MongoDB 4.0+ (for multi-document transactions)
/// - Replica set deployment (transactions require replica set)
#[derive(Clone)]
pub struct MongoUnitOfWork {
    client: Client,
    database: Database,
}

impl MongoUnitOfWork {
    pub fn new(client: Client, database: Database) -> Self {
        Self { client, database }
    }

    async fn start_transaction(&self) -> Result<ClientSession, UseCaseError> {
        let mut session = match self.client.start_session().await {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to start MongoDB session: {}", e);
                return Err(UseCaseError::infrastructure(format!(
                    "Failed to start session: {}",
                    e
                )));
            }
        };

        if let Err(e) = session.start_transaction().await {
            error!("Failed to start transaction: {}", e);
            return Err(UseCaseError::infrastructure(format!(
                "Failed to start transaction: {}",
                e
            )));
        }

        Ok(session)
    }

    /// Write the outbox event and audit entry, then commit.
    async fn finish<E>(
        &self,
        mut session: ClientSession,
        event: E,
        audit: AuditEntry,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
    {
        let outbox_event = OutboxEvent::from_domain_event(&event);
        let events_collection = self.database.collection::<OutboxEvent>("events");
        if let Err(e) = events_collection
            .insert_one(&outbox_event)
            .session(&mut session)
            .await
        {
            let _ = session.abort_transaction().await;
            error!("Failed to insert event: {}", e);
            return UseCaseResult::failure(UseCaseError::infrastructure(format!(
                "Failed to insert event: {}",
                e
            )));
        }

        let audit_collection = self.database.collection::<AuditEntry>("audit_logs");
        if let Err(e) = audit_collection
            .insert_one(&audit)
            .session(&mut session)
            .await
        {
            let _ = session.abort_transaction().await;
            error!("Failed to insert audit entry: {}", e);
            return UseCaseResult::failure(UseCaseError::infrastructure(format!(
                "Failed to insert audit entry: {}",
                e
            )));
        }

        if let Err(e) = session.commit_transaction().await {
            error!("Failed to commit transaction: {}", e);
            return UseCaseResult::failure(UseCaseError::infrastructure(format!(
                "Failed to commit transaction: {}",
                e
            )));
        }

        debug!(
            event_id = event.event_id(),
            event_type = event.event_type(),
            "Successfully committed transaction"
        );

        UseCaseResult::success(event)
    }

    /// Upsert the cascaded key mutations inside the transaction.
    async fn persist_keys(
        &self,
        session: &mut ClientSession,
        keys: &[ApiKey],
    ) -> Result<(), UseCaseError> {
        let collection = self.database.collection::<ApiKey>("api_keys");
        for key in keys {
            let result = collection
                .replace_one(doc! { "_id": &key.id }, key)
                .upsert(true)
                .session(&mut *session)
                .await;
            if let Err(e) = result {
                let _ = session.abort_transaction().await;
                error!("Failed to persist api key: {}", e);
                return Err(UseCaseError::infrastructure(format!(
                    "Failed to persist api key: {}",
                    e
                )));
            }
        }
        Ok(())
    }
}

/// MongoDB duplicate-key write error (unique index violation).
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(we))
            if we.code == 11000
    )
}

#[async_trait]
impl UnitOfWork for MongoUnitOfWork {
    async fn commit_create<E>(
        &self,
        subscription: &Subscription,
        keys: &[ApiKey],
        event: E,
        audit: AuditEntry,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
    {
        let mut session = match self.start_transaction().await {
            Ok(s) => s,
            Err(e) => return UseCaseResult::failure(e),
        };

        // Conditional insert: the partial unique index on (application, plan)
        // rejects a second non-terminal subscription for the same pair.
        let collection = self.database.collection::<Subscription>("subscriptions");
        if let Err(e) = collection
            .insert_one(subscription)
            .session(&mut session)
            .await
        {
            let _ = session.abort_transaction().await;
            if is_duplicate_key(&e) {
                return UseCaseResult::failure(UseCaseError::conflict(
                    "PLAN_ALREADY_SUBSCRIBED",
                    format!(
                        "Application '{}' already holds a subscription to plan '{}'",
                        subscription.application, subscription.plan
                    ),
                ));
            }
            error!("Failed to insert subscription: {}", e);
            return UseCaseResult::failure(UseCaseError::infrastructure(format!(
                "Failed to insert subscription: {}",
                e
            )));
        }

        if let Err(e) = self.persist_keys(&mut session, keys).await {
            return UseCaseResult::failure(e);
        }

        self.finish(session, event, audit).await
    }

    async fn commit<E>(
        &self,
        subscription: &Subscription,
        keys: &[ApiKey],
        event: E,
        audit: AuditEntry,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
    {
        let mut session = match self.start_transaction().await {
            Ok(s) => s,
            Err(e) => return UseCaseResult::failure(e),
        };

        let subscription_doc = match to_document(subscription) {
            Ok(d) => d,
            Err(e) => {
                let _ = session.abort_transaction().await;
                return UseCaseResult::failure(UseCaseError::infrastructure(format!(
                    "Failed to serialize subscription: {}",
                    e
                )));
            }
        };

        let collection = self
            .database
            .collection::<mongodb::bson::Document>("subscriptions");
        let update_result = collection
            .update_one(
                doc! { "_id": &subscription.id },
                doc! { "$set": &subscription_doc },
            )
            .upsert(true)
            .session(&mut session)
            .await;

        if let Err(e) = update_result {
            let _ = session.abort_transaction().await;
            error!("Failed to persist subscription: {}", e);
            return UseCaseResult::failure(UseCaseError::infrastructure(format!(
                "Failed to persist subscription: {}",
                e
            )));
        }

        if let Err(e) = self.persist_keys(&mut session, keys).await {
            return UseCaseResult::failure(e);
        }

        self.finish(session, event, audit).await
    }

    async fn commit_delete<E>(
        &self,
        subscription: &Subscription,
        event: E,
        audit: AuditEntry,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
    {
        let mut session = match self.start_transaction().await {
            Ok(s) => s,
            Err(e) => return UseCaseResult::failure(e),
        };

        let collection = self.database.collection::<Subscription>("subscriptions");
        if let Err(e) = collection
            .delete_one(doc! { "_id": &subscription.id })
            .session(&mut session)
            .await
        {
            let _ = session.abort_transaction().await;
            error!("Failed to delete subscription: {}", e);
            return UseCaseResult::failure(UseCaseError::infrastructure(format!(
                "Failed to delete subscription: {}",
                e
            )));
        }

        let keys_collection = self.database.collection::<ApiKey>("api_keys");
        if let Err(e) = keys_collection
            .delete_many(doc! { "subscription": &subscription.id })
            .session(&mut session)
            .await
        {
            let _ = session.abort_transaction().await;
            error!("Failed to delete api keys: {}", e);
            return UseCaseResult::failure(UseCaseError::infrastructure(format!(
                "Failed to delete api keys: {}",
                e
            )));
        }

        self.finish(session, event, audit).await
    }
}
