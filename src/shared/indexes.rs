//! Index Bootstrap
//!
//! Creates the indexes the engine relies on. Run once at startup; index
//! creation is idempotent on the MongoDB side.

use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};
use tracing::info;

use crate::api_key::ApiKey;
use crate::audit::AuditEntry;
use crate::subscription::Subscription;
use crate::usecase::OutboxEvent;

/// Create all indexes. The unique partial index on subscriptions is load
/// bearing: it is what turns a concurrent duplicate create into a conflict
/// instead of a second non-terminal row.
pub async fn initialize_indexes(db: &Database) -> crate::shared::error::Result<()> {
    let subscriptions = db.collection::<Subscription>("subscriptions");

    // At most one non-terminal subscription per (application, plan).
    subscriptions
        .create_index(
            IndexModel::builder()
                .keys(doc! { "application": 1, "plan": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(doc! {
                            "status": { "$in": ["PENDING", "ACCEPTED", "PAUSED"] }
                        })
                        .build(),
                )
                .build(),
        )
        .await?;

    subscriptions
        .create_index(
            IndexModel::builder()
                .keys(doc! { "application": 1, "api": 1 })
                .build(),
        )
        .await?;

    let api_keys = db.collection::<ApiKey>("api_keys");
    api_keys
        .create_index(
            IndexModel::builder()
                .keys(doc! { "subscription": 1 })
                .build(),
        )
        .await?;
    api_keys
        .create_index(
            IndexModel::builder()
                .keys(doc! { "key": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;

    let events = db.collection::<OutboxEvent>("events");
    events
        .create_index(IndexModel::builder().keys(doc! { "time": 1 }).build())
        .await?;

    let audit_logs = db.collection::<AuditEntry>("audit_logs");
    audit_logs
        .create_index(
            IndexModel::builder()
                .keys(doc! { "apiId": 1, "performedAt": -1 })
                .build(),
        )
        .await?;

    info!("Database indexes initialized");
    Ok(())
}
