//! Entitlement Cascade
//!
//! Keeps the keys bound to a subscription consistent with every lifecycle
//! transition. Each function is pure: it takes the current key set and
//! returns only the keys that changed, so the unit of work can persist the
//! subscription transition and the key mutations in one transaction.

use chrono::{DateTime, Utc};

use super::entity::ApiKey;
use crate::plan::{Plan, PlanSecurity};
use crate::subscription::entity::Subscription;

/// On accept: API_KEY plans get exactly one generated key; every other
/// security scheme authenticates without key material.
pub fn on_accept(plan: &Plan, subscription: &Subscription) -> Vec<ApiKey> {
    match plan.security {
        PlanSecurity::ApiKey => vec![ApiKey::generate(subscription)],
        PlanSecurity::KeyLess | PlanSecurity::Oauth2 | PlanSecurity::Jwt => Vec::new(),
    }
}

/// On update: clamp live key expiries to the subscription's new ending_at.
///
/// Shrink-only: a key whose expiry already falls before ending_at keeps it,
/// and pushing ending_at later never extends a key.
pub fn on_update(subscription: &Subscription, keys: Vec<ApiKey>) -> Vec<ApiKey> {
    let Some(ending_at) = subscription.ending_at else {
        return Vec::new();
    };

    keys.into_iter()
        .filter(|k| !k.revoked)
        .filter(|k| k.expire_at.map_or(true, |e| e > ending_at))
        .map(|mut k| {
            k.expire_at = Some(ending_at);
            k.touch();
            k
        })
        .collect()
}

/// On close: revoke every key not already revoked. Revocation is silent at
/// the key level; only the subscription-level notification fires.
pub fn on_close(closed_at: DateTime<Utc>, keys: Vec<ApiKey>) -> Vec<ApiKey> {
    keys.into_iter()
        .filter(|k| !k.revoked)
        .map(|mut k| {
            k.revoked = true;
            k.revoked_at = Some(closed_at);
            k.expire_at = Some(closed_at);
            k.touch();
            k
        })
        .collect()
}

/// On pause: flag every live key as paused.
pub fn on_pause(now: DateTime<Utc>, keys: Vec<ApiKey>) -> Vec<ApiKey> {
    keys.into_iter()
        .filter(|k| k.is_live(now))
        .map(|mut k| {
            k.paused = true;
            k.touch();
            k
        })
        .collect()
}

/// On resume: inverse of [`on_pause`].
pub fn on_resume(now: DateTime<Utc>, keys: Vec<ApiKey>) -> Vec<ApiKey> {
    keys.into_iter()
        .filter(|k| k.is_live(now))
        .map(|mut k| {
            k.paused = false;
            k.touch();
            k
        })
        .collect()
}

/// On transfer: re-point every bound key to the target plan.
pub fn on_transfer(target_plan: &Plan, keys: Vec<ApiKey>) -> Vec<ApiKey> {
    keys.into_iter()
        .map(|mut k| {
            k.plan = target_plan.id.clone();
            k.touch();
            k
        })
        .collect()
}
