//! Test Fixtures
//!
//! In-memory stores, a recording notification hub, and a unit of work that
//! mirrors the persistence guarantees of the MongoDB implementation,
//! including the non-terminal (application, plan) uniqueness enforced there
//! by the partial index.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::api_key::{ApiKey, ApiKeyStore};
use crate::application::{
    Application, ApplicationDirectory, ApplicationKind, ApplicationSettings, ApplicationStatus,
    SimpleAppSettings,
};
use crate::audit::AuditEntry;
use crate::group::GroupMembership;
use crate::notification::{HookTarget, NotificationHub, SubscriptionHook};
use crate::plan::{Plan, PlanDirectory, PlanSecurity, PlanStatus, PlanValidation};
use crate::shared::error::Result;
use crate::subscription::entity::Subscription;
use crate::subscription::operations::{
    CloseSubscriptionUseCase, CreateSubscriptionUseCase, DeleteSubscriptionUseCase,
    PauseSubscriptionUseCase, ProcessSubscriptionUseCase, ResumeSubscriptionUseCase,
    TransferSubscriptionUseCase, UpdateSubscriptionUseCase,
};
use crate::subscription::repository::SubscriptionStore;
use crate::usecase::{DomainEvent, UnitOfWork, UseCaseError, UseCaseResult};

pub(crate) fn pending_subscription(id: &str, app: &str, plan_id: &str, api: &str) -> Subscription {
    let mut subscription = Subscription::new(
        app,
        &plan(plan_id, api, PlanSecurity::ApiKey, PlanStatus::Published, PlanValidation::Manual),
        "user-1",
        None,
        None,
    );
    subscription.id = id.to_string();
    subscription
}

pub(crate) fn plan(
    id: &str,
    api: &str,
    security: PlanSecurity,
    status: PlanStatus,
    validation: PlanValidation,
) -> Plan {
    let now = Utc::now();
    Plan {
        id: id.to_string(),
        name: format!("{} plan", id),
        api: api.to_string(),
        status,
        security,
        validation,
        excluded_groups: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn application(id: &str, client_id: Option<&str>) -> Application {
    let now = Utc::now();
    Application {
        id: id.to_string(),
        name: format!("{} application", id),
        status: ApplicationStatus::Active,
        kind: ApplicationKind::Simple,
        settings: ApplicationSettings {
            app: Some(SimpleAppSettings {
                client_id: client_id.map(String::from),
            }),
            oauth: None,
        },
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn api_key(subscription_id: &str) -> ApiKey {
    ApiKey::generate(&pending_subscription(
        subscription_id,
        "app-1",
        "plan-1",
        "api-1",
    ))
}

/// Notification hub that records every trigger for assertions.
pub(crate) struct RecordingHub {
    pub triggered: Mutex<Vec<(SubscriptionHook, HookTarget)>>,
}

impl RecordingHub {
    pub fn new() -> Self {
        Self {
            triggered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NotificationHub for RecordingHub {
    async fn trigger(&self, hook: SubscriptionHook, target: HookTarget, _params: serde_json::Value) {
        self.triggered.lock().unwrap().push((hook, target));
    }
}

pub(crate) struct InMemoryPlans {
    plans: Mutex<Vec<Plan>>,
}

impl InMemoryPlans {
    pub fn new() -> Self {
        Self {
            plans: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, plan: Plan) {
        self.plans.lock().unwrap().push(plan);
    }
}

#[async_trait]
impl PlanDirectory for InMemoryPlans {
    async fn find_by_id(&self, id: &str) -> Result<Option<Plan>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}

pub(crate) struct InMemoryApplications {
    applications: Mutex<Vec<Application>>,
}

impl InMemoryApplications {
    pub fn new() -> Self {
        Self {
            applications: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, application: Application) {
        self.applications.lock().unwrap().push(application);
    }
}

#[async_trait]
impl ApplicationDirectory for InMemoryApplications {
    async fn find_by_id(&self, id: &str) -> Result<Option<Application>> {
        Ok(self
            .applications
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }
}

pub(crate) struct InMemoryGroups {
    memberships: Mutex<Vec<(String, String)>>,
}

impl InMemoryGroups {
    pub fn new() -> Self {
        Self {
            memberships: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, subject_id: &str, group_id: &str) {
        self.memberships
            .lock()
            .unwrap()
            .push((subject_id.to_string(), group_id.to_string()));
    }
}

#[async_trait]
impl GroupMembership for InMemoryGroups {
    async fn groups_of(&self, subject_id: &str) -> Result<HashSet<String>> {
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == subject_id)
            .map(|(_, g)| g.clone())
            .collect())
    }
}

pub(crate) struct InMemorySubscriptions {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptions {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, subscription: Subscription) {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(existing) = subscriptions.iter_mut().find(|s| s.id == subscription.id) {
            *existing = subscription;
        } else {
            subscriptions.push(subscription);
        }
    }

    pub fn remove(&self, id: &str) {
        self.subscriptions.lock().unwrap().retain(|s| s.id != id);
    }

    pub fn get(&self, id: &str) -> Option<Subscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn all(&self) -> Vec<Subscription> {
        self.subscriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptions {
    async fn find_by_id(&self, id: &str) -> Result<Option<Subscription>> {
        Ok(self.get(id))
    }

    async fn find_by_application_and_api(
        &self,
        application_id: &str,
        api_id: &str,
    ) -> Result<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.application == application_id && s.api == api_id)
            .cloned()
            .collect())
    }
}

pub(crate) struct InMemoryApiKeys {
    keys: Mutex<Vec<ApiKey>>,
}

impl InMemoryApiKeys {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, key: ApiKey) {
        let mut keys = self.keys.lock().unwrap();
        if let Some(existing) = keys.iter_mut().find(|k| k.id == key.id) {
            *existing = key;
        } else {
            keys.push(key);
        }
    }

    pub fn remove_by_subscription(&self, subscription_id: &str) {
        self.keys
            .lock()
            .unwrap()
            .retain(|k| k.subscription != subscription_id);
    }

    pub fn all(&self) -> Vec<ApiKey> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeys {
    async fn find_by_subscription(&self, subscription_id: &str) -> Result<Vec<ApiKey>> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.subscription == subscription_id)
            .cloned()
            .collect())
    }
}

/// Unit of work over the in-memory stores. Mirrors the MongoDB guarantees:
/// read-your-writes through the shared stores and commit_create refusing a
/// second non-terminal subscription for the same (application, plan).
pub(crate) struct InMemoryUnitOfWork {
    subscriptions: Arc<InMemorySubscriptions>,
    api_keys: Arc<InMemoryApiKeys>,
    pub events: Mutex<Vec<String>>,
    pub audits: Mutex<Vec<String>>,
}

impl InMemoryUnitOfWork {
    pub fn new(subscriptions: Arc<InMemorySubscriptions>, api_keys: Arc<InMemoryApiKeys>) -> Self {
        Self {
            subscriptions,
            api_keys,
            events: Mutex::new(Vec::new()),
            audits: Mutex::new(Vec::new()),
        }
    }

    /// Insert a row without the uniqueness guard, as if it had been written
    /// by a concurrent process.
    pub fn seed_unchecked(&self, subscription: Subscription) {
        self.subscriptions.insert(subscription);
    }

    fn record<E: DomainEvent>(&self, event: &E, audit: &AuditEntry) {
        self.events
            .lock()
            .unwrap()
            .push(event.event_type().to_string());
        self.audits.lock().unwrap().push(audit.event.clone());
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
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
        let duplicate = self.subscriptions.all().into_iter().any(|s| {
            s.application == subscription.application
                && s.plan == subscription.plan
                && !s.is_terminal()
        });
        if duplicate {
            return UseCaseResult::failure(UseCaseError::conflict(
                "PLAN_ALREADY_SUBSCRIBED",
                format!(
                    "Application '{}' already holds a subscription to plan '{}'",
                    subscription.application, subscription.plan
                ),
            ));
        }

        self.subscriptions.insert(subscription.clone());
        for key in keys {
            self.api_keys.insert(key.clone());
        }
        self.record(&event, &audit);
        UseCaseResult::success(event)
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
        self.subscriptions.insert(subscription.clone());
        for key in keys {
            self.api_keys.insert(key.clone());
        }
        self.record(&event, &audit);
        UseCaseResult::success(event)
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
        self.subscriptions.remove(&subscription.id);
        self.api_keys.remove_by_subscription(&subscription.id);
        self.record(&event, &audit);
        UseCaseResult::success(event)
    }
}

/// Bundles the collaborators every operation test needs.
pub(crate) struct TestHarness {
    pub plans: Arc<InMemoryPlans>,
    pub applications: Arc<InMemoryApplications>,
    pub groups: Arc<InMemoryGroups>,
    pub subscriptions: Arc<InMemorySubscriptions>,
    pub api_keys: Arc<InMemoryApiKeys>,
    pub uow: Arc<InMemoryUnitOfWork>,
    pub hub: Arc<RecordingHub>,
}

impl TestHarness {
    pub fn new() -> Self {
        let subscriptions = Arc::new(InMemorySubscriptions::new());
        let api_keys = Arc::new(InMemoryApiKeys::new());
        Self {
            plans: Arc::new(InMemoryPlans::new()),
            applications: Arc::new(InMemoryApplications::new()),
            groups: Arc::new(InMemoryGroups::new()),
            uow: Arc::new(InMemoryUnitOfWork::new(
                subscriptions.clone(),
                api_keys.clone(),
            )),
            subscriptions,
            api_keys,
            hub: Arc::new(RecordingHub::new()),
        }
    }

    pub fn create_use_case(&self) -> CreateSubscriptionUseCase<InMemoryUnitOfWork> {
        CreateSubscriptionUseCase::new(
            self.uow.clone(),
            self.plans.clone(),
            self.applications.clone(),
            self.groups.clone(),
            self.subscriptions.clone(),
            self.hub.clone(),
        )
    }

    pub fn process_use_case(&self) -> ProcessSubscriptionUseCase<InMemoryUnitOfWork> {
        ProcessSubscriptionUseCase::new(
            self.uow.clone(),
            self.subscriptions.clone(),
            self.plans.clone(),
            self.hub.clone(),
        )
    }

    pub fn update_use_case(&self) -> UpdateSubscriptionUseCase<InMemoryUnitOfWork> {
        UpdateSubscriptionUseCase::new(
            self.uow.clone(),
            self.subscriptions.clone(),
            self.api_keys.clone(),
        )
    }

    pub fn close_use_case(&self) -> CloseSubscriptionUseCase<InMemoryUnitOfWork> {
        CloseSubscriptionUseCase::new(
            self.uow.clone(),
            self.subscriptions.clone(),
            self.api_keys.clone(),
            self.hub.clone(),
        )
    }

    pub fn pause_use_case(&self) -> PauseSubscriptionUseCase<InMemoryUnitOfWork> {
        PauseSubscriptionUseCase::new(
            self.uow.clone(),
            self.subscriptions.clone(),
            self.api_keys.clone(),
            self.hub.clone(),
        )
    }

    pub fn resume_use_case(&self) -> ResumeSubscriptionUseCase<InMemoryUnitOfWork> {
        ResumeSubscriptionUseCase::new(
            self.uow.clone(),
            self.subscriptions.clone(),
            self.api_keys.clone(),
            self.hub.clone(),
        )
    }

    pub fn transfer_use_case(&self) -> TransferSubscriptionUseCase<InMemoryUnitOfWork> {
        TransferSubscriptionUseCase::new(
            self.uow.clone(),
            self.subscriptions.clone(),
            self.plans.clone(),
            self.api_keys.clone(),
            self.hub.clone(),
        )
    }

    pub fn delete_use_case(&self) -> DeleteSubscriptionUseCase<InMemoryUnitOfWork> {
        DeleteSubscriptionUseCase::new(
            self.uow.clone(),
            self.subscriptions.clone(),
            self.api_keys.clone(),
        )
    }
}
