//! Server dependencies (using traits for testability)
//!
//! Central dependency container handed to effects and routes. Every store
//! and external service sits behind a trait so tests can swap in the
//! in-memory set from `test_dependencies`.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use fcm::FcmService;

use crate::domains::borrowing::store::{BorrowStore, PgBorrowStore};
use crate::domains::notifications::store::{NotificationStore, PgNotificationStore};
use crate::domains::tools::store::{PgToolStore, ToolStore};
use crate::domains::users::store::{PgUserStore, UserStore};
use crate::kernel::traits::BasePushNotificationService;

// =============================================================================
// FcmService Adapter (implements BasePushNotificationService trait)
// =============================================================================

/// Wrapper around FcmService that implements BasePushNotificationService
pub struct FcmAdapter(pub Arc<FcmService>);

impl FcmAdapter {
    pub fn new(service: Arc<FcmService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BasePushNotificationService for FcmAdapter {
    async fn send_notification(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()> {
        self.0
            .send_notification(device_token, title, body, Some(data))
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to routes and effects
#[derive(Clone)]
pub struct ServerDeps {
    pub users: Arc<dyn UserStore>,
    pub tools: Arc<dyn ToolStore>,
    pub requests: Arc<dyn BorrowStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub push: Arc<dyn BasePushNotificationService>,
    /// Present when backed by Postgres; used by the health endpoint.
    pub db_pool: Option<PgPool>,
}

impl ServerDeps {
    /// Wire the Postgres-backed dependency set.
    pub fn postgres(pool: PgPool, push: Arc<dyn BasePushNotificationService>) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            tools: Arc::new(PgToolStore::new(pool.clone())),
            requests: Arc::new(PgBorrowStore::new(pool.clone())),
            notifications: Arc::new(PgNotificationStore::new(pool.clone())),
            push,
            db_pool: Some(pool),
        }
    }
}
