// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. Domain code
// talks to push delivery through `BasePushNotificationService` so tests can
// substitute a recording mock and deployments without FCM credentials can
// run with the no-op implementation.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

// =============================================================================
// Push Notification Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BasePushNotificationService: Send + Sync {
    /// Send a push notification to a device registration token.
    async fn send_notification(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()>;
}

/// Push implementation for deployments without FCM credentials: logs and
/// drops every notification.
pub struct NoopPushService;

#[async_trait]
impl BasePushNotificationService for NoopPushService {
    async fn send_notification(
        &self,
        device_token: &str,
        title: &str,
        _body: &str,
        _data: serde_json::Value,
    ) -> Result<()> {
        debug!(token = %device_token, title = %title, "push disabled; dropping notification");
        Ok(())
    }
}
