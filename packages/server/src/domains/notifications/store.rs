//! Storage contract for the in-app notification inbox.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::{NotificationId, StoreError, UserId};
use crate::domains::notifications::models::Notification;

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: Notification) -> Result<Notification, StoreError>;

    /// All notifications for a user, newest first.
    async fn list_for_user(&self, user: UserId) -> Result<Vec<Notification>, StoreError>;

    /// Unread notifications for a user, newest first.
    async fn list_unread(&self, user: UserId) -> Result<Vec<Notification>, StoreError>;

    /// Mark one of the user's notifications read. Errors if the row does
    /// not exist or belongs to someone else.
    async fn mark_read(&self, id: NotificationId, user: UserId)
        -> Result<Notification, StoreError>;

    /// Mark all of the user's notifications read; returns how many changed.
    async fn mark_all_read(&self, user: UserId) -> Result<u64, StoreError>;
}

/// Postgres-backed `NotificationStore`.
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert(&self, notification: Notification) -> Result<Notification, StoreError> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (
                id, user_id, kind, title, message, related_request, is_read, created_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.kind)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.related_request)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Notification>, StoreError> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn list_unread(&self, user: UserId) -> Result<Vec<Notification>, StoreError> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications
             WHERE user_id = $1 AND is_read = false
             ORDER BY created_at DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        user: UserId,
    ) -> Result<Notification, StoreError> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = true
             WHERE id = $1 AND user_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotificationMissing)
    }

    async fn mark_all_read(&self, user: UserId) -> Result<u64, StoreError> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false")
                .bind(user)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
