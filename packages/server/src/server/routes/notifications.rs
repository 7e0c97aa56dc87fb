//! Notification inbox routes.

use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::json;

use crate::common::{LendingError, NotificationId};
use crate::domains::notifications::models::Notification;
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;
use crate::server::routes::ApiError;

/// GET /api/notifications
pub async fn list_notifications(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state
        .deps
        .notifications
        .list_for_user(auth.user_id)
        .await
        .map_err(LendingError::from)?;
    Ok(Json(notifications))
}

/// GET /api/notifications/unread
pub async fn unread_notifications(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state
        .deps
        .notifications
        .list_unread(auth.user_id)
        .await
        .map_err(LendingError::from)?;
    Ok(Json(notifications))
}

/// PUT /api/notifications/:id/read
pub async fn mark_read(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<Notification>, ApiError> {
    let notification = state
        .deps
        .notifications
        .mark_read(id, auth.user_id)
        .await
        .map_err(LendingError::from)?;
    Ok(Json(notification))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state
        .deps
        .notifications
        .mark_all_read(auth.user_id)
        .await
        .map_err(LendingError::from)?;
    Ok(Json(json!({ "updated": updated })))
}
