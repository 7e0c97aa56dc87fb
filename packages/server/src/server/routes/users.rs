//! Participant registry routes.

use axum::extract::{Extension, Path};
use axum::Json;
use serde::Deserialize;

use crate::common::{LendingError, UserId};
use crate::domains::users::actions;
use crate::domains::users::models::User;
use crate::domains::users::store::NewUser;
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;
use crate::server::routes::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterUserBody {
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub device_token: Option<String>,
}

/// POST /api/users
pub async fn register_user(
    Extension(state): Extension<AxumAppState>,
    Json(body): Json<RegisterUserBody>,
) -> Result<Json<User>, ApiError> {
    let user = actions::register_user(
        NewUser {
            full_name: body.full_name,
            email: body.email,
            phone_number: body.phone_number,
            latitude: body.latitude,
            longitude: body.longitude,
            address: body.address,
            device_token: body.device_token,
        },
        state.deps.users.as_ref(),
    )
    .await?;
    Ok(Json(user))
}

/// GET /api/users/me
pub async fn current_user(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = state
        .deps
        .users
        .find_by_id(auth.user_id)
        .await
        .map_err(LendingError::from)?;
    Ok(Json(user))
}

/// GET /api/users/:id
pub async fn get_user(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .deps
        .users
        .find_by_id(id)
        .await
        .map_err(LendingError::from)?;
    Ok(Json(user))
}
