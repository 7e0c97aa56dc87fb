//! Register user action

use tracing::info;

use crate::common::LendingError;
use crate::domains::users::models::User;
use crate::domains::users::store::{NewUser, UserStore};

/// Register a new participant.
///
/// Credential handling happens upstream; this only records the profile
/// the lending core needs (names for notifications, contact for accepted
/// requests, location for discovery).
pub async fn register_user(user: NewUser, store: &dyn UserStore) -> Result<User, LendingError> {
    if user.full_name.trim().is_empty() {
        return Err(LendingError::Validation("full name must not be empty"));
    }
    if !user.email.contains('@') {
        return Err(LendingError::Validation("email address is not valid"));
    }

    let created = store.insert(user).await?;
    info!(user_id = %created.id, "user registered");
    Ok(created)
}
