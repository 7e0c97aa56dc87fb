use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::UserId;

/// User model - a participant who can own tools and borrow them.
///
/// `completed_borrows` and `completed_lends` are lifetime counters with no
/// public write path; they move only inside the COMPLETED apply step of
/// the borrow lifecycle.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,

    // Coarse location for nearby-tool discovery
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,

    /// FCM registration token, when the user enabled push.
    pub device_token: Option<String>,

    pub rating: f64,
    pub completed_borrows: i32,
    pub completed_lends: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
