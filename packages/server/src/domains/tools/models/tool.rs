use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{ToolId, UserId};

/// Tool model - one lendable item in the catalog.
///
/// `is_available` is the availability register: once a borrow request
/// exists against the tool it is written only by the lifecycle apply step.
/// `total_borrows` likewise only moves on a completed transaction. Neither
/// field is reachable through the catalog's update surface.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Tool {
    pub id: ToolId,
    pub owner_id: UserId,

    pub name: String,
    pub description: String,
    pub category: String,
    /// "New", "Like New", "Good", "Fair"
    pub condition: String,
    pub image_urls: Vec<String>,

    pub is_available: bool,
    pub rental_fee: f64,
    pub rating: f64,
    pub total_borrows: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
