//! Storage contract for the participant registry.
//!
//! No counter mutation lives here: `completed_borrows`/`completed_lends`
//! are written exclusively by the lifecycle apply step.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::common::{StoreError, UserId};
use crate::domains::users::models::User;

/// Fields a new user registers with.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub device_token: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<User, StoreError>;
}

/// Postgres-backed `UserStore`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (
                id, full_name, email, phone_number,
                latitude, longitude, address, device_token,
                created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING *",
        )
        .bind(UserId::new())
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(user.latitude)
        .bind(user.longitude)
        .bind(&user.address)
        .bind(&user.device_token)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UserMissing)
    }
}
