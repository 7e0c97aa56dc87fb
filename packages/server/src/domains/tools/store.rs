//! Storage contract for the tool catalog.
//!
//! Deliberately narrow: availability and the borrow counter have no write
//! path here. Those columns belong to the lifecycle apply step.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::common::{StoreError, ToolId, UserId};
use crate::domains::tools::models::Tool;

/// Fields a new tool is created with.
#[derive(Debug, Clone)]
pub struct NewTool {
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub image_urls: Vec<String>,
    pub rental_fee: f64,
}

/// Owner-editable fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ToolPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub rental_fee: Option<f64>,
}

#[async_trait]
pub trait ToolStore: Send + Sync {
    async fn insert(&self, tool: NewTool) -> Result<Tool, StoreError>;

    async fn find_by_id(&self, id: ToolId) -> Result<Tool, StoreError>;

    /// Tools currently open for borrowing, newest first.
    async fn list_available(&self) -> Result<Vec<Tool>, StoreError>;

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Tool>, StoreError>;

    async fn update(&self, id: ToolId, patch: ToolPatch) -> Result<Tool, StoreError>;
}

/// Postgres-backed `ToolStore`.
#[derive(Clone)]
pub struct PgToolStore {
    pool: PgPool,
}

impl PgToolStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ToolStore for PgToolStore {
    async fn insert(&self, tool: NewTool) -> Result<Tool, StoreError> {
        sqlx::query_as::<_, Tool>(
            "INSERT INTO tools (
                id, owner_id, name, description, category, condition,
                image_urls, rental_fee, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING *",
        )
        .bind(ToolId::new())
        .bind(tool.owner_id)
        .bind(&tool.name)
        .bind(&tool.description)
        .bind(&tool.category)
        .bind(&tool.condition)
        .bind(&tool.image_urls)
        .bind(tool.rental_fee)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn find_by_id(&self, id: ToolId) -> Result<Tool, StoreError> {
        sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::ToolMissing)
    }

    async fn list_available(&self) -> Result<Vec<Tool>, StoreError> {
        sqlx::query_as::<_, Tool>(
            "SELECT * FROM tools WHERE is_available = true ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Tool>, StoreError> {
        sqlx::query_as::<_, Tool>(
            "SELECT * FROM tools WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn update(&self, id: ToolId, patch: ToolPatch) -> Result<Tool, StoreError> {
        sqlx::query_as::<_, Tool>(
            "UPDATE tools
             SET name        = COALESCE($2, name),
                 description = COALESCE($3, description),
                 category    = COALESCE($4, category),
                 condition   = COALESCE($5, condition),
                 image_urls  = COALESCE($6, image_urls),
                 rental_fee  = COALESCE($7, rental_fee),
                 updated_at  = $8
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(&patch.category)
        .bind(&patch.condition)
        .bind(&patch.image_urls)
        .bind(patch.rental_fee)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::ToolMissing)
    }
}
