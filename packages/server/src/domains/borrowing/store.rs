//! Storage contract for the borrow-request lifecycle.
//!
//! `BorrowStore` owns the two writes with real invariants:
//!
//! - `create_request` re-checks the item guards (tool exists, is available,
//!   is not the borrower's own) inside the same storage transaction that
//!   inserts the request, so two racing creations against one tool cannot
//!   both pass the availability check.
//! - `apply_transition` writes status, availability, timestamp, reason,
//!   audit row and counters as one unit, conditional on the request still
//!   being in the expected origin status. A lost race surfaces as
//!   `StoreError::StaleStatus`, never as a second applied transition.
//!
//! The audit trail is append-only: nothing here updates or deletes a
//! `TransitionRecord`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{RequestId, StoreError, ToolId, UserId};
use crate::domains::borrowing::machine::{AvailabilityEffect, ReasonSlot, RequestStatus, TimestampSlot};
use crate::domains::borrowing::models::{BorrowRequest, TransitionRecord};

/// Command to create a new request in `PENDING`.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub tool_id: ToolId,
    pub borrower_id: UserId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub message: Option<String>,
}

/// Command describing one fully-guarded transition, ready to persist.
///
/// Built by the lifecycle engine from the transition table; the store
/// executes it atomically and re-verifies `expected_from` at write time.
#[derive(Debug, Clone)]
pub struct TransitionApply {
    pub request_id: RequestId,
    pub expected_from: RequestStatus,
    pub to: RequestStatus,
    pub actor_id: UserId,
    pub note: Option<String>,
    pub availability: AvailabilityEffect,
    pub timestamp: TimestampSlot,
    pub reason: ReasonSlot,
    pub bump_counters: bool,
    pub occurred_at: DateTime<Utc>,
}

#[async_trait]
pub trait BorrowStore: Send + Sync {
    /// Atomically guard-check the tool and insert the request with its
    /// first audit row.
    async fn create_request(&self, cmd: CreateRequest) -> Result<BorrowRequest, StoreError>;

    async fn find_by_id(&self, id: RequestId) -> Result<BorrowRequest, StoreError>;

    /// Requests the user made as borrower, newest first.
    async fn list_by_borrower(&self, borrower: UserId) -> Result<Vec<BorrowRequest>, StoreError>;

    /// Requests against the user's tools, newest first.
    async fn list_by_tool_owner(&self, owner: UserId) -> Result<Vec<BorrowRequest>, StoreError>;

    /// Apply a transition atomically, conditional on the expected origin
    /// status still holding.
    async fn apply_transition(&self, apply: TransitionApply) -> Result<BorrowRequest, StoreError>;

    /// Ordered audit trail for a request, oldest first.
    async fn timeline(&self, id: RequestId) -> Result<Vec<TransitionRecord>, StoreError>;
}

/// Postgres-backed `BorrowStore`.
#[derive(Clone)]
pub struct PgBorrowStore {
    pool: PgPool,
}

impl PgBorrowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowStore for PgBorrowStore {
    async fn create_request(&self, cmd: CreateRequest) -> Result<BorrowRequest, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the tool row so a concurrent accept or second creation
        // serializes against this guard check.
        let tool: Option<(UserId, bool)> =
            sqlx::query_as("SELECT owner_id, is_available FROM tools WHERE id = $1 FOR UPDATE")
                .bind(cmd.tool_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (owner_id, is_available) = tool.ok_or(StoreError::ToolMissing)?;
        if owner_id == cmd.borrower_id {
            return Err(StoreError::SelfBorrow);
        }
        if !is_available {
            return Err(StoreError::ToolUnavailable);
        }

        let now = Utc::now();
        let request: BorrowRequest = sqlx::query_as(
            "INSERT INTO borrow_requests (
                id, tool_id, owner_id, borrower_id,
                start_date, end_date, status, message,
                created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING *",
        )
        .bind(RequestId::new())
        .bind(cmd.tool_id)
        .bind(owner_id)
        .bind(cmd.borrower_id)
        .bind(cmd.start_date)
        .bind(cmd.end_date)
        .bind(RequestStatus::Pending)
        .bind(&cmd.message)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO transition_records (request_id, status, actor_id, note, recorded_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(request.id)
        .bind(RequestStatus::Pending)
        .bind(cmd.borrower_id)
        .bind(&cmd.message)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(request)
    }

    async fn find_by_id(&self, id: RequestId) -> Result<BorrowRequest, StoreError> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::RequestMissing)
    }

    async fn list_by_borrower(&self, borrower: UserId) -> Result<Vec<BorrowRequest>, StoreError> {
        sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE borrower_id = $1 ORDER BY created_at DESC",
        )
        .bind(borrower)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn list_by_tool_owner(&self, owner: UserId) -> Result<Vec<BorrowRequest>, StoreError> {
        sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn apply_transition(&self, apply: TransitionApply) -> Result<BorrowRequest, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Conditional write: the WHERE clause re-verifies the origin status,
        // so of two racing applies exactly one updates a row.
        let updated: Option<BorrowRequest> = sqlx::query_as(
            "UPDATE borrow_requests
             SET status = $2,
                 updated_at = $3,
                 collected_at = CASE WHEN $4 THEN $3 ELSE collected_at END,
                 returned_at  = CASE WHEN $5 THEN $3 ELSE returned_at END,
                 completed_at = CASE WHEN $6 THEN $3 ELSE completed_at END,
                 rejection_reason    = CASE WHEN $7 THEN $9 ELSE rejection_reason END,
                 cancellation_reason = CASE WHEN $8 THEN $9 ELSE cancellation_reason END
             WHERE id = $1 AND status = $10
             RETURNING *",
        )
        .bind(apply.request_id)
        .bind(apply.to)
        .bind(apply.occurred_at)
        .bind(apply.timestamp == TimestampSlot::CollectedAt)
        .bind(apply.timestamp == TimestampSlot::ReturnedAt)
        .bind(apply.timestamp == TimestampSlot::CompletedAt)
        .bind(apply.reason == ReasonSlot::Rejection)
        .bind(apply.reason == ReasonSlot::Cancellation)
        .bind(&apply.note)
        .bind(apply.expected_from)
        .fetch_optional(&mut *tx)
        .await?;

        let request = match updated {
            Some(request) => request,
            None => {
                let current: Option<(RequestStatus,)> =
                    sqlx::query_as("SELECT status FROM borrow_requests WHERE id = $1")
                        .bind(apply.request_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                return match current {
                    None => Err(StoreError::RequestMissing),
                    Some((actual,)) => Err(StoreError::StaleStatus {
                        expected: apply.expected_from.to_string(),
                        actual: actual.to_string(),
                    }),
                };
            }
        };

        match apply.availability {
            AvailabilityEffect::Unchanged => {}
            AvailabilityEffect::MarkUnavailable => {
                sqlx::query("UPDATE tools SET is_available = false, updated_at = $2 WHERE id = $1")
                    .bind(request.tool_id)
                    .bind(apply.occurred_at)
                    .execute(&mut *tx)
                    .await?;
            }
            AvailabilityEffect::MarkAvailable => {
                sqlx::query("UPDATE tools SET is_available = true, updated_at = $2 WHERE id = $1")
                    .bind(request.tool_id)
                    .bind(apply.occurred_at)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        if apply.bump_counters {
            sqlx::query(
                "UPDATE users SET completed_borrows = completed_borrows + 1, updated_at = $2
                 WHERE id = $1",
            )
            .bind(request.borrower_id)
            .bind(apply.occurred_at)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE users SET completed_lends = completed_lends + 1, updated_at = $2
                 WHERE id = $1",
            )
            .bind(request.owner_id)
            .bind(apply.occurred_at)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE tools SET total_borrows = total_borrows + 1, updated_at = $2
                 WHERE id = $1",
            )
            .bind(request.tool_id)
            .bind(apply.occurred_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO transition_records (request_id, status, actor_id, note, recorded_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(request.id)
        .bind(apply.to)
        .bind(apply.actor_id)
        .bind(&apply.note)
        .bind(apply.occurred_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(request)
    }

    async fn timeline(&self, id: RequestId) -> Result<Vec<TransitionRecord>, StoreError> {
        sqlx::query_as::<_, TransitionRecord>(
            "SELECT * FROM transition_records
             WHERE request_id = $1
             ORDER BY recorded_at ASC, id ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }
}
