use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{RequestId, UserId};
use crate::domains::borrowing::machine::RequestStatus;

/// One immutable audit row per state change of a borrow request.
///
/// Rows are append-only and insertion-ordered (`id` is a storage sequence);
/// the ordered sequence for a request replays its full history, and the
/// status of the last row always equals the request's current status.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct TransitionRecord {
    pub id: i64,
    pub request_id: RequestId,
    /// The status the request entered with this transition.
    pub status: RequestStatus,
    /// The participant who caused the transition.
    pub actor_id: UserId,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
