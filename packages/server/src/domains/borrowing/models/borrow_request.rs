use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{RequestId, ToolId, UserId};
use crate::domains::borrowing::machine::{ActorRole, RequestStatus};

/// Borrow request model - one lending transaction between an owner and a
/// borrower for one tool.
///
/// `owner_id` is denormalized from the tool at creation time so every guard
/// check and authorization decision reads a single row. Status only ever
/// changes through the lifecycle engine; the once-only timestamps are set by
/// the transition that produces them and never cleared.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct BorrowRequest {
    pub id: RequestId,
    pub tool_id: ToolId,
    pub owner_id: UserId,
    pub borrower_id: UserId,

    // Requested lending window (informational, not reservation-enforced)
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    pub status: RequestStatus,

    // Free text attached to specific transitions
    pub message: Option<String>,
    pub rejection_reason: Option<String>,
    pub cancellation_reason: Option<String>,

    // Set exactly once, by the transition that produces them
    pub collected_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BorrowRequest {
    /// Whether `actor` is one of the two participants.
    pub fn is_participant(&self, actor: UserId) -> bool {
        actor == self.owner_id || actor == self.borrower_id
    }

    /// The role `actor` plays in this request, if any.
    pub fn role_of(&self, actor: UserId) -> Option<ActorRole> {
        if actor == self.owner_id {
            Some(ActorRole::Owner)
        } else if actor == self.borrower_id {
            Some(ActorRole::Borrower)
        } else {
            None
        }
    }

    /// The participant on the other side of the request from `actor`.
    ///
    /// Returns `None` when `actor` is not a participant.
    pub fn counterpart_of(&self, actor: UserId) -> Option<UserId> {
        if actor == self.owner_id {
            Some(self.borrower_id)
        } else if actor == self.borrower_id {
            Some(self.owner_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(owner: UserId, borrower: UserId) -> BorrowRequest {
        let now = Utc::now();
        BorrowRequest {
            id: RequestId::new(),
            tool_id: ToolId::new(),
            owner_id: owner,
            borrower_id: borrower,
            start_date: now,
            end_date: now + chrono::Duration::days(2),
            status: RequestStatus::Pending,
            message: None,
            rejection_reason: None,
            cancellation_reason: None,
            collected_at: None,
            returned_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn roles_and_counterparts() {
        let owner = UserId::new();
        let borrower = UserId::new();
        let stranger = UserId::new();
        let req = request(owner, borrower);

        assert_eq!(req.role_of(owner), Some(ActorRole::Owner));
        assert_eq!(req.role_of(borrower), Some(ActorRole::Borrower));
        assert_eq!(req.role_of(stranger), None);

        assert_eq!(req.counterpart_of(owner), Some(borrower));
        assert_eq!(req.counterpart_of(borrower), Some(owner));
        assert_eq!(req.counterpart_of(stranger), None);
        assert!(!req.is_participant(stranger));
    }
}
