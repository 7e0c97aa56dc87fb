//! Notification templates, keyed by the status a request entered.
//!
//! Message wording matches the product copy the mobile app expects.

use crate::common::{RequestId, UserId};
use crate::domains::borrowing::models::BorrowRequest;
use crate::domains::notifications::models::NotificationKind;
use crate::domains::tools::models::Tool;
use crate::domains::users::models::User;

/// One rendered notification, ready to store and push.
pub struct Template {
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub message: String,
    pub related_request: RequestId,
}

impl Template {
    /// New request → the owner.
    pub fn request_received(borrower: &User, tool: &Tool, request: &BorrowRequest) -> Self {
        Self {
            recipient: request.owner_id,
            kind: NotificationKind::RequestReceived,
            message: format!(
                "{} wants to borrow your {}. Tap to view details and respond.",
                borrower.full_name, tool.name
            ),
            related_request: request.id,
        }
    }

    /// Accepted → the borrower, with the owner's contact details.
    pub fn request_accepted(owner: &User, tool: &Tool, request: &BorrowRequest) -> Self {
        let contact = owner.phone_number.as_deref().unwrap_or("not shared");
        Self {
            recipient: request.borrower_id,
            kind: NotificationKind::RequestAccepted,
            message: format!(
                "Great news! {} accepted your request for {}. Contact: {}",
                owner.full_name, tool.name, contact
            ),
            related_request: request.id,
        }
    }

    /// Rejected → the borrower.
    pub fn request_rejected(owner: &User, tool: &Tool, request: &BorrowRequest) -> Self {
        Self {
            recipient: request.borrower_id,
            kind: NotificationKind::RequestRejected,
            message: format!(
                "{} declined your request for {}. Browse other tools nearby.",
                owner.full_name, tool.name
            ),
            related_request: request.id,
        }
    }

    /// Collected → the owner.
    pub fn tool_collected(borrower: &User, tool: &Tool, request: &BorrowRequest) -> Self {
        Self {
            recipient: request.owner_id,
            kind: NotificationKind::ToolCollected,
            message: format!(
                "{} has picked up your {}. The item is now in their possession.",
                borrower.full_name, tool.name
            ),
            related_request: request.id,
        }
    }

    /// Returned → the owner, asking for a receipt confirmation.
    pub fn tool_returned(borrower: &User, tool: &Tool, request: &BorrowRequest) -> Self {
        Self {
            recipient: request.owner_id,
            kind: NotificationKind::ToolReturned,
            message: format!(
                "{} has returned your {}. Please inspect and confirm receipt.",
                borrower.full_name, tool.name
            ),
            related_request: request.id,
        }
    }

    /// Completed → each participant, naming the other.
    pub fn completed(
        recipient: UserId,
        other: &User,
        tool: &Tool,
        request: &BorrowRequest,
    ) -> Self {
        Self {
            recipient,
            kind: NotificationKind::TransactionCompleted,
            message: format!(
                "Transaction complete! Your {} experience with {}. Rate your experience now.",
                tool.name, other.full_name
            ),
            related_request: request.id,
        }
    }

    /// Review reminder → each participant, naming the other.
    pub fn review_reminder(recipient: UserId, other: &User, request: &BorrowRequest) -> Self {
        Self {
            recipient,
            kind: NotificationKind::ReviewReminder,
            message: format!(
                "Don't forget to review {}! Your feedback builds trust in our community.",
                other.full_name
            ),
            related_request: request.id,
        }
    }

    /// Cancelled → the participant who did not cancel.
    pub fn request_cancelled(
        recipient: UserId,
        actor_name: &str,
        tool: &Tool,
        request: &BorrowRequest,
    ) -> Self {
        Self {
            recipient,
            kind: NotificationKind::RequestCancelled,
            message: format!("{} cancelled the request for {}.", actor_name, tool.name),
            related_request: request.id,
        }
    }
}
