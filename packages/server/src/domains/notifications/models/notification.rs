use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::{NotificationId, RequestId, UserId};

/// What happened, from the recipient's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    RequestReceived,
    RequestAccepted,
    RequestRejected,
    ToolCollected,
    ToolReturned,
    TransactionCompleted,
    ReviewReminder,
    RequestCancelled,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::RequestReceived => "REQUEST_RECEIVED",
            NotificationKind::RequestAccepted => "REQUEST_ACCEPTED",
            NotificationKind::RequestRejected => "REQUEST_REJECTED",
            NotificationKind::ToolCollected => "TOOL_COLLECTED",
            NotificationKind::ToolReturned => "TOOL_RETURNED",
            NotificationKind::TransactionCompleted => "TRANSACTION_COMPLETED",
            NotificationKind::ReviewReminder => "REVIEW_REMINDER",
            NotificationKind::RequestCancelled => "REQUEST_CANCELLED",
        }
    }

    /// Display title shown in the inbox.
    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::RequestReceived => "Request Received",
            NotificationKind::RequestAccepted => "Request Accepted",
            NotificationKind::RequestRejected => "Request Rejected",
            NotificationKind::ToolCollected => "Tool Collected",
            NotificationKind::ToolReturned => "Tool Returned",
            NotificationKind::TransactionCompleted => "Transaction Completed",
            NotificationKind::ReviewReminder => "Review Reminder",
            NotificationKind::RequestCancelled => "Request Cancelled",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REQUEST_RECEIVED" => Ok(NotificationKind::RequestReceived),
            "REQUEST_ACCEPTED" => Ok(NotificationKind::RequestAccepted),
            "REQUEST_REJECTED" => Ok(NotificationKind::RequestRejected),
            "TOOL_COLLECTED" => Ok(NotificationKind::ToolCollected),
            "TOOL_RETURNED" => Ok(NotificationKind::ToolReturned),
            "TRANSACTION_COMPLETED" => Ok(NotificationKind::TransactionCompleted),
            "REVIEW_REMINDER" => Ok(NotificationKind::ReviewReminder),
            "REQUEST_CANCELLED" => Ok(NotificationKind::RequestCancelled),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Parse failure for a kind string loaded from storage.
#[derive(Debug, thiserror::Error)]
#[error("unknown notification kind: {0}")]
pub struct UnknownKind(pub String);

/// Notification model - one in-app inbox row.
///
/// Produced exclusively by the transition side-effect fan-out.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_request: Option<RequestId>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: UserId,
        kind: NotificationKind,
        message: String,
        related_request: Option<RequestId>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            kind,
            title: kind.title().to_string(),
            message,
            related_request,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// sqlx support (kind stored as TEXT)
// ============================================================================

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef, Postgres};
use sqlx::{Decode, Encode, Type};

impl Type<Postgres> for NotificationKind {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl Encode<'_, Postgres> for NotificationKind {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl Decode<'_, Postgres> for NotificationKind {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        let raw = <&str as Decode<Postgres>>::decode(value)?;
        Ok(raw.parse::<NotificationKind>()?)
    }
}
