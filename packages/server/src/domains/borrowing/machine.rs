//! Borrow-request state machine - pure decision logic
//!
//! One explicit transition table, consulted by the one apply routine in
//! `engine.rs`. Guards, availability effects, timestamp slots and counter
//! effects all live here so no two code paths can disagree about what a
//! transition means.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a borrow request.
///
/// `Pending` is the only initial status. `Rejected`, `Completed` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Collected,
    Returned,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// Stable wire/storage form (`PENDING`, `ACCEPTED`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Collected => "COLLECTED",
            RequestStatus::Returned => "RETURNED",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }

    /// Terminal statuses permit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Rejected | RequestStatus::Completed | RequestStatus::Cancelled
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "ACCEPTED" => Ok(RequestStatus::Accepted),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "COLLECTED" => Ok(RequestStatus::Collected),
            "RETURNED" => Ok(RequestStatus::Returned),
            "COMPLETED" => Ok(RequestStatus::Completed),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Parse failure for a status string loaded from storage or the wire.
#[derive(Debug, thiserror::Error)]
#[error("unknown request status: {0}")]
pub struct UnknownStatus(pub String);

/// The actions a participant can request against an existing borrow request.
///
/// Creation is not listed: it has no origin state and its guards (item
/// availability, self-borrow) are creation-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Accept,
    Reject,
    Collect,
    Return,
    Complete,
    Cancel,
}

impl TransitionAction {
    /// Imperative verb used in error messages ("cannot accept a request...").
    pub fn verb(&self) -> &'static str {
        match self {
            TransitionAction::Accept => "accept",
            TransitionAction::Reject => "reject",
            TransitionAction::Collect => "collect",
            TransitionAction::Return => "return",
            TransitionAction::Complete => "complete",
            TransitionAction::Cancel => "cancel",
        }
    }
}

/// Which participant may request a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Owner,
    Borrower,
    Either,
}

/// Availability write applied to the tool as part of the atomic apply step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityEffect {
    Unchanged,
    MarkUnavailable,
    MarkAvailable,
}

/// Which once-only timestamp the transition stamps onto the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSlot {
    None,
    CollectedAt,
    ReturnedAt,
    CompletedAt,
}

/// Which free-text reason field the transition's note is copied into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonSlot {
    None,
    Rejection,
    Cancellation,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct TransitionSpec {
    pub action: TransitionAction,
    /// Origin statuses this action is valid from.
    pub allowed_from: &'static [RequestStatus],
    pub to: RequestStatus,
    pub role: ActorRole,
    pub availability: AvailabilityEffect,
    pub timestamp: TimestampSlot,
    pub reason: ReasonSlot,
    /// `Complete` bumps the borrower's completed-borrow count, the owner's
    /// completed-lend count and the tool's borrow total. Nothing else does.
    pub bump_counters: bool,
}

/// The full transition table. Cancellation is the one multi-origin,
/// either-participant entry; everything else is single-origin, single-role.
pub const TRANSITIONS: &[TransitionSpec] = &[
    TransitionSpec {
        action: TransitionAction::Accept,
        allowed_from: &[RequestStatus::Pending],
        to: RequestStatus::Accepted,
        role: ActorRole::Owner,
        availability: AvailabilityEffect::MarkUnavailable,
        timestamp: TimestampSlot::None,
        reason: ReasonSlot::None,
        bump_counters: false,
    },
    TransitionSpec {
        action: TransitionAction::Reject,
        allowed_from: &[RequestStatus::Pending],
        to: RequestStatus::Rejected,
        role: ActorRole::Owner,
        availability: AvailabilityEffect::Unchanged,
        timestamp: TimestampSlot::None,
        reason: ReasonSlot::Rejection,
        bump_counters: false,
    },
    TransitionSpec {
        action: TransitionAction::Collect,
        allowed_from: &[RequestStatus::Accepted],
        to: RequestStatus::Collected,
        role: ActorRole::Borrower,
        availability: AvailabilityEffect::Unchanged,
        timestamp: TimestampSlot::CollectedAt,
        reason: ReasonSlot::None,
        bump_counters: false,
    },
    TransitionSpec {
        action: TransitionAction::Return,
        allowed_from: &[RequestStatus::Collected],
        to: RequestStatus::Returned,
        role: ActorRole::Borrower,
        availability: AvailabilityEffect::Unchanged,
        timestamp: TimestampSlot::ReturnedAt,
        reason: ReasonSlot::None,
        bump_counters: false,
    },
    TransitionSpec {
        action: TransitionAction::Complete,
        allowed_from: &[RequestStatus::Returned],
        to: RequestStatus::Completed,
        role: ActorRole::Owner,
        availability: AvailabilityEffect::MarkAvailable,
        timestamp: TimestampSlot::CompletedAt,
        reason: ReasonSlot::None,
        bump_counters: true,
    },
    TransitionSpec {
        action: TransitionAction::Cancel,
        allowed_from: &[
            RequestStatus::Pending,
            RequestStatus::Accepted,
            RequestStatus::Collected,
            RequestStatus::Returned,
        ],
        to: RequestStatus::Cancelled,
        role: ActorRole::Either,
        availability: AvailabilityEffect::MarkAvailable,
        timestamp: TimestampSlot::None,
        reason: ReasonSlot::Cancellation,
        bump_counters: false,
    },
];

/// Look up the table row for an action.
pub fn spec_for(action: TransitionAction) -> &'static TransitionSpec {
    TRANSITIONS
        .iter()
        .find(|spec| spec.action == action)
        .expect("every action has a table row")
}

// ============================================================================
// sqlx support (status stored as TEXT)
// ============================================================================

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef, Postgres};
use sqlx::{Decode, Encode, Type};

impl Type<Postgres> for RequestStatus {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl Encode<'_, Postgres> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl Decode<'_, Postgres> for RequestStatus {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        let raw = <&str as Decode<Postgres>>::decode(value)?;
        Ok(raw.parse::<RequestStatus>()?)
    }
}
