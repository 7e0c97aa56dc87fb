//! Error taxonomy for the lending core.
//!
//! Every fallible operation surfaces one of the five `LendingError` kinds so
//! callers can render "not found", "not allowed", "wrong state", "conflict"
//! and "bad input" distinctly. Storage backends report through `StoreError`,
//! which the domain layer folds into the taxonomy.

use thiserror::Error;

/// Errors returned by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No borrow request with the given id.
    #[error("borrow request not found")]
    RequestMissing,

    /// No tool with the given id.
    #[error("tool not found")]
    ToolMissing,

    /// No user with the given id.
    #[error("user not found")]
    UserMissing,

    /// No notification with the given id for this user.
    #[error("notification not found")]
    NotificationMissing,

    /// Creation attempted against a tool that is not currently available.
    #[error("tool is not available")]
    ToolUnavailable,

    /// Creation attempted by the tool's own owner.
    #[error("cannot borrow your own tool")]
    SelfBorrow,

    /// Conditional apply lost the race: the request was no longer in the
    /// expected origin status when the write committed.
    #[error("request status changed concurrently: expected {expected}, found {actual}")]
    StaleStatus { expected: String, actual: String },

    /// Backend failure (connection, serialization, ...).
    #[error("storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.into())
    }
}

/// The user-visible error taxonomy of the lending core.
#[derive(Debug, Error)]
pub enum LendingError {
    /// Referenced transaction, item or user does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Actor is not a participant, or not the participant this transition
    /// requires.
    #[error("not allowed: {0}")]
    Unauthorized(&'static str),

    /// The request is not in the origin state the transition requires
    /// (including any transition attempted from a terminal state).
    #[error("cannot {action} a request in status {current}")]
    InvalidState {
        action: &'static str,
        current: String,
    },

    /// Item unavailable or self-borrow, detected at creation time.
    #[error("{0}")]
    ResourceConflict(&'static str),

    /// Malformed input, rejected before any state is touched.
    #[error("{0}")]
    Validation(&'static str),

    /// Unexpected backend failure. Not part of the taxonomy proper; maps to
    /// an opaque 500.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for LendingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RequestMissing => LendingError::NotFound("borrow request"),
            StoreError::ToolMissing => LendingError::NotFound("tool"),
            StoreError::UserMissing => LendingError::NotFound("user"),
            StoreError::NotificationMissing => LendingError::NotFound("notification"),
            StoreError::ToolUnavailable => LendingError::ResourceConflict("tool is not available"),
            StoreError::SelfBorrow => {
                LendingError::ResourceConflict("cannot borrow your own tool")
            }
            StoreError::StaleStatus { actual, .. } => LendingError::InvalidState {
                action: "apply transition to",
                current: actual,
            },
            StoreError::Backend(e) => LendingError::Internal(e),
        }
    }
}
