//! Typed ID aliases for the domain entities.
//!
//! Each entity gets its own incompatible ID type so a `ToolId` can never be
//! handed to something expecting a `UserId`.

pub use super::id::{Id, V4, V7};

/// Marker type for User entities (owners and borrowers).
pub struct User;

/// Marker type for Tool entities (lendable items).
pub struct Tool;

/// Marker type for BorrowRequest entities (lending transactions).
pub struct BorrowRequest;

/// Marker type for Notification entities (in-app inbox rows).
pub struct Notification;

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Tool entities.
pub type ToolId = Id<Tool>;

/// Typed ID for BorrowRequest entities.
pub type RequestId = Id<BorrowRequest>;

/// Typed ID for Notification entities.
pub type NotificationId = Id<Notification>;
