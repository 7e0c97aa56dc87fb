use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{RequestId, UserId};
use crate::domains::borrowing::machine::RequestStatus;

/// Borrowing domain event - FACT EVENT ONLY
///
/// Emitted exactly once per committed transition, after persistence. The
/// dispatcher loads whatever extra context it needs from the stores; the
/// event itself carries only what the transition was.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub request_id: RequestId,
    /// The status the request entered.
    pub status: RequestStatus,
    /// The participant who caused the transition.
    pub actor_id: UserId,
    pub occurred_at: DateTime<Utc>,
}
