//! Lifecycle engine - the one apply routine for borrow-request transitions.
//!
//! Every state change funnels through [`LifecycleEngine::apply`]:
//! guards run in a fixed order (request exists, actor is the required
//! participant, origin status matches the table), then the store persists
//! the transition atomically, then exactly one fact event goes to the
//! outbox. The guard-check-then-apply sequence for one request is
//! serialized by a per-request lock; requests never serialize against each
//! other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::common::{LendingError, RequestId, UserId};
use crate::domains::borrowing::events::TransitionEvent;
use crate::domains::borrowing::machine::{spec_for, ActorRole, RequestStatus, TransitionAction};
use crate::domains::borrowing::models::{BorrowRequest, TransitionRecord};
use crate::domains::borrowing::store::{BorrowStore, CreateRequest, TransitionApply};
use crate::kernel::outbox::TransitionOutbox;

pub struct LifecycleEngine {
    store: Arc<dyn BorrowStore>,
    outbox: TransitionOutbox,
    /// Per-request serialization of guard-check-then-apply. Entries for
    /// requests that reached a terminal status are dropped eagerly.
    locks: RwLock<HashMap<RequestId, Arc<Mutex<()>>>>,
}

impl LifecycleEngine {
    pub fn new(store: Arc<dyn BorrowStore>, outbox: TransitionOutbox) -> Self {
        Self {
            store,
            outbox,
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new borrow request in `PENDING`.
    ///
    /// Input validation happens before any state is touched; the item
    /// guards (tool exists, available, not self-owned) are re-checked by
    /// the store inside the creation's atomic unit.
    pub async fn create_request(&self, cmd: CreateRequest) -> Result<BorrowRequest, LendingError> {
        if cmd.end_date <= cmd.start_date {
            return Err(LendingError::Validation("end date must be after start date"));
        }

        let request = self.store.create_request(cmd).await?;
        info!(request_id = %request.id, tool_id = %request.tool_id, "borrow request created");

        self.outbox.emit(TransitionEvent {
            request_id: request.id,
            status: RequestStatus::Pending,
            actor_id: request.borrower_id,
            occurred_at: request.created_at,
        });
        Ok(request)
    }

    /// Apply one lifecycle transition on behalf of `actor`.
    pub async fn apply(
        &self,
        actor: UserId,
        request_id: RequestId,
        action: TransitionAction,
        note: Option<String>,
    ) -> Result<BorrowRequest, LendingError> {
        let spec = spec_for(action);

        let lock = self.lock_for(request_id).await;
        let _serial = lock.lock().await;

        let request = self.store.find_by_id(request_id).await?;

        match request.role_of(actor) {
            None => {
                return Err(LendingError::Unauthorized(
                    "you are not a participant in this request",
                ))
            }
            Some(role) => match (spec.role, role) {
                (ActorRole::Either, _) => {}
                (ActorRole::Owner, ActorRole::Owner) => {}
                (ActorRole::Borrower, ActorRole::Borrower) => {}
                (ActorRole::Owner, _) => {
                    return Err(LendingError::Unauthorized(
                        "only the tool owner may perform this transition",
                    ))
                }
                (ActorRole::Borrower, _) => {
                    return Err(LendingError::Unauthorized(
                        "only the borrower may perform this transition",
                    ))
                }
            },
        }

        if !spec.allowed_from.contains(&request.status) {
            return Err(LendingError::InvalidState {
                action: spec.action.verb(),
                current: request.status.to_string(),
            });
        }

        let occurred_at = Utc::now();
        let updated = self
            .store
            .apply_transition(TransitionApply {
                request_id,
                expected_from: request.status,
                to: spec.to,
                actor_id: actor,
                note,
                availability: spec.availability,
                timestamp: spec.timestamp,
                reason: spec.reason,
                bump_counters: spec.bump_counters,
                occurred_at,
            })
            .await?;

        info!(
            request_id = %request_id,
            from = %request.status,
            to = %updated.status,
            actor = %actor,
            "transition applied"
        );

        drop(_serial);
        if updated.status.is_terminal() {
            self.locks.write().await.remove(&request_id);
        }

        // Fire-and-forget: dispatch runs outside the critical section and
        // its failure never rolls the transition back.
        self.outbox.emit(TransitionEvent {
            request_id,
            status: updated.status,
            actor_id: actor,
            occurred_at,
        });

        Ok(updated)
    }

    /// Ordered transition history of a request, participants only.
    pub async fn timeline(
        &self,
        actor: UserId,
        request_id: RequestId,
    ) -> Result<Vec<TransitionRecord>, LendingError> {
        let request = self.store.find_by_id(request_id).await?;
        if !request.is_participant(actor) {
            return Err(LendingError::Unauthorized(
                "you are not a participant in this request",
            ));
        }
        debug!(request_id = %request_id, "timeline read");
        Ok(self.store.timeline(request_id).await?)
    }

    async fn lock_for(&self, request_id: RequestId) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(&request_id) {
                return lock.clone();
            }
        }
        let mut locks = self.locks.write().await;
        locks
            .entry(request_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
