//! Transition outbox - decouples side-effect dispatch from the lifecycle.
//!
//! The engine emits one fact event per committed transition; a single
//! consumer task fans each event out to the notification templates. The
//! send is fire-and-forget: the channel is unbounded, so `emit` never
//! blocks, and a dispatcher failure is logged without ever reaching the
//! transition that caused it.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::domains::borrowing::effects;
use crate::domains::borrowing::events::TransitionEvent;
use crate::kernel::ServerDeps;

/// Sending half of the outbox, held by the lifecycle engine.
#[derive(Clone)]
pub struct TransitionOutbox {
    tx: UnboundedSender<TransitionEvent>,
}

impl TransitionOutbox {
    /// Create an outbox and the receiver to drive a dispatcher with.
    pub fn channel() -> (Self, UnboundedReceiver<TransitionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Hand a committed transition to the dispatcher. Never fails the
    /// caller; a closed channel only drops the event with a warning.
    pub fn emit(&self, event: TransitionEvent) {
        if self.tx.send(event).is_err() {
            warn!("transition outbox closed; dropping event");
        }
    }
}

/// Spawn the dispatcher task consuming the outbox.
///
/// Runs until every `TransitionOutbox` clone is dropped. Effect failures
/// are logged and isolated per event.
pub fn spawn_dispatcher(
    mut rx: UnboundedReceiver<TransitionEvent>,
    deps: Arc<ServerDeps>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(e) = effects::handle_transition(&event, &deps).await {
                error!(
                    request_id = %event.request_id,
                    status = %event.status,
                    error = %e,
                    "transition side effects failed"
                );
            }
        }
    })
}
