//! The borrow-request lifecycle: transition table, engine, stores, audit
//! trail and side-effect fan-out.

pub mod effects;
pub mod engine;
pub mod events;
pub mod machine;
pub mod models;
pub mod store;

pub use engine::LifecycleEngine;
pub use events::TransitionEvent;
pub use machine::{RequestStatus, TransitionAction};
pub use store::{BorrowStore, CreateRequest, PgBorrowStore};
