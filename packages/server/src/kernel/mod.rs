//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod outbox;
pub mod test_dependencies;
pub mod traits;

pub use deps::{FcmAdapter, ServerDeps};
pub use outbox::{spawn_dispatcher, TransitionOutbox};
pub use test_dependencies::TestDependencies;
pub use traits::*;
