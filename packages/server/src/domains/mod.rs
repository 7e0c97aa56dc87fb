//! Domain modules. `borrowing` is the core; the rest are the collaborator
//! surfaces it works against.

pub mod borrowing;
pub mod notifications;
pub mod tools;
pub mod users;
