//! Participant registry: owners and borrowers, with their lifetime
//! lending counters.

pub mod actions;
pub mod models;
pub mod store;

pub use store::{NewUser, PgUserStore, UserStore};
