//! In-app notification inbox, fed by the transition side-effect fan-out.

pub mod models;
pub mod store;

pub use store::{NotificationStore, PgNotificationStore};
