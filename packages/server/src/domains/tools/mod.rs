//! Tool catalog: the lendable items and their availability register.

pub mod actions;
pub mod models;
pub mod store;

pub use store::{NewTool, PgToolStore, ToolPatch, ToolStore};
