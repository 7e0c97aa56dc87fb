//! Create tool action

use tracing::info;

use crate::common::LendingError;
use crate::domains::tools::models::Tool;
use crate::domains::tools::store::{NewTool, ToolStore};

/// List a new tool in the catalog.
///
/// New tools start available; availability is owned by the borrow
/// lifecycle from the first request onwards.
pub async fn create_tool(tool: NewTool, store: &dyn ToolStore) -> Result<Tool, LendingError> {
    if tool.name.trim().is_empty() {
        return Err(LendingError::Validation("tool name must not be empty"));
    }
    if tool.rental_fee < 0.0 {
        return Err(LendingError::Validation("rental fee must not be negative"));
    }

    let created = store.insert(tool).await?;
    info!(tool_id = %created.id, owner_id = %created.owner_id, "tool listed");
    Ok(created)
}
