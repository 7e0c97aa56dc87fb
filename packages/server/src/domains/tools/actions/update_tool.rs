//! Update tool action

use tracing::info;

use crate::common::{LendingError, ToolId, UserId};
use crate::domains::tools::models::Tool;
use crate::domains::tools::store::{ToolPatch, ToolStore};

/// Edit a tool's listing details. Owner only.
///
/// The patch surface excludes `is_available` and `total_borrows`; those
/// columns change only through the borrow lifecycle.
pub async fn update_tool(
    actor: UserId,
    tool_id: ToolId,
    patch: ToolPatch,
    store: &dyn ToolStore,
) -> Result<Tool, LendingError> {
    let tool = store.find_by_id(tool_id).await?;
    if tool.owner_id != actor {
        return Err(LendingError::Unauthorized(
            "only the owner may edit this tool",
        ));
    }

    if let Some(fee) = patch.rental_fee {
        if fee < 0.0 {
            return Err(LendingError::Validation("rental fee must not be negative"));
        }
    }
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return Err(LendingError::Validation("tool name must not be empty"));
        }
    }

    let updated = store.update(tool_id, patch).await?;
    info!(tool_id = %tool_id, "tool updated");
    Ok(updated)
}
