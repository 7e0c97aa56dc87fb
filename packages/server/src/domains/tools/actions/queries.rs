//! Tool catalog queries

use crate::common::{LendingError, ToolId, UserId};
use crate::domains::tools::models::Tool;
use crate::domains::tools::store::ToolStore;

pub async fn get_tool(id: ToolId, store: &dyn ToolStore) -> Result<Tool, LendingError> {
    Ok(store.find_by_id(id).await?)
}

pub async fn list_available_tools(store: &dyn ToolStore) -> Result<Vec<Tool>, LendingError> {
    Ok(store.list_available().await?)
}

pub async fn list_my_tools(
    owner: UserId,
    store: &dyn ToolStore,
) -> Result<Vec<Tool>, LendingError> {
    Ok(store.list_by_owner(owner).await?)
}
