mod create_tool;
mod queries;
mod update_tool;

pub use create_tool::create_tool;
pub use queries::{get_tool, list_available_tools, list_my_tools};
pub use update_tool::update_tool;
