//! Tool catalog routes.

use axum::extract::{Extension, Path};
use axum::Json;
use serde::Deserialize;

use crate::common::ToolId;
use crate::domains::tools::actions;
use crate::domains::tools::models::Tool;
use crate::domains::tools::store::{NewTool, ToolPatch};
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;
use crate::server::routes::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateToolBody {
    pub name: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub rental_fee: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateToolBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub rental_fee: Option<f64>,
}

/// POST /api/tools
pub async fn create_tool(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Json(body): Json<CreateToolBody>,
) -> Result<Json<Tool>, ApiError> {
    let tool = actions::create_tool(
        NewTool {
            owner_id: auth.user_id,
            name: body.name,
            description: body.description,
            category: body.category,
            condition: body.condition,
            image_urls: body.image_urls,
            rental_fee: body.rental_fee,
        },
        state.deps.tools.as_ref(),
    )
    .await?;
    Ok(Json(tool))
}

/// GET /api/tools - tools currently available for borrowing
pub async fn list_tools(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<Vec<Tool>>, ApiError> {
    let tools = actions::list_available_tools(state.deps.tools.as_ref()).await?;
    Ok(Json(tools))
}

/// GET /api/tools/my-tools
pub async fn my_tools(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Tool>>, ApiError> {
    let tools = actions::list_my_tools(auth.user_id, state.deps.tools.as_ref()).await?;
    Ok(Json(tools))
}

/// GET /api/tools/:id
pub async fn get_tool(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<ToolId>,
) -> Result<Json<Tool>, ApiError> {
    let tool = actions::get_tool(id, state.deps.tools.as_ref()).await?;
    Ok(Json(tool))
}

/// PUT /api/tools/:id (owner)
pub async fn update_tool(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Path(id): Path<ToolId>,
    Json(body): Json<UpdateToolBody>,
) -> Result<Json<Tool>, ApiError> {
    let tool = actions::update_tool(
        auth.user_id,
        id,
        ToolPatch {
            name: body.name,
            description: body.description,
            category: body.category,
            condition: body.condition,
            image_urls: body.image_urls,
            rental_fee: body.rental_fee,
        },
        state.deps.tools.as_ref(),
    )
    .await?;
    Ok(Json(tool))
}
