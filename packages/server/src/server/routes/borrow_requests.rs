//! Borrow-request lifecycle routes.
//!
//! One endpoint per lifecycle action; every one of them funnels into the
//! engine's single apply routine.

use axum::extract::{Extension, Path, Query};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::common::{RequestId, ToolId};
use crate::domains::borrowing::machine::TransitionAction;
use crate::domains::borrowing::models::{BorrowRequest, TransitionRecord};
use crate::domains::borrowing::store::CreateRequest;
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;
use crate::server::routes::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateBorrowRequestBody {
    pub tool_id: ToolId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReasonParams {
    pub reason: Option<String>,
}

/// POST /api/borrow-requests
pub async fn create_borrow_request(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Json(body): Json<CreateBorrowRequestBody>,
) -> Result<Json<BorrowRequest>, ApiError> {
    let request = state
        .engine
        .create_request(CreateRequest {
            tool_id: body.tool_id,
            borrower_id: auth.user_id,
            start_date: body.start_date,
            end_date: body.end_date,
            message: body.message,
        })
        .await?;
    Ok(Json(request))
}

/// GET /api/borrow-requests/my-requests
pub async fn my_requests(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
) -> Result<Json<Vec<BorrowRequest>>, ApiError> {
    let requests = state
        .deps
        .requests
        .list_by_borrower(auth.user_id)
        .await
        .map_err(crate::common::LendingError::from)?;
    Ok(Json(requests))
}

/// GET /api/borrow-requests/for-my-tools
pub async fn for_my_tools(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
) -> Result<Json<Vec<BorrowRequest>>, ApiError> {
    let requests = state
        .deps
        .requests
        .list_by_tool_owner(auth.user_id)
        .await
        .map_err(crate::common::LendingError::from)?;
    Ok(Json(requests))
}

/// PUT /api/borrow-requests/:id/accept (owner)
pub async fn accept_request(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
) -> Result<Json<BorrowRequest>, ApiError> {
    apply(state, auth, id, TransitionAction::Accept, None).await
}

/// PUT /api/borrow-requests/:id/reject (owner)
pub async fn reject_request(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
    Query(params): Query<ReasonParams>,
) -> Result<Json<BorrowRequest>, ApiError> {
    apply(state, auth, id, TransitionAction::Reject, params.reason).await
}

/// PUT /api/borrow-requests/:id/collected (borrower)
pub async fn confirm_collected(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
) -> Result<Json<BorrowRequest>, ApiError> {
    apply(state, auth, id, TransitionAction::Collect, None).await
}

/// PUT /api/borrow-requests/:id/returned (borrower)
pub async fn confirm_returned(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
) -> Result<Json<BorrowRequest>, ApiError> {
    apply(state, auth, id, TransitionAction::Return, None).await
}

/// PUT /api/borrow-requests/:id/confirm-receipt (owner)
pub async fn confirm_receipt(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
) -> Result<Json<BorrowRequest>, ApiError> {
    apply(state, auth, id, TransitionAction::Complete, None).await
}

/// PUT /api/borrow-requests/:id/cancel (either participant)
pub async fn cancel_request(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
    Query(params): Query<ReasonParams>,
) -> Result<Json<BorrowRequest>, ApiError> {
    apply(state, auth, id, TransitionAction::Cancel, params.reason).await
}

/// GET /api/borrow-requests/:id/timeline
pub async fn status_timeline(
    Extension(state): Extension<AxumAppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
) -> Result<Json<Vec<TransitionRecord>>, ApiError> {
    let records = state.engine.timeline(auth.user_id, id).await?;
    Ok(Json(records))
}

async fn apply(
    state: AxumAppState,
    auth: AuthUser,
    id: RequestId,
    action: TransitionAction,
    note: Option<String>,
) -> Result<Json<BorrowRequest>, ApiError> {
    let request = state.engine.apply(auth.user_id, id, action, note).await?;
    Ok(Json(request))
}
