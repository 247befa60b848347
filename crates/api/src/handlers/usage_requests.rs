//! Handlers for cross-module asset usage requests.
//!
//! Operations, Projects and Finance file requests; only the Assets module
//! decides them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use sanctum_core::types::EntityId;
use sanctum_core::usage::{NewUsageRequest, UsageStatus};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAssets, RequireRequester};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `PUT /usage-requests/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateUsageStatus {
    pub status: String,
}

// ---------------------------------------------------------------------------
// POST /assets/{id}/usage-requests
// ---------------------------------------------------------------------------

/// File a usage request. The requesting module comes from the caller's token.
pub async fn submit_usage_request(
    RequireRequester(user, module): RequireRequester,
    State(state): State<AppState>,
    Path(asset_id): Path<EntityId>,
    Json(input): Json<NewUsageRequest>,
) -> AppResult<impl IntoResponse> {
    let request = state
        .governance
        .submit_usage_request(&asset_id, module, input, &user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

// ---------------------------------------------------------------------------
// GET /assets/{id}/usage-requests
// ---------------------------------------------------------------------------

pub async fn list_usage_requests(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(asset_id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let requests = state.governance.list_usage_requests(&asset_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

// ---------------------------------------------------------------------------
// PUT /usage-requests/{id}/status
// ---------------------------------------------------------------------------

/// Approve, reject or complete a usage request. Assets module only.
pub async fn update_usage_status(
    RequireAssets(user): RequireAssets,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateUsageStatus>,
) -> AppResult<impl IntoResponse> {
    let status: UsageStatus = input.status.parse()?;
    if status == UsageStatus::Pending {
        return Err(AppError::BadRequest(
            "Usage requests cannot be moved back to 'pending'".into(),
        ));
    }

    let updated = state
        .governance
        .decide_usage_request(&id, status, &user.user_id)
        .await?;

    Ok(Json(DataResponse { data: updated }))
}
