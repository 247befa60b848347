//! Handlers for asset registration, lifecycle transitions, custody,
//! valuation and audit history.
//!
//! Reads are open to any authenticated module; writes require the Assets
//! module capability.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use sanctum_core::asset::NewAsset;
use sanctum_core::lifecycle::LifecycleState;
use sanctum_core::store::AssetListParams;
use sanctum_core::types::EntityId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAssets;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /assets/{id}/transition`.
#[derive(Debug, Deserialize)]
pub struct TransitionInput {
    /// Target state tag (`"lock"`, `"value"`, ...).
    pub state: String,
}

/// Body for `PUT /assets/{id}/custodian`.
#[derive(Debug, Deserialize)]
pub struct AssignCustodianInput {
    /// `null` or absent clears the custodian (refused in `lock` and `use`).
    pub custodian_id: Option<EntityId>,
    /// Absent or `null` keeps the asset's current department.
    pub department_id: Option<EntityId>,
}

/// Body for `PUT /assets/{id}/valuation`.
#[derive(Debug, Deserialize)]
pub struct ValuationInput {
    pub current_value: f64,
}

// ---------------------------------------------------------------------------
// POST /assets
// ---------------------------------------------------------------------------

/// Register a newly acquired asset. It always starts in `get`.
pub async fn register_asset(
    RequireAssets(user): RequireAssets,
    State(state): State<AppState>,
    Json(input): Json<NewAsset>,
) -> AppResult<impl IntoResponse> {
    let asset = state
        .governance
        .register_asset(input, &user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: asset })))
}

// ---------------------------------------------------------------------------
// GET /assets
// ---------------------------------------------------------------------------

/// List assets, optionally filtered by state, category, department or custodian.
pub async fn list_assets(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AssetListParams>,
) -> AppResult<impl IntoResponse> {
    let assets = state.governance.list_assets(&params).await?;
    Ok(Json(DataResponse { data: assets }))
}

// ---------------------------------------------------------------------------
// GET /assets/{id}
// ---------------------------------------------------------------------------

pub async fn get_asset(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let asset = state.governance.get_asset(&id).await?;
    Ok(Json(DataResponse { data: asset }))
}

// ---------------------------------------------------------------------------
// GET /assets/{id}/next-states
// ---------------------------------------------------------------------------

pub async fn get_next_states(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let next = state.governance.next_states(&id).await?;
    Ok(Json(DataResponse { data: next }))
}

// ---------------------------------------------------------------------------
// POST /assets/{id}/transition
// ---------------------------------------------------------------------------

/// Move an asset to a new lifecycle state.
///
/// Refusals come back as 422 with `code` set to `INVALID_TRANSITION`,
/// `MISSING_CUSTODIAN` or `INVALID_VALUATION`.
pub async fn transition_asset(
    RequireAssets(user): RequireAssets,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<TransitionInput>,
) -> AppResult<impl IntoResponse> {
    let target: LifecycleState = input.state.parse()?;
    let asset = state
        .governance
        .transition(&id, target, &user.user_id)
        .await?;

    Ok(Json(DataResponse { data: asset }))
}

// ---------------------------------------------------------------------------
// PUT /assets/{id}/custodian
// ---------------------------------------------------------------------------

pub async fn assign_custodian(
    RequireAssets(user): RequireAssets,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<AssignCustodianInput>,
) -> AppResult<impl IntoResponse> {
    let asset = state
        .governance
        .assign_custodian(&id, input.custodian_id, input.department_id, &user.user_id)
        .await?;

    Ok(Json(DataResponse { data: asset }))
}

// ---------------------------------------------------------------------------
// PUT /assets/{id}/valuation
// ---------------------------------------------------------------------------

pub async fn record_valuation(
    RequireAssets(user): RequireAssets,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<ValuationInput>,
) -> AppResult<impl IntoResponse> {
    let asset = state
        .governance
        .record_valuation(&id, input.current_value, &user.user_id)
        .await?;

    Ok(Json(DataResponse { data: asset }))
}

// ---------------------------------------------------------------------------
// GET /assets/{id}/history
// ---------------------------------------------------------------------------

pub async fn get_history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let events = state.governance.history(&id).await?;
    Ok(Json(DataResponse { data: events }))
}

// ---------------------------------------------------------------------------
// GET /assets/{id}/relationships
// ---------------------------------------------------------------------------

/// Department and custodian findings. Always 200; inspect `is_valid`.
pub async fn get_relationships(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let findings = state.governance.validate_relationships(&id).await?;
    Ok(Json(DataResponse { data: findings }))
}
