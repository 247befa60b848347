//! Route definitions for the `/assets` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{assets, usage_requests};
use crate::state::AppState;

/// Routes mounted at `/assets`.
///
/// ```text
/// GET    /                          -> list_assets (?state, category, department_id, custodian_id, limit, offset)
/// POST   /                          -> register_asset
/// GET    /{id}                      -> get_asset
/// GET    /{id}/next-states          -> get_next_states
/// POST   /{id}/transition           -> transition_asset
/// PUT    /{id}/custodian            -> assign_custodian (department kept when omitted)
/// PUT    /{id}/valuation            -> record_valuation
/// GET    /{id}/history              -> get_history
/// GET    /{id}/relationships        -> get_relationships
/// GET    /{id}/usage-requests       -> list_usage_requests
/// POST   /{id}/usage-requests       -> submit_usage_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets).post(assets::register_asset))
        .route("/{id}", get(assets::get_asset))
        .route("/{id}/next-states", get(assets::get_next_states))
        .route("/{id}/transition", post(assets::transition_asset))
        .route("/{id}/custodian", put(assets::assign_custodian))
        .route("/{id}/valuation", put(assets::record_valuation))
        .route("/{id}/history", get(assets::get_history))
        .route("/{id}/relationships", get(assets::get_relationships))
        .route(
            "/{id}/usage-requests",
            get(usage_requests::list_usage_requests).post(usage_requests::submit_usage_request),
        )
}
