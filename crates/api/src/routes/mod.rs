pub mod assets;
pub mod health;
pub mod lifecycle;
pub mod usage_requests;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /lifecycle/states                                transition table
///
/// /assets                                          list, register
/// /assets/{id}                                     get
/// /assets/{id}/next-states                         legal next states
/// /assets/{id}/transition                          change lifecycle state (POST)
/// /assets/{id}/custodian                           assign custodian (PUT)
/// /assets/{id}/valuation                           record valuation (PUT)
/// /assets/{id}/history                             audit trail
/// /assets/{id}/relationships                       reference findings
/// /assets/{id}/usage-requests                      list, submit
///
/// /usage-requests/{id}/status                      approve, reject, complete (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/lifecycle", lifecycle::router())
        .nest("/assets", assets::router())
        .nest("/usage-requests", usage_requests::router())
}
