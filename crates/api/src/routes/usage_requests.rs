use axum::routing::put;
use axum::Router;

use crate::handlers::usage_requests;
use crate::state::AppState;

/// Routes mounted at `/usage-requests`.
///
/// ```text
/// PUT    /{id}/status    -> update_usage_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/status", put(usage_requests::update_usage_status))
}
