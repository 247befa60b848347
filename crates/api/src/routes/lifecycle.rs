use axum::routing::get;
use axum::Router;

use crate::handlers::lifecycle;
use crate::state::AppState;

/// Routes mounted at `/lifecycle`.
///
/// ```text
/// GET    /states    -> list_states
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/states", get(lifecycle::list_states))
}
