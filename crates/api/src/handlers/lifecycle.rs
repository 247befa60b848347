//! Read-only view of the lifecycle transition table.

use axum::Json;
use sanctum_core::lifecycle::{valid_next_states, LifecycleState, ALL_STATES};
use serde::Serialize;

use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

/// One row of the transition table.
#[derive(Debug, Serialize)]
pub struct StateInfo {
    pub state: LifecycleState,
    pub label: &'static str,
    pub terminal: bool,
    pub next_states: &'static [LifecycleState],
}

/// GET /lifecycle/states -- every state with its label and legal next states.
pub async fn list_states(_auth: AuthUser) -> Json<DataResponse<Vec<StateInfo>>> {
    let states = ALL_STATES
        .iter()
        .map(|&state| StateInfo {
            state,
            label: state.label(),
            terminal: state.is_terminal(),
            next_states: valid_next_states(state),
        })
        .collect();

    Json(DataResponse { data: states })
}
