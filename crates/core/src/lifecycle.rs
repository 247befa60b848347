//! Asset lifecycle states, transition table and transition validator.
//!
//! Every asset moves through eight fixed stages from acquisition to disposal:
//!
//! ```text
//! get -> write -> lock -> use -> care -> check -> value -> close
//! ```
//!
//! The table below is total and explicit; no transition is inferred. Staying
//! in the current state is always a legal request.
//!
//! | From    | Allowed to              |
//! |---------|-------------------------|
//! | `get`   | `write`                 |
//! | `write` | `lock`, `use`           |
//! | `lock`  | `use`, `check`          |
//! | `use`   | `care`, `check`, `lock` |
//! | `care`  | `use`, `check`          |
//! | `check` | `value`, `use`, `lock`  |
//! | `value` | `use`, `lock`, `close`  |
//! | `close` | (terminal)              |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::asset::Asset;
use crate::error::CoreError;
use crate::types::{next_timestamp, EntityId};

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// One of the eight stages an asset passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LifecycleState {
    /// Acquire.
    Get,
    /// Register.
    Write,
    /// Custody / security.
    Lock,
    /// Authorized usage.
    Use,
    /// Maintenance.
    Care,
    /// Audit.
    Check,
    /// Valuation.
    Value,
    /// Dispose / continue.
    Close,
}

/// All states in lifecycle order.
pub const ALL_STATES: [LifecycleState; 8] = [
    LifecycleState::Get,
    LifecycleState::Write,
    LifecycleState::Lock,
    LifecycleState::Use,
    LifecycleState::Care,
    LifecycleState::Check,
    LifecycleState::Value,
    LifecycleState::Close,
];

impl LifecycleState {
    /// The wire tag (`"get"`, `"write"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Get => "get",
            LifecycleState::Write => "write",
            LifecycleState::Lock => "lock",
            LifecycleState::Use => "use",
            LifecycleState::Care => "care",
            LifecycleState::Check => "check",
            LifecycleState::Value => "value",
            LifecycleState::Close => "close",
        }
    }

    /// Human-readable stage name for dashboards.
    pub fn label(self) -> &'static str {
        match self {
            LifecycleState::Get => "Acquire",
            LifecycleState::Write => "Register",
            LifecycleState::Lock => "Custody",
            LifecycleState::Use => "Authorized Usage",
            LifecycleState::Care => "Maintenance",
            LifecycleState::Check => "Audit",
            LifecycleState::Value => "Valuation",
            LifecycleState::Close => "Dispose",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == LifecycleState::Close
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STATES
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid lifecycle state '{s}'. Must be one of: {}",
                    join_states(&ALL_STATES)
                ))
            })
    }
}

/// Render a list of states as `"a, b, c"`.
pub fn join_states(states: &[LifecycleState]) -> String {
    states
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Returns the states reachable from `current` in one step, excluding the
/// implicit self-loop.
pub fn valid_next_states(current: LifecycleState) -> &'static [LifecycleState] {
    use LifecycleState::*;
    match current {
        Get => &[Write],
        Write => &[Lock, Use],
        Lock => &[Use, Check],
        Use => &[Care, Check, Lock],
        Care => &[Use, Check],
        Check => &[Value, Use, Lock],
        Value => &[Use, Lock, Close],
        Close => &[],
    }
}

/// Whether moving from `current` to `target` is sanctioned by the table.
pub fn can_transition(current: LifecycleState, target: LifecycleState) -> bool {
    current == target || valid_next_states(current).contains(&target)
}

// ---------------------------------------------------------------------------
// Transition validator
// ---------------------------------------------------------------------------

/// Reasons a lifecycle transition is refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error(
        "Cannot transition asset from '{from}' to '{to}'. Allowed transitions: [{}]",
        join_states(allowed)
    )]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
        allowed: Vec<LifecycleState>,
    },

    #[error("Asset {asset_id} cannot enter custody without a custodian of record")]
    MissingCustodian { asset_id: EntityId },

    #[error(
        "Asset {asset_id} cannot be valued with a current value of {current_value}; record a positive appraisal first"
    )]
    InvalidValuation {
        asset_id: EntityId,
        current_value: f64,
    },
}

/// Validate a requested state change and return the updated asset.
///
/// Checks run in order: table membership, custodian presence for `lock`,
/// positive value for `value`. Both guards also apply to self-loops. The
/// input asset is never modified; on success the caller receives a new record
/// with `lifecycle_state`, `updated_at` and `updated_by` refreshed and is
/// responsible for persisting it.
pub fn transition_asset(
    asset: &Asset,
    new_state: LifecycleState,
    actor_id: &str,
) -> Result<Asset, TransitionError> {
    let current = asset.lifecycle_state;

    if !can_transition(current, new_state) {
        return Err(TransitionError::InvalidTransition {
            from: current,
            to: new_state,
            allowed: valid_next_states(current).to_vec(),
        });
    }

    if new_state == LifecycleState::Lock && asset.custodian_id.is_none() {
        return Err(TransitionError::MissingCustodian {
            asset_id: asset.id.clone(),
        });
    }

    // `!(x > 0.0)` also rejects NaN.
    if new_state == LifecycleState::Value && !(asset.current_value > 0.0) {
        return Err(TransitionError::InvalidValuation {
            asset_id: asset.id.clone(),
            current_value: asset.current_value,
        });
    }

    let mut updated = asset.clone();
    updated.lifecycle_state = new_state;
    updated.updated_at = next_timestamp(asset.updated_at);
    updated.updated_by = actor_id.to_string();
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
