//! Asset usage requests filed by other dashboard modules.
//!
//! Operations, Projects and Finance may ask to borrow an asset temporarily.
//! Only the Asset Governance authority moves a request through its statuses:
//!
//! - `pending`  -> `approved`, `rejected`
//! - `approved` -> `completed`
//! - `rejected`, `completed` are terminal

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::error::CoreError;
use crate::modules::{MODULE_FINANCE, MODULE_OPERATIONS, MODULE_PROJECTS};
use crate::types::{new_entity_id, next_timestamp, EntityId, Timestamp};

/// Maximum length of the free-text purpose (characters).
pub const MAX_PURPOSE_LENGTH: u64 = 1_000;

// ---------------------------------------------------------------------------
// Requesting module
// ---------------------------------------------------------------------------

/// Module on whose behalf a usage request is filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RequestingModule {
    Operations,
    Projects,
    Finance,
}

impl RequestingModule {
    /// Parse a module capability tag, case-insensitively.
    ///
    /// Returns `None` for the Assets module and unknown tags; neither may
    /// file usage requests.
    pub fn from_module_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case(MODULE_OPERATIONS) {
            Some(RequestingModule::Operations)
        } else if tag.eq_ignore_ascii_case(MODULE_PROJECTS) {
            Some(RequestingModule::Projects)
        } else if tag.eq_ignore_ascii_case(MODULE_FINANCE) {
            Some(RequestingModule::Finance)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum UsageStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

pub const ALL_STATUSES: [UsageStatus; 4] = [
    UsageStatus::Pending,
    UsageStatus::Approved,
    UsageStatus::Rejected,
    UsageStatus::Completed,
];

impl UsageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UsageStatus::Pending => "pending",
            UsageStatus::Approved => "approved",
            UsageStatus::Rejected => "rejected",
            UsageStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for UsageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STATUSES
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid usage request status '{s}'. Must be one of: pending, approved, rejected, completed"
                ))
            })
    }
}

/// Returns the statuses that `from` may move to.
pub fn valid_status_transitions(from: UsageStatus) -> &'static [UsageStatus] {
    match from {
        UsageStatus::Pending => &[UsageStatus::Approved, UsageStatus::Rejected],
        UsageStatus::Approved => &[UsageStatus::Completed],
        UsageStatus::Rejected | UsageStatus::Completed => &[],
    }
}

/// Validate that a usage request may move from `current` to `next`.
pub fn validate_status_transition(current: UsageStatus, next: UsageStatus) -> Result<(), CoreError> {
    let allowed = valid_status_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Cannot move usage request from '{current}' to '{next}'. Allowed transitions: {:?}",
            allowed.iter().map(|s| s.as_str()).collect::<Vec<_>>()
        )))
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Time span during which the asset is borrowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UsageWindow {
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

/// Input for filing a usage request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUsageRequest {
    #[validate(length(min = 1))]
    pub requesting_department_id: EntityId,
    #[validate(length(max = MAX_PURPOSE_LENGTH))]
    pub purpose: String,
    pub window: Option<UsageWindow>,
}

/// A stored usage request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssetUsageRequest {
    pub id: EntityId,
    pub asset_id: EntityId,
    pub requesting_module: RequestingModule,
    pub requesting_department_id: EntityId,
    pub purpose: String,
    pub status: UsageStatus,
    pub window: Option<UsageWindow>,
    pub created_at: Timestamp,
    pub created_by: String,
    pub updated_at: Timestamp,
    pub updated_by: String,
}

impl AssetUsageRequest {
    /// Build a pending request. Input shape is validated here; cross-component
    /// checks are the caller's job.
    pub fn file(
        asset_id: &str,
        module: RequestingModule,
        input: NewUsageRequest,
        actor_id: &str,
    ) -> Result<Self, CoreError> {
        input.validate()?;
        let now = chrono::Utc::now();
        Ok(Self {
            id: new_entity_id(),
            asset_id: asset_id.to_string(),
            requesting_module: module,
            requesting_department_id: input.requesting_department_id,
            purpose: input.purpose,
            status: UsageStatus::Pending,
            window: input.window,
            created_at: now,
            created_by: actor_id.to_string(),
            updated_at: now,
            updated_by: actor_id.to_string(),
        })
    }

    /// Return a copy moved to `next`, if the status table allows it.
    pub fn with_status(&self, next: UsageStatus, actor_id: &str) -> Result<Self, CoreError> {
        validate_status_transition(self.status, next)?;
        let mut updated = self.clone();
        updated.status = next;
        updated.updated_at = next_timestamp(self.updated_at);
        updated.updated_by = actor_id.to_string();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn input() -> NewUsageRequest {
        NewUsageRequest {
            requesting_department_id: "dept-kitchen".into(),
            purpose: "Annadanam service".into(),
            window: None,
        }
    }

    #[test]
    fn module_tags_parse_case_insensitively() {
        assert_eq!(
            RequestingModule::from_module_tag("Operations"),
            Some(RequestingModule::Operations)
        );
        assert_eq!(
            RequestingModule::from_module_tag("finance"),
            Some(RequestingModule::Finance)
        );
        assert_eq!(RequestingModule::from_module_tag("Assets"), None);
        assert_eq!(RequestingModule::from_module_tag(""), None);
    }

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert!(validate_status_transition(UsageStatus::Pending, UsageStatus::Approved).is_ok());
        assert!(validate_status_transition(UsageStatus::Pending, UsageStatus::Rejected).is_ok());
        assert!(validate_status_transition(UsageStatus::Pending, UsageStatus::Completed).is_err());
    }

    #[test]
    fn terminal_statuses_go_nowhere() {
        for from in [UsageStatus::Rejected, UsageStatus::Completed] {
            for to in ALL_STATUSES {
                assert!(validate_status_transition(from, to).is_err());
            }
        }
    }

    #[test]
    fn self_loops_are_rejected() {
        for s in ALL_STATUSES {
            assert!(validate_status_transition(s, s).is_err());
        }
    }

    #[test]
    fn filed_request_is_pending() {
        let req =
            AssetUsageRequest::file("asset-1", RequestingModule::Projects, input(), "pm-3").unwrap();
        assert_eq!(req.status, UsageStatus::Pending);
        assert_eq!(req.asset_id, "asset-1");
        assert_eq!(req.created_by, "pm-3");
    }

    #[test]
    fn purpose_at_the_limit_is_accepted() {
        let mut max = input();
        max.purpose = "x".repeat(MAX_PURPOSE_LENGTH as usize);
        assert!(AssetUsageRequest::file("a", RequestingModule::Finance, max, "f").is_ok());
    }

    #[test]
    fn overlong_purpose_is_rejected() {
        let mut long = input();
        long.purpose = "x".repeat(MAX_PURPOSE_LENGTH as usize + 1);
        assert_matches!(
            AssetUsageRequest::file("a", RequestingModule::Finance, long, "f"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn with_status_refreshes_audit_fields() {
        let req =
            AssetUsageRequest::file("asset-1", RequestingModule::Operations, input(), "ops").unwrap();
        let approved = req.with_status(UsageStatus::Approved, "steward").unwrap();
        assert_eq!(approved.status, UsageStatus::Approved);
        assert_eq!(approved.updated_by, "steward");
        assert!(approved.updated_at > req.updated_at);
        assert_matches!(
            approved.with_status(UsageStatus::Rejected, "steward"),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn statuses_parse_from_wire_tags() {
        assert_eq!("completed".parse::<UsageStatus>().unwrap(), UsageStatus::Completed);
        assert!("done".parse::<UsageStatus>().is_err());
    }
}
