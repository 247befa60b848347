//! Asset record, classification and the pure mutations the governance
//! service applies to it.
//!
//! Assets are never mutated in place: every change returns a new record with
//! refreshed audit fields, and the caller persists it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::error::CoreError;
use crate::lifecycle::LifecycleState;
use crate::types::{new_entity_id, next_timestamp, EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Asset category, each carrying its own sub-type.
///
/// Serialized as `{ "category": "sacred_valuable", "type": "idol" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "category", content = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum AssetCategory {
    PhysicalGeneral(PhysicalType),
    SacredValuable(SacredType),
    Property(PropertyType),
    Knowledge(KnowledgeType),
}

impl AssetCategory {
    /// The category tag without its sub-type.
    pub fn kind(&self) -> CategoryKind {
        match self {
            AssetCategory::PhysicalGeneral(_) => CategoryKind::PhysicalGeneral,
            AssetCategory::SacredValuable(_) => CategoryKind::SacredValuable,
            AssetCategory::Property(_) => CategoryKind::Property,
            AssetCategory::Knowledge(_) => CategoryKind::Knowledge,
        }
    }
}

/// Category tag on its own, used for list filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CategoryKind {
    PhysicalGeneral,
    SacredValuable,
    Property,
    Knowledge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PhysicalType {
    Furniture,
    Equipment,
    Vehicle,
    Electronics,
    Kitchenware,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SacredType {
    Idol,
    Jewelry,
    Ornament,
    Vessel,
    Relic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PropertyType {
    Land,
    Building,
    Shop,
    Hall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum KnowledgeType {
    Manuscript,
    Book,
    Recording,
    Document,
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A tracked physical or intangible item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Asset {
    pub id: EntityId,
    pub name: String,
    /// Emitted as top-level `category` and `type` fields.
    #[serde(flatten)]
    pub category: AssetCategory,
    pub lifecycle_state: LifecycleState,
    /// Owning department in the external People component.
    pub department_id: Option<EntityId>,
    /// Person accountable for the asset while in custody or use.
    pub custodian_id: Option<EntityId>,
    pub current_value: f64,
    pub acquisition_cost: f64,
    pub acquisition_date: NaiveDate,
    pub created_at: Timestamp,
    pub created_by: String,
    pub updated_at: Timestamp,
    pub updated_by: String,
}

/// Input for registering a new asset.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAsset {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(flatten)]
    pub category: AssetCategory,
    pub department_id: Option<EntityId>,
    pub custodian_id: Option<EntityId>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub current_value: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub acquisition_cost: f64,
    pub acquisition_date: NaiveDate,
}

impl Asset {
    /// Build a freshly acquired asset. Always starts in [`LifecycleState::Get`].
    pub fn register(input: NewAsset, actor_id: &str) -> Result<Self, CoreError> {
        input.validate()?;
        validate_amount("current_value", input.current_value)?;
        validate_amount("acquisition_cost", input.acquisition_cost)?;

        let now = chrono::Utc::now();
        Ok(Self {
            id: new_entity_id(),
            name: input.name,
            category: input.category,
            lifecycle_state: LifecycleState::Get,
            department_id: input.department_id,
            custodian_id: input.custodian_id,
            current_value: input.current_value,
            acquisition_cost: input.acquisition_cost,
            acquisition_date: input.acquisition_date,
            created_at: now,
            created_by: actor_id.to_string(),
            updated_at: now,
            updated_by: actor_id.to_string(),
        })
    }

    /// Return a copy with a new custodian. The department is replaced only
    /// when `department_id` is given; `None` keeps the current one.
    ///
    /// The custodian may not be cleared while the asset is in custody or in
    /// use, and closed assets are frozen.
    pub fn with_custodian(
        &self,
        custodian_id: Option<EntityId>,
        department_id: Option<EntityId>,
        actor_id: &str,
    ) -> Result<Self, CoreError> {
        self.ensure_open()?;
        if custodian_id.is_none()
            && matches!(
                self.lifecycle_state,
                LifecycleState::Lock | LifecycleState::Use
            )
        {
            return Err(CoreError::Conflict(format!(
                "Asset {} is in '{}' and must keep a custodian of record",
                self.id, self.lifecycle_state
            )));
        }

        let mut updated = self.clone();
        updated.custodian_id = custodian_id;
        if department_id.is_some() {
            updated.department_id = department_id;
        }
        updated.touch(actor_id);
        Ok(updated)
    }

    /// Return a copy carrying a newly recorded appraisal.
    pub fn with_valuation(&self, current_value: f64, actor_id: &str) -> Result<Self, CoreError> {
        self.ensure_open()?;
        validate_amount("current_value", current_value)?;

        let mut updated = self.clone();
        updated.current_value = current_value;
        updated.touch(actor_id);
        Ok(updated)
    }

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.lifecycle_state.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Asset {} is closed and can no longer be modified",
                self.id
            )));
        }
        Ok(())
    }

    fn touch(&mut self, actor_id: &str) {
        self.updated_at = next_timestamp(self.updated_at);
        self.updated_by = actor_id.to_string();
    }
}

/// Monetary amounts must be finite and non-negative.
fn validate_amount(field: &str, amount: f64) -> Result<(), CoreError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a finite, non-negative amount (got {amount})"
        )));
    }
    Ok(())
}
