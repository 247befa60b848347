//! Asset Governance service.
//!
//! The only writer of asset records and usage request statuses. Each
//! operation reads the latest stored record, applies a pure domain function
//! from [`crate::asset`], [`crate::lifecycle`] or [`crate::usage`], writes the
//! result back and appends an audit history entry.

use std::sync::Arc;

use crate::asset::{Asset, NewAsset};
use crate::error::CoreError;
use crate::lifecycle::{transition_asset, valid_next_states, LifecycleState};
use crate::relationship::{
    validate_custodian_reference, validate_department_reference, validate_module_request,
    CustodianLookup, DepartmentLookup, RelationshipValidation, LENDABLE_STATES,
};
use crate::store::{
    AssetListParams, AssetStore, LifecycleEvent, LifecycleEventKind, UsageRequestStore,
};
use crate::types::{EntityId, Timestamp};
use crate::usage::{AssetUsageRequest, NewUsageRequest, RequestingModule, UsageStatus};

pub struct AssetGovernance {
    assets: Arc<dyn AssetStore>,
    usage_requests: Arc<dyn UsageRequestStore>,
    departments: Arc<dyn DepartmentLookup>,
    custodians: Arc<dyn CustodianLookup>,
}

impl AssetGovernance {
    pub fn new(
        assets: Arc<dyn AssetStore>,
        usage_requests: Arc<dyn UsageRequestStore>,
        departments: Arc<dyn DepartmentLookup>,
        custodians: Arc<dyn CustodianLookup>,
    ) -> Self {
        Self {
            assets,
            usage_requests,
            departments,
            custodians,
        }
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    /// Register a newly acquired asset in state `get`.
    pub async fn register_asset(&self, input: NewAsset, actor_id: &str) -> Result<Asset, CoreError> {
        let asset = Asset::register(input, actor_id)?;
        self.check_references(
            asset.department_id.as_deref(),
            asset.custodian_id.as_deref(),
        )
        .await?;

        self.assets.create(&asset).await?;
        self.record(
            &asset.id,
            LifecycleEventKind::StateChanged {
                from: None,
                to: asset.lifecycle_state,
            },
            actor_id,
            asset.updated_at,
        )
        .await?;

        tracing::info!(
            asset_id = %asset.id,
            category = ?asset.category.kind(),
            actor_id,
            "Asset registered",
        );
        Ok(asset)
    }

    pub async fn get_asset(&self, id: &str) -> Result<Asset, CoreError> {
        self.assets
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Asset", id))
    }

    pub async fn list_assets(&self, params: &AssetListParams) -> Result<Vec<Asset>, CoreError> {
        self.assets.list(params).await
    }

    pub async fn history(&self, id: &str) -> Result<Vec<LifecycleEvent>, CoreError> {
        // 404 for unknown assets rather than an empty history.
        self.get_asset(id).await?;
        self.assets.events_for(id).await
    }

    /// Legal next states of the stored asset.
    pub async fn next_states(&self, id: &str) -> Result<Vec<LifecycleState>, CoreError> {
        let asset = self.get_asset(id).await?;
        Ok(valid_next_states(asset.lifecycle_state).to_vec())
    }

    /// Move an asset to `new_state` after re-checking its references.
    pub async fn transition(
        &self,
        id: &str,
        new_state: LifecycleState,
        actor_id: &str,
    ) -> Result<Asset, CoreError> {
        let current = self.get_asset(id).await?;
        self.check_references(
            current.department_id.as_deref(),
            current.custodian_id.as_deref(),
        )
        .await?;

        let updated = transition_asset(&current, new_state, actor_id).map_err(|err| {
            tracing::debug!(asset_id = %id, error = %err, "Lifecycle transition refused");
            err
        })?;

        self.commit(
            &current,
            &updated,
            LifecycleEventKind::StateChanged {
                from: Some(current.lifecycle_state),
                to: new_state,
            },
            actor_id,
        )
        .await?;

        tracing::info!(
            asset_id = %id,
            from = %current.lifecycle_state,
            to = %new_state,
            actor_id,
            "Asset lifecycle transitioned",
        );
        Ok(updated)
    }

    /// Assign (or clear) the custodian. A `None` department keeps the
    /// asset's current one.
    pub async fn assign_custodian(
        &self,
        id: &str,
        custodian_id: Option<EntityId>,
        department_id: Option<EntityId>,
        actor_id: &str,
    ) -> Result<Asset, CoreError> {
        let current = self.get_asset(id).await?;
        let updated = current.with_custodian(custodian_id, department_id, actor_id)?;
        self.check_references(
            updated.department_id.as_deref(),
            updated.custodian_id.as_deref(),
        )
        .await?;

        self.commit(
            &current,
            &updated,
            LifecycleEventKind::CustodianAssigned {
                custodian_id: updated.custodian_id.clone(),
                department_id: updated.department_id.clone(),
            },
            actor_id,
        )
        .await?;

        tracing::info!(
            asset_id = %id,
            custodian_id = ?updated.custodian_id,
            department_id = ?updated.department_id,
            actor_id,
            "Asset custodian assigned",
        );
        Ok(updated)
    }

    /// Record a new appraisal for the asset.
    pub async fn record_valuation(
        &self,
        id: &str,
        current_value: f64,
        actor_id: &str,
    ) -> Result<Asset, CoreError> {
        let current = self.get_asset(id).await?;
        let updated = current.with_valuation(current_value, actor_id)?;

        self.commit(
            &current,
            &updated,
            LifecycleEventKind::ValuationRecorded { current_value },
            actor_id,
        )
        .await?;

        tracing::info!(asset_id = %id, current_value, actor_id, "Asset valuation recorded");
        Ok(updated)
    }

    /// Department and custodian findings for a stored asset.
    pub async fn validate_relationships(&self, id: &str) -> Result<RelationshipValidation, CoreError> {
        let asset = self.get_asset(id).await?;
        self.reference_findings(
            asset.department_id.as_deref(),
            asset.custodian_id.as_deref(),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Usage requests
    // -----------------------------------------------------------------------

    /// File a usage request on behalf of another module.
    pub async fn submit_usage_request(
        &self,
        asset_id: &str,
        module: RequestingModule,
        input: NewUsageRequest,
        actor_id: &str,
    ) -> Result<AssetUsageRequest, CoreError> {
        let asset = self.get_asset(asset_id).await?;
        let findings = validate_module_request(self.departments.as_ref(), &asset, &input).await?;
        let warnings = findings.into_result()?;

        let request = AssetUsageRequest::file(asset_id, module, input, actor_id)?;
        self.usage_requests.create(&request).await?;

        tracing::info!(
            usage_request_id = %request.id,
            asset_id,
            module = ?module,
            actor_id,
            warnings = warnings.len(),
            "Usage request submitted",
        );
        Ok(request)
    }

    pub async fn list_usage_requests(&self, asset_id: &str) -> Result<Vec<AssetUsageRequest>, CoreError> {
        self.get_asset(asset_id).await?;
        self.usage_requests.list_for_asset(asset_id).await
    }

    /// Approve, reject or complete a usage request.
    ///
    /// Approval re-checks that the asset is still lendable.
    pub async fn decide_usage_request(
        &self,
        request_id: &str,
        status: UsageStatus,
        actor_id: &str,
    ) -> Result<AssetUsageRequest, CoreError> {
        let current = self
            .usage_requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| CoreError::not_found("UsageRequest", request_id))?;

        if status == UsageStatus::Approved {
            let asset = self.get_asset(&current.asset_id).await?;
            if !LENDABLE_STATES.contains(&asset.lifecycle_state) {
                return Err(CoreError::Conflict(format!(
                    "Asset {} is in '{}' and can no longer be lent out",
                    asset.id, asset.lifecycle_state
                )));
            }
        }

        let updated = current.with_status(status, actor_id)?;
        self.usage_requests
            .update_if_unchanged(&updated, current.updated_at)
            .await?;

        tracing::info!(
            usage_request_id = %request_id,
            from = %current.status,
            to = %status,
            actor_id,
            "Usage request status updated",
        );
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn reference_findings(
        &self,
        department_id: Option<&str>,
        custodian_id: Option<&str>,
    ) -> Result<RelationshipValidation, CoreError> {
        let department = validate_department_reference(self.departments.as_ref(), department_id).await?;
        let custodian =
            validate_custodian_reference(self.custodians.as_ref(), custodian_id, department_id)
                .await?;
        Ok(department.merge(custodian))
    }

    /// Fail with [`CoreError::InvalidReferences`] when any reference is broken.
    async fn check_references(
        &self,
        department_id: Option<&str>,
        custodian_id: Option<&str>,
    ) -> Result<(), CoreError> {
        let warnings = self
            .reference_findings(department_id, custodian_id)
            .await?
            .into_result()?;
        if !warnings.is_empty() {
            tracing::debug!(?warnings, "Reference validation warnings");
        }
        Ok(())
    }

    /// Persist `updated` over `current` together with its history entry.
    /// Fails with a conflict if the asset moved on since `current` was read.
    async fn commit(
        &self,
        current: &Asset,
        updated: &Asset,
        change: LifecycleEventKind,
        actor_id: &str,
    ) -> Result<(), CoreError> {
        let event = LifecycleEvent {
            asset_id: updated.id.clone(),
            change,
            actor_id: actor_id.to_string(),
            occurred_at: updated.updated_at,
        };
        self.assets
            .update_if_unchanged(updated, current.updated_at, &event)
            .await
            .map_err(|err| {
                if matches!(err, CoreError::Conflict(_)) {
                    tracing::warn!(
                        asset_id = %updated.id,
                        actor_id,
                        "Concurrent asset update rejected",
                    );
                }
                err
            })
    }

    async fn record(
        &self,
        asset_id: &str,
        change: LifecycleEventKind,
        actor_id: &str,
        occurred_at: Timestamp,
    ) -> Result<(), CoreError> {
        self.assets
            .append_event(&LifecycleEvent {
                asset_id: asset_id.to_string(),
                change,
                actor_id: actor_id.to_string(),
                occurred_at,
            })
            .await
    }
}
