//! Storage traits for assets, their history and usage requests, with
//! in-memory implementations.
//!
//! Durable persistence belongs to whatever component owns asset storage; the
//! governance service only sees these traits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use ts_rs::TS;

use crate::asset::{Asset, CategoryKind};
use crate::error::CoreError;
use crate::lifecycle::LifecycleState;
use crate::types::{EntityId, Timestamp};
use crate::usage::AssetUsageRequest;

/// Default page size for asset listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Upper bound on page size for asset listings.
pub const MAX_LIST_LIMIT: i64 = 200;

/// Clamp a requested page size to `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// What an audit history entry records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum LifecycleEventKind {
    /// Lifecycle state change. `from` is `None` for registration.
    StateChanged {
        from: Option<LifecycleState>,
        to: LifecycleState,
    },
    CustodianAssigned {
        custodian_id: Option<EntityId>,
        department_id: Option<EntityId>,
    },
    ValuationRecorded {
        current_value: f64,
    },
}

/// Immutable audit history entry for an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LifecycleEvent {
    pub asset_id: EntityId,
    pub change: LifecycleEventKind,
    pub actor_id: String,
    pub occurred_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Filters for listing assets.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AssetListParams {
    pub state: Option<LifecycleState>,
    pub category: Option<CategoryKind>,
    pub department_id: Option<EntityId>,
    pub custodian_id: Option<EntityId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Asset>, CoreError>;

    /// List assets matching `params`, oldest first.
    async fn list(&self, params: &AssetListParams) -> Result<Vec<Asset>, CoreError>;

    /// Insert a new asset. Fails with a conflict if the id is taken.
    async fn create(&self, asset: &Asset) -> Result<(), CoreError>;

    /// Replace an existing asset and append `event` to its history in one
    /// step, provided the stored record still carries `expected_updated_at`.
    ///
    /// Fails with not-found if absent and with a conflict if the stored
    /// record changed since it was read.
    async fn update_if_unchanged(
        &self,
        asset: &Asset,
        expected_updated_at: Timestamp,
        event: &LifecycleEvent,
    ) -> Result<(), CoreError>;

    async fn append_event(&self, event: &LifecycleEvent) -> Result<(), CoreError>;

    /// History for one asset, in the order events were appended.
    async fn events_for(&self, asset_id: &str) -> Result<Vec<LifecycleEvent>, CoreError>;
}

#[async_trait]
pub trait UsageRequestStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<AssetUsageRequest>, CoreError>;

    async fn list_for_asset(&self, asset_id: &str) -> Result<Vec<AssetUsageRequest>, CoreError>;

    async fn create(&self, request: &AssetUsageRequest) -> Result<(), CoreError>;

    /// Replace a request if its stored `updated_at` still equals
    /// `expected_updated_at`; otherwise a conflict.
    async fn update_if_unchanged(
        &self,
        request: &AssetUsageRequest,
        expected_updated_at: Timestamp,
    ) -> Result<(), CoreError>;
}

// ============================================================================
// In-Memory Implementations
// ============================================================================

#[derive(Default)]
struct AssetTables {
    assets: HashMap<EntityId, Asset>,
    events: HashMap<EntityId, Vec<LifecycleEvent>>,
}

/// In-memory implementation of [`AssetStore`].
#[derive(Clone, Default)]
pub struct InMemoryAssetStore {
    inner: Arc<RwLock<AssetTables>>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn stale_write(entity: &str, id: &str) -> CoreError {
    CoreError::Conflict(format!(
        "{entity} {id} was modified by another request; reload and retry"
    ))
}

fn matches_filters(asset: &Asset, params: &AssetListParams) -> bool {
    params.state.map_or(true, |s| asset.lifecycle_state == s)
        && params
            .category
            .map_or(true, |c| asset.category.kind() == c)
        && params
            .department_id
            .as_deref()
            .map_or(true, |d| asset.department_id.as_deref() == Some(d))
        && params
            .custodian_id
            .as_deref()
            .map_or(true, |c| asset.custodian_id.as_deref() == Some(c))
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Asset>, CoreError> {
        Ok(self.inner.read().await.assets.get(id).cloned())
    }

    async fn list(&self, params: &AssetListParams) -> Result<Vec<Asset>, CoreError> {
        let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT) as usize;
        let offset = clamp_offset(params.offset) as usize;

        let tables = self.inner.read().await;
        let mut matched: Vec<Asset> = tables
            .assets
            .values()
            .filter(|a| matches_filters(a, params))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn create(&self, asset: &Asset) -> Result<(), CoreError> {
        let mut tables = self.inner.write().await;
        if tables.assets.contains_key(&asset.id) {
            return Err(CoreError::Conflict(format!(
                "Asset {} already exists",
                asset.id
            )));
        }
        tables.assets.insert(asset.id.clone(), asset.clone());
        Ok(())
    }

    async fn update_if_unchanged(
        &self,
        asset: &Asset,
        expected_updated_at: Timestamp,
        event: &LifecycleEvent,
    ) -> Result<(), CoreError> {
        let mut tables = self.inner.write().await;
        let existing = tables
            .assets
            .get_mut(&asset.id)
            .ok_or_else(|| CoreError::not_found("Asset", asset.id.clone()))?;
        if existing.updated_at != expected_updated_at {
            return Err(stale_write("Asset", &asset.id));
        }
        *existing = asset.clone();
        tables
            .events
            .entry(asset.id.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn append_event(&self, event: &LifecycleEvent) -> Result<(), CoreError> {
        self.inner
            .write()
            .await
            .events
            .entry(event.asset_id.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn events_for(&self, asset_id: &str) -> Result<Vec<LifecycleEvent>, CoreError> {
        Ok(self
            .inner
            .read()
            .await
            .events
            .get(asset_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory implementation of [`UsageRequestStore`].
#[derive(Clone, Default)]
pub struct InMemoryUsageRequestStore {
    requests: Arc<RwLock<HashMap<EntityId, AssetUsageRequest>>>,
}

impl InMemoryUsageRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageRequestStore for InMemoryUsageRequestStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<AssetUsageRequest>, CoreError> {
        Ok(self.requests.read().await.get(id).cloned())
    }

    async fn list_for_asset(&self, asset_id: &str) -> Result<Vec<AssetUsageRequest>, CoreError> {
        let mut found: Vec<AssetUsageRequest> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.asset_id == asset_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn create(&self, request: &AssetUsageRequest) -> Result<(), CoreError> {
        let mut requests = self.requests.write().await;
        if requests.contains_key(&request.id) {
            return Err(CoreError::Conflict(format!(
                "Usage request {} already exists",
                request.id
            )));
        }
        requests.insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn update_if_unchanged(
        &self,
        request: &AssetUsageRequest,
        expected_updated_at: Timestamp,
    ) -> Result<(), CoreError> {
        let mut requests = self.requests.write().await;
        let existing = requests
            .get_mut(&request.id)
            .ok_or_else(|| CoreError::not_found("UsageRequest", request.id.clone()))?;
        if existing.updated_at != expected_updated_at {
            return Err(stale_write("Usage request", &request.id));
        }
        *existing = request.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::asset::test_support::{sample_asset, sample_input};
    use crate::asset::{AssetCategory, PropertyType};

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None, 50, 200), 50);
        assert_eq!(clamp_limit(Some(0), 50, 200), 1);
        assert_eq!(clamp_limit(Some(10_000), 50, 200), 200);
        assert_eq!(clamp_offset(Some(-4)), 0);
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = InMemoryAssetStore::new();
        let asset = sample_asset();
        store.create(&asset).await.unwrap();
        assert_eq!(store.find_by_id(&asset.id).await.unwrap(), Some(asset.clone()));
        assert_matches!(store.create(&asset).await, Err(CoreError::Conflict(_)));
    }

    fn valuation_event(asset: &Asset) -> LifecycleEvent {
        LifecycleEvent {
            asset_id: asset.id.clone(),
            change: LifecycleEventKind::ValuationRecorded {
                current_value: asset.current_value,
            },
            actor_id: "appraiser".into(),
            occurred_at: asset.updated_at,
        }
    }

    #[tokio::test]
    async fn update_missing_asset_is_not_found() {
        let store = InMemoryAssetStore::new();
        let asset = sample_asset();
        assert_matches!(
            store
                .update_if_unchanged(&asset, asset.updated_at, &valuation_event(&asset))
                .await,
            Err(CoreError::NotFound { entity: "Asset", .. })
        );
    }

    #[tokio::test]
    async fn update_writes_record_and_history_together() {
        let store = InMemoryAssetStore::new();
        let asset = sample_asset();
        store.create(&asset).await.unwrap();

        let valued = asset.with_valuation(900.0, "appraiser").unwrap();
        store
            .update_if_unchanged(&valued, asset.updated_at, &valuation_event(&valued))
            .await
            .unwrap();

        assert_eq!(store.find_by_id(&asset.id).await.unwrap(), Some(valued));
        assert_eq!(store.events_for(&asset.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stale_update_is_a_conflict_and_changes_nothing() {
        let store = InMemoryAssetStore::new();
        let asset = sample_asset();
        store.create(&asset).await.unwrap();

        let first = asset.with_valuation(900.0, "appraiser").unwrap();
        store
            .update_if_unchanged(&first, asset.updated_at, &valuation_event(&first))
            .await
            .unwrap();

        // Second writer still holds the original snapshot.
        let second = asset.with_valuation(5.0, "appraiser").unwrap();
        assert_matches!(
            store
                .update_if_unchanged(&second, asset.updated_at, &valuation_event(&second))
                .await,
            Err(CoreError::Conflict(_))
        );
        assert_eq!(store.find_by_id(&asset.id).await.unwrap(), Some(first));
        assert_eq!(store.events_for(&asset.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stale_usage_decision_is_a_conflict() {
        use crate::usage::{NewUsageRequest, RequestingModule, UsageStatus};

        let store = InMemoryUsageRequestStore::new();
        let filed = AssetUsageRequest::file(
            "asset-1",
            RequestingModule::Operations,
            NewUsageRequest {
                requesting_department_id: "dept-kitchen".into(),
                purpose: "Annadanam service".into(),
                window: None,
            },
            "ops",
        )
        .unwrap();
        store.create(&filed).await.unwrap();

        let approved = filed.with_status(UsageStatus::Approved, "steward").unwrap();
        let rejected = filed.with_status(UsageStatus::Rejected, "steward").unwrap();
        store
            .update_if_unchanged(&approved, filed.updated_at)
            .await
            .unwrap();
        assert_matches!(
            store.update_if_unchanged(&rejected, filed.updated_at).await,
            Err(CoreError::Conflict(_))
        );
        assert_eq!(
            store.find_by_id(&filed.id).await.unwrap().map(|r| r.status),
            Some(UsageStatus::Approved)
        );
    }

    #[tokio::test]
    async fn list_filters_by_state_and_category() {
        let store = InMemoryAssetStore::new();
        let lamp = sample_asset();
        let mut hall_input = sample_input();
        hall_input.category = AssetCategory::Property(PropertyType::Hall);
        let mut hall = Asset::register(hall_input, "registrar").unwrap();
        hall.lifecycle_state = LifecycleState::Write;
        store.create(&lamp).await.unwrap();
        store.create(&hall).await.unwrap();

        let in_write = store
            .list(&AssetListParams {
                state: Some(LifecycleState::Write),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_write.len(), 1);
        assert_eq!(in_write[0].id, hall.id);

        let sacred = store
            .list(&AssetListParams {
                category: Some(CategoryKind::SacredValuable),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(sacred.len(), 1);
        assert_eq!(sacred[0].id, lamp.id);

        let page = store
            .list(&AssetListParams {
                limit: Some(1),
                offset: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn events_are_kept_in_append_order() {
        let store = InMemoryAssetStore::new();
        for to in [LifecycleState::Get, LifecycleState::Write] {
            store
                .append_event(&LifecycleEvent {
                    asset_id: "a1".into(),
                    change: LifecycleEventKind::StateChanged { from: None, to },
                    actor_id: "r".into(),
                    occurred_at: chrono::Utc::now(),
                })
                .await
                .unwrap();
        }
        let events = store.events_for("a1").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_matches!(
            events[1].change,
            LifecycleEventKind::StateChanged { to: LifecycleState::Write, .. }
        );
        assert!(store.events_for("other").await.unwrap().is_empty());
    }

    #[test]
    fn event_change_is_tagged() {
        let event = LifecycleEvent {
            asset_id: "a1".into(),
            change: LifecycleEventKind::StateChanged {
                from: Some(LifecycleState::Write),
                to: LifecycleState::Lock,
            },
            actor_id: "steward".into(),
            occurred_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["change"]["kind"], "state_changed");
        assert_eq!(json["change"]["from"], "write");
        assert_eq!(json["change"]["to"], "lock");
    }
}
