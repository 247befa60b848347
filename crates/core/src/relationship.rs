//! Cross-component reference validation.
//!
//! Departments and people are owned by the external People component. This
//! module reaches them only through [`DepartmentLookup`] and
//! [`CustodianLookup`]; checks collect findings into a
//! [`RelationshipValidation`] instead of failing on the first problem, and the
//! caller decides whether errors block. Warnings never block.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use ts_rs::TS;

use crate::asset::Asset;
use crate::error::CoreError;
use crate::lifecycle::LifecycleState;
use crate::types::EntityId;
use crate::usage::NewUsageRequest;

/// States in which an asset may be lent out to another module.
pub const LENDABLE_STATES: &[LifecycleState] = &[LifecycleState::Use, LifecycleState::Lock];

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Aggregated findings of one or more reference checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RelationshipValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl RelationshipValidation {
    pub fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn valid() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Combine two results; valid only when both are.
    pub fn merge(mut self, other: RelationshipValidation) -> Self {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.is_valid = self.errors.is_empty();
        self
    }

    /// Turn blocking findings into [`CoreError::InvalidReferences`].
    pub fn into_result(self) -> Result<Vec<String>, CoreError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(CoreError::InvalidReferences {
                errors: self.errors,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub id: EntityId,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodianRecord {
    pub id: EntityId,
    pub name: String,
    /// Department the person belongs to, when known.
    pub department_id: Option<EntityId>,
    pub active: bool,
}

/// Resolves department references against the People component.
#[async_trait]
pub trait DepartmentLookup: Send + Sync {
    async fn find_department(&self, id: &str) -> Result<Option<DepartmentRecord>, CoreError>;
}

/// Resolves person references against the People component.
#[async_trait]
pub trait CustodianLookup: Send + Sync {
    async fn find_custodian(&self, id: &str) -> Result<Option<CustodianRecord>, CoreError>;
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// A missing department is a warning; an unknown or inactive one is an error.
pub async fn validate_department_reference(
    departments: &dyn DepartmentLookup,
    department_id: Option<&str>,
) -> Result<RelationshipValidation, CoreError> {
    let Some(id) = department_id else {
        return Ok(RelationshipValidation::new(
            Vec::new(),
            vec!["No department assigned".to_string()],
        ));
    };

    let mut errors = Vec::new();
    match departments.find_department(id).await? {
        None => errors.push(format!("Department '{id}' does not exist")),
        Some(dept) if !dept.active => {
            errors.push(format!("Department '{}' ({}) is not active", dept.name, id))
        }
        Some(_) => {}
    }
    Ok(RelationshipValidation::new(errors, Vec::new()))
}

/// A missing custodian is a warning. An unknown or inactive person, or one
/// who belongs to a different department than the asset, is an error.
pub async fn validate_custodian_reference(
    custodians: &dyn CustodianLookup,
    custodian_id: Option<&str>,
    department_id: Option<&str>,
) -> Result<RelationshipValidation, CoreError> {
    let Some(id) = custodian_id else {
        return Ok(RelationshipValidation::new(
            Vec::new(),
            vec!["No custodian assigned".to_string()],
        ));
    };

    let mut errors = Vec::new();
    match custodians.find_custodian(id).await? {
        None => errors.push(format!("Custodian '{id}' does not exist")),
        Some(person) => {
            if !person.active {
                errors.push(format!("Custodian '{}' ({}) is not active", person.name, id));
            }
            if let (Some(asset_dept), Some(person_dept)) =
                (department_id, person.department_id.as_deref())
            {
                if asset_dept != person_dept {
                    errors.push(format!(
                        "Custodian '{id}' belongs to department '{person_dept}', not '{asset_dept}'"
                    ));
                }
            }
        }
    }
    Ok(RelationshipValidation::new(errors, Vec::new()))
}

/// Check that an external module may borrow `asset` under `request`.
pub async fn validate_module_request(
    departments: &dyn DepartmentLookup,
    asset: &Asset,
    request: &NewUsageRequest,
) -> Result<RelationshipValidation, CoreError> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !LENDABLE_STATES.contains(&asset.lifecycle_state) {
        errors.push(format!(
            "Asset {} is in '{}' and cannot be lent out; it must be in 'use' or 'lock'",
            asset.id, asset.lifecycle_state
        ));
    }

    if request.purpose.trim().is_empty() {
        errors.push("Usage purpose must not be empty".to_string());
    }

    match &request.window {
        Some(window) if window.ends_at <= window.starts_at => {
            errors.push("Usage window must end after it starts".to_string())
        }
        Some(_) => {}
        None => warnings.push("Usage request has no time window (open-ended)".to_string()),
    }

    let department = validate_department_reference(
        departments,
        Some(request.requesting_department_id.as_str()),
    )
    .await?;

    Ok(RelationshipValidation::new(errors, warnings).merge(department))
}

// ---------------------------------------------------------------------------
// Directory implementations
// ---------------------------------------------------------------------------

/// Resolves every reference to an active record with no department
/// constraint. Used when no People data source is configured.
#[derive(Debug, Default, Clone)]
pub struct OptimisticDirectory;

#[async_trait]
impl DepartmentLookup for OptimisticDirectory {
    async fn find_department(&self, id: &str) -> Result<Option<DepartmentRecord>, CoreError> {
        Ok(Some(DepartmentRecord {
            id: id.to_string(),
            name: id.to_string(),
            active: true,
        }))
    }
}

#[async_trait]
impl CustodianLookup for OptimisticDirectory {
    async fn find_custodian(&self, id: &str) -> Result<Option<CustodianRecord>, CoreError> {
        Ok(Some(CustodianRecord {
            id: id.to_string(),
            name: id.to_string(),
            department_id: None,
            active: true,
        }))
    }
}

/// JSON shape accepted by [`InMemoryDirectory::load_from_file`].
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub departments: Vec<DepartmentRecord>,
    #[serde(default)]
    pub custodians: Vec<CustodianRecord>,
}

/// In-memory People directory with real existence and activity checks.
#[derive(Default)]
pub struct InMemoryDirectory {
    departments: RwLock<HashMap<EntityId, DepartmentRecord>>,
    custodians: RwLock<HashMap<EntityId, CustodianRecord>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        Self {
            departments: RwLock::new(
                seed.departments
                    .into_iter()
                    .map(|d| (d.id.clone(), d))
                    .collect(),
            ),
            custodians: RwLock::new(
                seed.custodians
                    .into_iter()
                    .map(|c| (c.id.clone(), c))
                    .collect(),
            ),
        }
    }

    /// Load departments and custodians from a JSON seed file.
    pub fn load_from_file(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Internal(format!("Failed to read directory seed {}: {e}", path.display()))
        })?;
        let seed: DirectorySeed = serde_json::from_str(&raw).map_err(|e| {
            CoreError::Validation(format!("Invalid directory seed {}: {e}", path.display()))
        })?;
        Ok(Self::from_seed(seed))
    }

    pub async fn upsert_department(&self, record: DepartmentRecord) {
        self.departments
            .write()
            .await
            .insert(record.id.clone(), record);
    }

    pub async fn upsert_custodian(&self, record: CustodianRecord) {
        self.custodians
            .write()
            .await
            .insert(record.id.clone(), record);
    }
}

#[async_trait]
impl DepartmentLookup for InMemoryDirectory {
    async fn find_department(&self, id: &str) -> Result<Option<DepartmentRecord>, CoreError> {
        Ok(self.departments.read().await.get(id).cloned())
    }
}

#[async_trait]
impl CustodianLookup for InMemoryDirectory {
    async fn find_custodian(&self, id: &str) -> Result<Option<CustodianRecord>, CoreError> {
        Ok(self.custodians.read().await.get(id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::asset::test_support::sample_asset;
    use crate::usage::UsageWindow;

    async fn directory() -> InMemoryDirectory {
        let dir = InMemoryDirectory::new();
        dir.upsert_department(DepartmentRecord {
            id: "dept-rituals".into(),
            name: "Rituals".into(),
            active: true,
        })
        .await;
        dir.upsert_department(DepartmentRecord {
            id: "dept-old".into(),
            name: "Old Annex".into(),
            active: false,
        })
        .await;
        dir.upsert_custodian(CustodianRecord {
            id: "priest-1".into(),
            name: "Head Priest".into(),
            department_id: Some("dept-rituals".into()),
            active: true,
        })
        .await;
        dir.upsert_custodian(CustodianRecord {
            id: "retired-1".into(),
            name: "Former Steward".into(),
            department_id: None,
            active: false,
        })
        .await;
        dir
    }

    fn request(purpose: &str, window: Option<UsageWindow>) -> NewUsageRequest {
        NewUsageRequest {
            requesting_department_id: "dept-rituals".into(),
            purpose: purpose.into(),
            window,
        }
    }

    #[test]
    fn merge_combines_findings() {
        let merged = RelationshipValidation::new(vec![], vec!["w1".into()])
            .merge(RelationshipValidation::new(vec!["e1".into()], vec![]));
        assert!(!merged.is_valid);
        assert_eq!(merged.errors, vec!["e1"]);
        assert_eq!(merged.warnings, vec!["w1"]);
    }

    #[test]
    fn warnings_alone_do_not_block() {
        let result = RelationshipValidation::new(vec![], vec!["soft".into()]);
        assert!(result.is_valid);
        assert_eq!(result.into_result().unwrap(), vec!["soft"]);
    }

    #[tokio::test]
    async fn null_department_is_a_warning() {
        let dir = directory().await;
        let result = validate_department_reference(&dir, None).await.unwrap();
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn unknown_and_inactive_departments_are_errors() {
        let dir = directory().await;
        let missing = validate_department_reference(&dir, Some("dept-x")).await.unwrap();
        assert!(!missing.is_valid);
        assert!(missing.errors[0].contains("does not exist"));

        let inactive = validate_department_reference(&dir, Some("dept-old")).await.unwrap();
        assert!(!inactive.is_valid);
        assert!(inactive.errors[0].contains("not active"));
    }

    #[tokio::test]
    async fn custodian_must_belong_to_asset_department() {
        let dir = directory().await;
        let ok = validate_custodian_reference(&dir, Some("priest-1"), Some("dept-rituals"))
            .await
            .unwrap();
        assert!(ok.is_valid);

        let wrong = validate_custodian_reference(&dir, Some("priest-1"), Some("dept-kitchen"))
            .await
            .unwrap();
        assert!(!wrong.is_valid);
        assert!(wrong.errors[0].contains("belongs to department"));

        let inactive = validate_custodian_reference(&dir, Some("retired-1"), None)
            .await
            .unwrap();
        assert!(!inactive.is_valid);
    }

    #[tokio::test]
    async fn optimistic_directory_accepts_anything() {
        let dir = OptimisticDirectory;
        assert!(validate_department_reference(&dir, Some("anything")).await.unwrap().is_valid);
        assert!(
            validate_custodian_reference(&dir, Some("anyone"), Some("dept"))
                .await
                .unwrap()
                .is_valid
        );
    }

    #[tokio::test]
    async fn module_request_requires_lendable_state() {
        let dir = directory().await;
        let mut asset = sample_asset();
        for state in [
            LifecycleState::Get,
            LifecycleState::Write,
            LifecycleState::Care,
            LifecycleState::Check,
            LifecycleState::Value,
            LifecycleState::Close,
        ] {
            asset.lifecycle_state = state;
            let result = validate_module_request(&dir, &asset, &request("Festival", None))
                .await
                .unwrap();
            assert!(!result.is_valid, "lending from '{state}' must be refused");
        }

        for state in LENDABLE_STATES {
            asset.lifecycle_state = *state;
            let result = validate_module_request(&dir, &asset, &request("Festival", None))
                .await
                .unwrap();
            assert!(result.is_valid);
            assert!(result.warnings.iter().any(|w| w.contains("open-ended")));
        }
    }

    #[tokio::test]
    async fn module_request_checks_purpose_window_and_department() {
        let dir = directory().await;
        let mut asset = sample_asset();
        asset.lifecycle_state = LifecycleState::Use;

        let now = Utc::now();
        let backwards = UsageWindow {
            starts_at: now,
            ends_at: now - Duration::hours(1),
        };
        let mut req = request("  ", Some(backwards));
        req.requesting_department_id = "dept-old".into();

        let result = validate_module_request(&dir, &asset, &req).await.unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 3);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn directory_loads_from_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"departments":[{{"id":"d1","name":"Kitchen","active":true}}],
                "custodians":[{{"id":"c1","name":"Cook","department_id":"d1","active":true}}]}}"#
        )
        .unwrap();

        let dir = InMemoryDirectory::load_from_file(file.path()).unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let dept = rt.block_on(dir.find_department("d1")).unwrap();
        assert_eq!(dept.map(|d| d.name), Some("Kitchen".to_string()));
        let person = rt.block_on(dir.find_custodian("c1")).unwrap();
        assert_eq!(person.and_then(|c| c.department_id), Some("d1".to_string()));
    }

    #[test]
    fn malformed_seed_is_a_validation_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            InMemoryDirectory::load_from_file(file.path()),
            Err(CoreError::Validation(_))
        ));
    }
}
