//! Well-known dashboard module capability tags.
//!
//! Callers carry exactly one module tag. Only [`MODULE_ASSETS`] may register,
//! lock, value, audit or close assets; the other modules may only file usage
//! requests.

pub const MODULE_ASSETS: &str = "Assets";
pub const MODULE_OPERATIONS: &str = "Operations";
pub const MODULE_PROJECTS: &str = "Projects";
pub const MODULE_FINANCE: &str = "Finance";

/// All module tags accepted in access tokens.
pub const VALID_MODULES: &[&str] = &[
    MODULE_ASSETS,
    MODULE_OPERATIONS,
    MODULE_PROJECTS,
    MODULE_FINANCE,
];

/// Whether `module` is one of [`VALID_MODULES`], ignoring ASCII case.
pub fn is_known_module(module: &str) -> bool {
    VALID_MODULES.iter().any(|m| m.eq_ignore_ascii_case(module))
}

/// Whether `module` holds the asset governance capability.
pub fn is_asset_governance(module: &str) -> bool {
    module == MODULE_ASSETS
}
