//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAssets`] -- Requires the Assets module capability.
//! - [`rbac::RequireRequester`] -- Requires a module allowed to file usage requests.

pub mod auth;
pub mod rbac;
